//! Course listing and search.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use super::null_as_default;
use crate::gateway::{Gateway, GatewayResult};

/// Timestamp the backend sends for dates that were never set.
const UNSET_DATE: &str = "0001-01-01T00:00:00Z";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub teacher_uuid: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub students_amount: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aux_teachers: Vec<Value>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feedback: Vec<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Course {
    pub fn capacity_status(&self) -> CapacityStatus {
        CapacityStatus::of(self.students_amount, self.capacity)
    }
}

/// How full a course is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacityStatus {
    /// No capacity configured.
    Unlimited,
    Open(f64),
    /// 70% or more.
    Filling(f64),
    /// 90% or more.
    AlmostFull(f64),
}

impl CapacityStatus {
    pub fn of(students: u32, capacity: u32) -> Self {
        if capacity == 0 {
            return CapacityStatus::Unlimited;
        }
        let pct = f64::from(students) / f64::from(capacity) * 100.0;
        if pct >= 90.0 {
            CapacityStatus::AlmostFull(pct)
        } else if pct >= 70.0 {
            CapacityStatus::Filling(pct)
        } else {
            CapacityStatus::Open(pct)
        }
    }

    pub fn percentage(&self) -> f64 {
        match self {
            CapacityStatus::Unlimited => 0.0,
            CapacityStatus::Open(p) | CapacityStatus::Filling(p) | CapacityStatus::AlmostFull(p) => {
                *p
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityStatus::Unlimited => "no limit",
            CapacityStatus::Open(_) => "open",
            CapacityStatus::Filling(_) => "filling",
            CapacityStatus::AlmostFull(_) => "almost full",
        }
    }
}

pub async fn list(gateway: &Gateway) -> GatewayResult<Vec<Course>> {
    let courses: Option<Vec<Course>> = gateway.get_json("/courses").await?;
    Ok(courses.unwrap_or_default())
}

/// Searches by title; blank titles fall back to the full listing.
pub async fn search_by_title(gateway: &Gateway, title: &str) -> GatewayResult<Vec<Course>> {
    let title = title.trim();
    if title.is_empty() {
        return list(gateway).await;
    }

    let url = gateway.url_with_segment("/courses/title", title)?;
    let courses: Option<Vec<Course>> = gateway.get_json_at(url).await?;
    Ok(courses.unwrap_or_default())
}

/// Formats an API date as e.g. "Mar 4, 2025".
pub fn format_date(raw: &str) -> String {
    format_with(raw, "%b %-d, %Y")
}

/// Formats an API timestamp as e.g. "Mar 4, 2025, 09:30 AM".
pub fn format_date_time(raw: &str) -> String {
    format_with(raw, "%b %-d, %Y, %I:%M %p")
}

fn format_with(raw: &str, pattern: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == UNSET_DATE {
        return "Not set".to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format(pattern).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_thresholds() {
        assert_eq!(CapacityStatus::of(5, 0), CapacityStatus::Unlimited);
        assert_eq!(CapacityStatus::of(6, 10).label(), "open");
        assert_eq!(CapacityStatus::of(7, 10).label(), "filling");
        assert_eq!(CapacityStatus::of(9, 10).label(), "almost full");
        assert_eq!(CapacityStatus::of(12, 10).label(), "almost full");
        assert!((CapacityStatus::of(1, 4).percentage() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unset_dates() {
        assert_eq!(format_date(""), "Not set");
        assert_eq!(format_date("0001-01-01T00:00:00Z"), "Not set");
        assert_eq!(format_date_time("0001-01-01T00:00:00Z"), "Not set");
    }

    #[test]
    fn test_formats_rfc3339() {
        assert_eq!(format_date("2025-03-04T09:30:00Z"), "Mar 4, 2025");
        assert_eq!(
            format_date_time("2025-03-04T09:30:00Z"),
            "Mar 4, 2025, 09:30 AM"
        );
    }

    #[test]
    fn test_unparseable_date_is_shown_raw() {
        assert_eq!(format_date("next week"), "next week");
    }

    #[test]
    fn test_course_tolerates_null_collections() {
        let course: Course = serde_json::from_str(
            r#"{"id":"c1","title":"Rust","capacity":30,"students_amount":3,"modules":null,"feedback":null}"#,
        )
        .unwrap();
        assert!(course.modules.is_empty());
        assert!(course.feedback.is_empty());
        assert_eq!(course.capacity_status().label(), "open");
    }
}
