//! Course browser.

use anyhow::{Context, Result};
use campus_core::api::courses::{self, CapacityStatus, Course};

use super::table;
use crate::cli::App;

pub async fn list(app: &App, json: bool) -> Result<()> {
    let all = courses::list(app.gateway()).await?;

    if json {
        let rows: Vec<_> = all
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "teacher": c.teacher_name,
                    "students": c.students_amount,
                    "capacity": c.capacity,
                    "start_date": c.start_date,
                    "end_date": c.end_date,
                    "created_at": courses::format_date_time(&c.created_at),
                    "updated_at": courses::format_date_time(&c.updated_at),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("encode courses")?
        );
        return Ok(());
    }

    render(&all);
    Ok(())
}

pub async fn search(app: &App, title: &str) -> Result<()> {
    let found = courses::search_by_title(app.gateway(), title).await?;
    render(&found);
    Ok(())
}

fn render(list: &[Course]) {
    if list.is_empty() {
        println!("No courses found.");
        return;
    }

    let mut table = table([
        "Title", "Teacher", "Students", "Capacity", "Modules", "Starts", "Ends",
    ]);
    for course in list {
        table.add_row([
            course.title.clone(),
            course.teacher_name.clone(),
            course.students_amount.to_string(),
            capacity_cell(course.capacity, course.capacity_status()),
            course.modules.len().to_string(),
            courses::format_date(&course.start_date),
            courses::format_date(&course.end_date),
        ]);
    }
    println!("{table}");
    println!("{} course(s)", list.len());
}

fn capacity_cell(capacity: u32, status: CapacityStatus) -> String {
    match status {
        CapacityStatus::Unlimited => status.label().to_string(),
        _ => format!(
            "{capacity} ({:.0}%, {})",
            status.percentage(),
            status.label()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_cell() {
        assert_eq!(
            capacity_cell(0, CapacityStatus::of(4, 0)),
            "no limit"
        );
        assert_eq!(
            capacity_cell(20, CapacityStatus::of(18, 20)),
            "20 (90%, almost full)"
        );
    }
}
