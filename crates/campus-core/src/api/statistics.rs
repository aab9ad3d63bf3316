//! Backoffice statistics aggregates.

use serde::Deserialize;

use super::null_as_default;
use crate::gateway::{Gateway, GatewayResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneralStats {
    pub total_courses: u64,
    pub total_assignments: u64,
    pub total_submissions: u64,
    pub total_enrollments: u64,
    pub total_forum_questions: u64,
    pub total_forum_answers: u64,
    pub active_courses: u64,
    pub finished_courses: u64,
    pub total_exams: u64,
    pub total_homeworks: u64,
    pub total_quizzes: u64,
    pub draft_submissions: u64,
    pub submitted_submissions: u64,
    pub late_submissions: u64,
    pub active_enrollments: u64,
    pub dropped_enrollments: u64,
    pub completed_enrollments: u64,
    pub open_forum_questions: u64,
    pub resolved_forum_questions: u64,
    pub closed_forum_questions: u64,
    pub total_unique_teachers: u64,
    pub total_unique_aux_teachers: u64,
    pub total_unique_students: u64,
    pub average_students_per_course: f64,
    pub average_assignments_per_course: f64,
    pub average_submissions_per_assignment: f64,
    pub courses_created_this_month: u64,
    pub assignments_created_this_month: u64,
    pub submissions_this_month: u64,
    pub enrollments_this_month: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoursesByStatus {
    pub active: u64,
    pub finished: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourseStats {
    pub total_courses: u64,
    pub courses_by_status: CoursesByStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssignmentsByType {
    pub exam: u64,
    pub homework: u64,
    pub quiz: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssignmentsByStatus {
    pub draft: u64,
    pub published: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignmentBucket {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssignmentStats {
    pub total_assignments: u64,
    pub assignments_by_type: AssignmentsByType,
    pub assignments_by_status: AssignmentsByStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub assignment_distribution: Vec<AssignmentBucket>,
}

pub async fn general(gateway: &Gateway) -> GatewayResult<GeneralStats> {
    gateway.get_json("/backoffice/statistics/general").await
}

pub async fn courses(gateway: &Gateway) -> GatewayResult<CourseStats> {
    gateway.get_json("/backoffice/statistics/courses").await
}

pub async fn assignments(gateway: &Gateway) -> GatewayResult<AssignmentStats> {
    gateway.get_json("/backoffice/statistics/assignments").await
}
