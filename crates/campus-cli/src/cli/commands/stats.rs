//! Statistics dashboards.

use anyhow::Result;
use campus_core::api::{percentage, statistics};

use super::table;
use crate::cli::App;

pub async fn general(app: &App) -> Result<()> {
    let s = statistics::general(app.gateway()).await?;

    let mut overview = table(["Overview", "Count"]);
    for (label, value) in [
        ("Courses", s.total_courses),
        ("Assignments", s.total_assignments),
        ("Submissions", s.total_submissions),
        ("Enrollments", s.total_enrollments),
        ("Forum questions", s.total_forum_questions),
        ("Forum answers", s.total_forum_answers),
        ("Teachers", s.total_unique_teachers),
        ("Aux teachers", s.total_unique_aux_teachers),
        ("Students", s.total_unique_students),
    ] {
        overview.add_row([label.to_string(), value.to_string()]);
    }
    println!("{overview}");

    let mut breakdown = table(["Breakdown", "Count", "Share"]);
    let groups: [(u64, &[(&str, u64)]); 5] = [
        (
            s.total_courses,
            &[
                ("Active courses", s.active_courses),
                ("Finished courses", s.finished_courses),
            ],
        ),
        (
            s.total_assignments,
            &[
                ("Exams", s.total_exams),
                ("Homeworks", s.total_homeworks),
                ("Quizzes", s.total_quizzes),
            ],
        ),
        (
            s.total_submissions,
            &[
                ("Draft submissions", s.draft_submissions),
                ("Submitted", s.submitted_submissions),
                ("Late", s.late_submissions),
            ],
        ),
        (
            s.total_enrollments,
            &[
                ("Active enrollments", s.active_enrollments),
                ("Dropped", s.dropped_enrollments),
                ("Completed", s.completed_enrollments),
            ],
        ),
        (
            s.total_forum_questions,
            &[
                ("Open questions", s.open_forum_questions),
                ("Resolved", s.resolved_forum_questions),
                ("Closed", s.closed_forum_questions),
            ],
        ),
    ];
    for (total, rows) in groups {
        for &(label, value) in rows {
            breakdown.add_row([
                label.to_string(),
                value.to_string(),
                format!("{}%", percentage(value, total)),
            ]);
        }
    }
    println!("{breakdown}");

    let mut trends = table(["Averages and this month", "Value"]);
    trends.add_row([
        "Students per course".to_string(),
        format!("{:.1}", s.average_students_per_course),
    ]);
    trends.add_row([
        "Assignments per course".to_string(),
        format!("{:.1}", s.average_assignments_per_course),
    ]);
    trends.add_row([
        "Submissions per assignment".to_string(),
        format!("{:.1}", s.average_submissions_per_assignment),
    ]);
    for (label, value) in [
        ("New courses", s.courses_created_this_month),
        ("New assignments", s.assignments_created_this_month),
        ("New submissions", s.submissions_this_month),
        ("New enrollments", s.enrollments_this_month),
    ] {
        trends.add_row([label.to_string(), value.to_string()]);
    }
    println!("{trends}");
    Ok(())
}

pub async fn courses(app: &App) -> Result<()> {
    let s = statistics::courses(app.gateway()).await?;
    let by_status = s.courses_by_status;

    let mut t = table(["Courses", "Count", "Share"]);
    t.add_row(["Total".to_string(), s.total_courses.to_string(), String::new()]);
    for (label, value) in [("Active", by_status.active), ("Finished", by_status.finished)] {
        t.add_row([
            label.to_string(),
            value.to_string(),
            format!("{}%", percentage(value, s.total_courses)),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn assignments(app: &App) -> Result<()> {
    let s = statistics::assignments(app.gateway()).await?;
    let total = s.total_assignments;

    let mut t = table(["Assignments", "Count", "Share"]);
    t.add_row(["Total".to_string(), total.to_string(), String::new()]);
    for (label, value) in [
        ("Exams", s.assignments_by_type.exam),
        ("Homeworks", s.assignments_by_type.homework),
        ("Quizzes", s.assignments_by_type.quiz),
        ("Draft", s.assignments_by_status.draft),
        ("Published", s.assignments_by_status.published),
    ] {
        t.add_row([
            label.to_string(),
            value.to_string(),
            format!("{}%", percentage(value, total)),
        ]);
    }
    println!("{t}");

    if !s.assignment_distribution.is_empty() {
        let mut dist = table(["Type", "Status", "Count"]);
        for bucket in &s.assignment_distribution {
            dist.add_row([
                bucket.kind.clone(),
                bucket.status.clone(),
                bucket.count.to_string(),
            ]);
        }
        println!("{dist}");
    }
    Ok(())
}
