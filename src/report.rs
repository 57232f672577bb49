use std::fmt::Write;

use crate::lifecycle;
use crate::models::{ParticipantMetric, TaskStatus, TaskSubmission};
use crate::ranking;

pub fn build_report(
    batch: Option<&str>,
    metrics: &[ParticipantMetric],
    tasks: &[TaskSubmission],
    top: usize,
) -> String {
    let board = match batch {
        Some(name) => ranking::rank(metrics, ranking::batch_scope(name)),
        None => ranking::rank(metrics, ranking::national_scope),
    };
    let counts = lifecycle::status_counts(tasks);

    let mut output = String::new();
    let scope_label = batch.unwrap_or("all batches");

    let _ = writeln!(output, "# Batch Performance Report");
    let _ = writeln!(output, "Generated for {scope_label}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Leaderboard");

    if board.is_empty() {
        let _ = writeln!(output, "No participants in this scope.");
    } else {
        for entry in board.iter().take(top) {
            let _ = writeln!(
                output,
                "{}. {} ({}) score {:.1}: ${:.0} sales, {} customers, {:.0}% tasks, {:.0}% attendance",
                entry.rank,
                entry.metric.display_name,
                entry.metric.batch,
                entry.score,
                entry.metric.sales_amount,
                entry.metric.customer_count,
                entry.metric.task_completion_pct,
                entry.metric.attendance_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Task Status");

    if tasks.is_empty() {
        let _ = writeln!(output, "No tasks assigned.");
    } else {
        let _ = writeln!(output, "- pending: {}", counts.pending);
        let _ = writeln!(output, "- overdue: {}", counts.overdue);
        let _ = writeln!(output, "- submitted: {}", counts.submitted);
        let _ = writeln!(output, "- to resubmit: {}", counts.resubmit);
        let _ = writeln!(output, "- completed: {}", counts.completed);
    }

    let awaiting: Vec<&TaskSubmission> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Submitted)
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Awaiting Review");

    if awaiting.is_empty() {
        let _ = writeln!(output, "Nothing waiting on a mentor.");
    } else {
        for task in awaiting {
            let submitted = task
                .submitted_at
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            let _ = writeln!(output, "- {} (submitted {})", task.title, submitted);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn metric(id: u128, batch: &str, sales: f64) -> ParticipantMetric {
        ParticipantMetric {
            participant_id: Uuid::from_u128(id),
            display_name: format!("Student {id}"),
            email: format!("student{id}@example.com"),
            batch: batch.to_string(),
            sales_amount: sales,
            customer_count: 5,
            task_completion_pct: 90.0,
            attendance_pct: 95.0,
        }
    }

    fn task(status: TaskStatus) -> TaskSubmission {
        TaskSubmission {
            task_id: Uuid::new_v4(),
            participant_id: Uuid::from_u128(1),
            title: "Marketing Strategy".to_string(),
            description: String::new(),
            status,
            deadline: NaiveDate::from_ymd_opt(2023, 10, 15).unwrap(),
            submitted_at: Some(NaiveDate::from_ymd_opt(2023, 10, 14).unwrap()),
            attachment_ref: Some("strategy.pdf".to_string()),
            feedback: None,
            rating: None,
        }
    }

    #[test]
    fn report_lists_ranked_participants_and_counts() {
        let metrics = vec![metric(1, "Summer 2023", 980.0), metric(2, "Summer 2023", 150.0)];
        let tasks = vec![task(TaskStatus::Submitted), task(TaskStatus::Completed)];

        let report = build_report(None, &metrics, &tasks, 10);
        assert!(report.contains("Generated for all batches"));
        assert!(report.contains("1. Student 1"));
        assert!(report.contains("2. Student 2"));
        assert!(report.contains("- submitted: 1"));
        assert!(report.contains("Marketing Strategy (submitted 2023-10-14)"));
    }

    #[test]
    fn report_scopes_to_one_batch() {
        let metrics = vec![metric(1, "Summer 2023", 980.0), metric(2, "Spring 2023", 150.0)];
        let report = build_report(Some("Spring 2023"), &metrics, &[], 10);
        assert!(report.contains("Generated for Spring 2023"));
        assert!(report.contains("1. Student 2"));
        assert!(!report.contains("Student 1"));
        assert!(report.contains("No tasks assigned."));
    }

    #[test]
    fn report_handles_empty_scope() {
        let report = build_report(Some("Winter 2024"), &[], &[], 10);
        assert!(report.contains("No participants in this scope."));
        assert!(report.contains("Nothing waiting on a mentor."));
    }
}
