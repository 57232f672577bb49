use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{ReviewOutcome, StatusCounts, TaskStatus, TaskSubmission};

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot {action} a task in the '{status}' state")]
    InvalidTransition {
        action: &'static str,
        status: TaskStatus,
    },
    #[error("a submission requires an attached file")]
    MissingAttachment,
    #[error("invalid review: {reason}")]
    InvalidReview { reason: &'static str },
}

/// Submit (or resubmit) a task.
///
/// Legal from `Pending`, `Overdue`, and `Resubmit`. Returns a copy with the
/// submission recorded and any previous review cleared: stale feedback must
/// not sit next to a new, unreviewed submission.
pub fn submit(
    task: &TaskSubmission,
    submitted_at: NaiveDate,
    attachment_ref: &str,
) -> Result<TaskSubmission, LifecycleError> {
    match task.status {
        TaskStatus::Pending | TaskStatus::Overdue | TaskStatus::Resubmit => {}
        status => {
            return Err(LifecycleError::InvalidTransition {
                action: "submit",
                status,
            })
        }
    }
    if attachment_ref.trim().is_empty() {
        return Err(LifecycleError::MissingAttachment);
    }

    Ok(TaskSubmission {
        status: TaskStatus::Submitted,
        submitted_at: Some(submitted_at),
        attachment_ref: Some(attachment_ref.to_string()),
        feedback: None,
        rating: None,
        ..task.clone()
    })
}

/// Record a mentor's review of a submitted task.
///
/// `Approve` requires a rating in [0,5] and finishes the task; feedback is
/// optional. `RequestResubmit` requires non-empty feedback and no rating,
/// and loops the task back for another submission.
pub fn review(
    task: &TaskSubmission,
    outcome: ReviewOutcome,
    feedback: &str,
    rating: Option<i32>,
) -> Result<TaskSubmission, LifecycleError> {
    if task.status != TaskStatus::Submitted {
        return Err(LifecycleError::InvalidTransition {
            action: "review",
            status: task.status,
        });
    }

    match outcome {
        ReviewOutcome::Approve => {
            let rating = rating.ok_or(LifecycleError::InvalidReview {
                reason: "approval requires a rating",
            })?;
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(LifecycleError::InvalidReview {
                    reason: "rating must be between 0 and 5",
                });
            }
            Ok(TaskSubmission {
                status: TaskStatus::Completed,
                feedback: non_empty(feedback),
                rating: Some(rating),
                ..task.clone()
            })
        }
        ReviewOutcome::RequestResubmit => {
            if rating.is_some() {
                return Err(LifecycleError::InvalidReview {
                    reason: "a resubmit request carries no rating",
                });
            }
            let feedback = non_empty(feedback).ok_or(LifecycleError::InvalidReview {
                reason: "a resubmit request requires feedback",
            })?;
            Ok(TaskSubmission {
                status: TaskStatus::Resubmit,
                feedback: Some(feedback),
                rating: None,
                ..task.clone()
            })
        }
    }
}

/// Flip a pending task to overdue once its deadline has passed.
///
/// A submission on the deadline date itself is still on time, so the
/// comparison is strictly greater. Idempotent, and a no-op for every status
/// other than `Pending`: a submission already in flight is never silently
/// marked overdue.
pub fn mark_overdue(task: &TaskSubmission, today: NaiveDate) -> TaskSubmission {
    if task.status == TaskStatus::Pending && today > task.deadline {
        TaskSubmission {
            status: TaskStatus::Overdue,
            ..task.clone()
        }
    } else {
        task.clone()
    }
}

/// Run `mark_overdue` across a whole task list.
pub fn sweep_overdue(tasks: &[TaskSubmission], today: NaiveDate) -> Vec<TaskSubmission> {
    tasks.iter().map(|task| mark_overdue(task, today)).collect()
}

pub fn status_counts(tasks: &[TaskSubmission]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::Overdue => {
                counts.pending += 1;
                counts.overdue += 1;
            }
            TaskStatus::Submitted => counts.submitted += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Resubmit => counts.resubmit += 1,
        }
    }
    counts
}

/// Order tasks the way the portal lists them: work still owed first
/// (pending and overdue), then resubmits, then submitted, then completed.
pub fn display_order(tasks: &[TaskSubmission]) -> Vec<TaskSubmission> {
    let group = |status: TaskStatus| match status {
        TaskStatus::Pending | TaskStatus::Overdue => 0,
        TaskStatus::Resubmit => 1,
        TaskStatus::Submitted => 2,
        TaskStatus::Completed => 3,
    };
    let mut ordered = tasks.to_vec();
    ordered.sort_by_key(|task| group(task.status));
    ordered
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
