use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Where a task submission sits in the review lifecycle.
///
/// Transitions:
/// - Pending -> Submitted (student submits)
/// - Pending -> Overdue (deadline passed without a submission)
/// - Overdue -> Submitted (late submission still accepted)
/// - Submitted -> Completed (mentor approves)
/// - Submitted -> Resubmit (mentor requests changes)
/// - Resubmit -> Submitted (student resubmits)
///
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Submitted,
    Completed,
    Overdue,
    Resubmit,
}

impl TaskStatus {
    /// Stable lowercase form used in the database and CLI filters.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Resubmit => "resubmit",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "submitted" => Ok(TaskStatus::Submitted),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            "resubmit" => Ok(TaskStatus::Resubmit),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// The mentor's verdict on a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Approve,
    RequestResubmit,
}

/// One student task and its submission state.
///
/// `feedback` and `rating` are only present after a review; a fresh
/// submission clears both. A rating accompanies approval only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSubmission {
    pub task_id: Uuid,
    pub participant_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: NaiveDate,
    pub submitted_at: Option<NaiveDate>,
    pub attachment_ref: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<i32>,
}

/// Per-student performance metrics, one row per leaderboard participant.
///
/// Percentages are clamped to [0,100] at the import boundary; the ranking
/// engine only sorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantMetric {
    pub participant_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub batch: String,
    pub sales_amount: f64,
    pub customer_count: i64,
    pub task_completion_pct: f64,
    pub attendance_pct: f64,
}

/// A leaderboard row: the metric plus its computed score and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub metric: ParticipantMetric,
    pub score: f64,
    pub rank: usize,
}

/// Counts per status for a task list. `pending` folds in overdue tasks
/// (they still await a first submission); `overdue` is also reported on
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub submitted: usize,
    pub completed: usize,
    pub resubmit: usize,
    pub overdue: usize,
}
