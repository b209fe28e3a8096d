//! Assignment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::voters::Voter;

/// Lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// A canvassing assignment: a named batch of voters assigned to one
/// canvasser, with progress counters maintained by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub assigned_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub voter_count: i32,
    pub completed_count: i32,
    /// Ordered walk list; present on detail fetches, omitted on list rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<Voter>>,
}

impl Assignment {
    /// Completion ratio in `0.0..=1.0`, clamped so malformed counters can
    /// never push it out of range.
    pub fn progress(&self) -> f64 {
        if self.voter_count <= 0 {
            return 0.0;
        }
        (f64::from(self.completed_count.max(0)) / f64::from(self.voter_count)).clamp(0.0, 1.0)
    }

    pub fn progress_percentage(&self) -> i32 {
        (self.progress() * 100.0).round() as i32
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != AssignmentStatus::Completed,
            None => false,
        }
    }
}
