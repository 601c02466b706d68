//! Job state domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job lifecycle state as published on the status update topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Killed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "Queued"),
            JobState::Running => write!(f, "Running"),
            JobState::Succeeded => write!(f, "Succeeded"),
            JobState::Failed => write!(f, "Failed"),
            JobState::Killed => write!(f, "Killed"),
        }
    }
}

/// Status update payload published on every job state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub job_id: String,
    pub state: JobState,
    /// Identity of the manager reporting the transition.
    pub manager: String,
    pub timestamp: DateTime<Utc>,
}
