// ABOUTME: Job lifecycle types: state, caller-held handle, properties and progress
// ABOUTME: The properties assembler is the single dispatch from a record to its settings

mod progress;
mod properties;

use std::fmt;

pub use progress::JobProgress;
pub use properties::JobProperties;

/// Lifecycle state as reported by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Unsubmitted,
    Active,
    Running,
    Success,
    Failed,
    Cancelled,
    Over,
    Unknown,
}

impl JobState {
    /// Case-insensitive; unrecognized states map to `Unknown`.
    pub fn parse(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "unsubmitted" => JobState::Unsubmitted,
            "active" => JobState::Active,
            "running" => JobState::Running,
            "success" => JobState::Success,
            "failed" => JobState::Failed,
            "cancelled" => JobState::Cancelled,
            "over" => JobState::Over,
            _ => JobState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Unsubmitted => "unsubmitted",
            JobState::Active => "active",
            JobState::Running => "running",
            JobState::Success => "success",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
            JobState::Over => "over",
            JobState::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Success | JobState::Failed | JobState::Cancelled | JobState::Over
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a created job. Returned by job creation and passed back into
/// every later call instead of being remembered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self { id }
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
