// ABOUTME: Maps a progress response to state, percentage and current step
// ABOUTME: Percentages may arrive string-encoded and are parsed at the boundary

use serde::Deserialize;
use serde_json::Value;

use super::JobState;
use crate::error::{RealityError, Result};
use crate::remote::models::ProgressResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub state: JobState,
    /// Percentage in `0..=100`.
    pub progress: u32,
    pub step: String,
}

impl JobProgress {
    pub fn from_response(body: &Value) -> Result<Self> {
        let response = ProgressResponse::deserialize(body)
            .map_err(|e| RealityError::malformed(format!("progress response: {}", e)))?;
        Ok(Self {
            state: JobState::parse(&response.progress.state),
            progress: response.progress.percentage,
            step: response.progress.step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_progress_mapping() {
        let body = json!({"progress": {"percentage": "56", "state": "active", "step": "Run_Production"}});
        let progress = JobProgress::from_response(&body).unwrap();
        assert_eq!(
            progress,
            JobProgress {
                state: JobState::Active,
                progress: 56,
                step: "Run_Production".to_string()
            }
        );
    }

    #[test]
    fn test_progress_state_is_lowercased() {
        let body = json!({"progress": {"percentage": "100", "state": "Success", "step": ""}});
        assert_eq!(JobProgress::from_response(&body).unwrap().state, JobState::Success);
    }

    #[test]
    fn test_missing_progress_is_malformed() {
        let err = JobProgress::from_response(&json!({"job": {}})).unwrap_err();
        assert!(matches!(err, RealityError::MalformedPayload(_)));
    }
}
