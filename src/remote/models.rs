// ABOUTME: Serde shapes of job records, progress and error bodies returned by the services
// ABOUTME: Settings portions stay as raw JSON and go through the codec instead

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Metadata of a job record, everything except its settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "iTwinId")]
    pub itwin_id: Option<String>,
    pub workspace_id: Option<String>,
    pub email: Option<String>,
    pub state: Option<String>,
    pub data_center: Option<String>,
    pub created_date_time: Option<String>,
    pub execution_information: Option<ExecutionInformation>,
    pub cost_estimation: Option<CostEstimation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInformation {
    #[serde(alias = "submittedDateTime")]
    pub submission_date_time: Option<String>,
    pub started_date_time: Option<String>,
    pub ended_date_time: Option<String>,
    pub estimated_units: Option<f64>,
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub errors: Vec<JobMessage>,
    #[serde(default)]
    pub warnings: Vec<JobMessage>,
}

/// One error or warning reported by a job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMessage {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimation {
    pub giga_pixels: Option<f64>,
    pub mega_points: Option<f64>,
    pub number_of_photos: Option<f64>,
    pub scene_width: Option<f64>,
    pub scene_height: Option<f64>,
    pub scene_length: Option<f64>,
    pub detector_scale: Option<f64>,
    pub detector_cost: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub estimated_units: Option<f64>,
    pub mesh_quality: Option<String>,
}

/// Inputs to a cost estimation request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub giga_pixels: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mega_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_quality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressResponse {
    pub progress: ProgressInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressInfo {
    pub state: String,
    #[serde(deserialize_with = "percentage")]
    pub percentage: u32,
    #[serde(default)]
    pub step: String,
}

/// `{"error": {"code", "message", "details"}}` body of a failed call.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<Value>,
}

// Progress percentages arrive as "56" from most services, 56 from some.
fn percentage<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid percentage {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("invalid percentage '{}'", s))),
        other => Err(D::Error::custom(format!("invalid percentage {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_record_accepts_workspace_owner() {
        let record: JobRecord = serde_json::from_value(json!({
            "id": "job-1",
            "type": "Full",
            "name": "mesh",
            "workspaceId": "ws-1",
            "state": "active"
        }))
        .unwrap();
        assert_eq!(record.workspace_id.as_deref(), Some("ws-1"));
        assert_eq!(record.itwin_id, None);
        assert!(record.execution_information.is_none());
    }

    #[test]
    fn test_job_record_with_both_owner_keys() {
        let record: JobRecord = serde_json::from_value(json!({
            "type": "Full",
            "iTwinId": "itwin-1",
            "workspaceId": "ws-1"
        }))
        .unwrap();
        assert_eq!(record.id, "");
        assert_eq!(record.itwin_id.as_deref(), Some("itwin-1"));
        assert_eq!(record.workspace_id.as_deref(), Some("ws-1"));
    }

    #[test]
    fn test_execution_information_aliases() {
        let info: ExecutionInformation = serde_json::from_value(json!({
            "submittedDateTime": "2024-01-01T00:00:00Z",
            "estimatedUnits": 3.5,
            "errors": [{"code": "E1", "title": "t", "message": "m", "params": ["a", "b"]}]
        }))
        .unwrap();
        assert_eq!(info.submission_date_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(info.errors[0].params, vec!["a", "b"]);
        assert!(info.warnings.is_empty());
        assert_eq!(info.exit_code, None);
    }

    #[test]
    fn test_percentage_string_or_number() {
        let info: ProgressInfo =
            serde_json::from_value(json!({"state": "active", "percentage": "56", "step": "x"}))
                .unwrap();
        assert_eq!(info.percentage, 56);
        let info: ProgressInfo =
            serde_json::from_value(json!({"state": "active", "percentage": 7})).unwrap();
        assert_eq!(info.percentage, 7);
        assert!(serde_json::from_value::<ProgressInfo>(
            json!({"state": "active", "percentage": "lots"})
        )
        .is_err());
    }

    #[test]
    fn test_cost_parameters_skip_absent_fields() {
        let params = CostParameters {
            giga_pixels: Some(2.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(params).unwrap(), json!({"gigaPixels": 2.0}));
    }
}
