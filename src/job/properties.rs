// ABOUTME: Assembles read-only JobProperties from a raw job record
// ABOUTME: Unknown job types are fatal; absent metadata is tolerated, malformed metadata is not

use serde::Deserialize;
use serde_json::Value;

use super::JobState;
use crate::codec;
use crate::error::{RealityError, Result};
use crate::remote::models::{CostEstimation, JobMessage, JobRecord};
use crate::service::Service;
use crate::settings::{JobKind, JobSettings};

#[derive(Debug, Clone, PartialEq)]
pub struct JobProperties {
    /// Empty when the record carries no id.
    pub id: String,
    pub name: String,
    pub kind: JobKind,
    /// iTwin or workspace owning the job.
    pub owner_id: Option<String>,
    pub email: Option<String>,
    pub data_center: Option<String>,
    pub state: JobState,
    pub created_date_time: Option<String>,
    pub submission_date_time: Option<String>,
    pub started_date_time: Option<String>,
    pub ended_date_time: Option<String>,
    /// `None` until the job has execution information; distinct from zero cost.
    pub estimated_units: Option<f64>,
    pub exit_code: Option<i64>,
    pub errors: Vec<JobMessage>,
    pub warnings: Vec<JobMessage>,
    pub cost_estimation: Option<CostEstimation>,
    pub settings: JobSettings,
}

impl JobProperties {
    /// Reads the `{"job": {...}}` body of a job query.
    pub fn from_response(service: Service, body: &Value) -> Result<Self> {
        let record = body
            .get("job")
            .ok_or_else(|| RealityError::malformed("response has no 'job'"))?;
        Self::from_record(service, record)
    }

    pub fn from_record(service: Service, record: &Value) -> Result<Self> {
        let object = record
            .as_object()
            .ok_or_else(|| RealityError::malformed("job record must be an object"))?;
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RealityError::malformed("job record has no type"))?;
        let kind = service.parse_job_kind(tag)?;

        let settings = codec::decode(kind, object, service.convention())?;
        let meta = JobRecord::deserialize(record)
            .map_err(|e| RealityError::malformed(format!("job record: {}", e)))?;

        let (preferred, fallback) = match service.owner_key() {
            "workspaceId" => (meta.workspace_id, meta.itwin_id),
            _ => (meta.itwin_id, meta.workspace_id),
        };

        let mut properties = JobProperties {
            id: meta.id,
            name: meta.name,
            kind,
            owner_id: preferred.or(fallback),
            email: meta.email,
            data_center: meta.data_center,
            state: meta
                .state
                .as_deref()
                .map(JobState::parse)
                .unwrap_or(JobState::Unknown),
            created_date_time: meta.created_date_time,
            submission_date_time: None,
            started_date_time: None,
            ended_date_time: None,
            estimated_units: None,
            exit_code: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            cost_estimation: meta.cost_estimation,
            settings,
        };

        if let Some(execution) = meta.execution_information {
            properties.submission_date_time = execution.submission_date_time;
            properties.started_date_time = execution.started_date_time;
            properties.ended_date_time = execution.ended_date_time;
            properties.estimated_units = execution.estimated_units;
            properties.exit_code = execution.exit_code;
            properties.errors = execution.errors;
            properties.warnings = execution.warnings;
        }

        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn o2d_record() -> Value {
        json!({
            "id": "job-id",
            "type": "objects2D",
            "name": "O2D job",
            "iTwinId": "itwin-id",
            "email": "user@example.com",
            "state": "Success",
            "dataCenter": "EastUs",
            "createdDateTime": "2024-03-01T10:00:00Z",
            "inputs": [
                {"type": "photos", "id": "photosId"},
                {"type": "photoObjectDetector", "id": "detectorId"}
            ],
            "outputs": [{"type": "objects2D", "id": "objects2DId"}],
            "options": {"minPhotos": "3"},
            "executionInformation": {
                "submissionDateTime": "2024-03-01T10:01:00Z",
                "startedDateTime": "2024-03-01T10:02:00Z",
                "endedDateTime": "2024-03-01T10:09:00Z",
                "estimatedUnits": 1.25,
                "exitCode": 0,
                "warnings": [
                    {"code": "W1", "title": "Few photos", "message": "%1 of %2", "params": ["3", "12"]}
                ]
            },
            "costEstimation": {"gigaPixels": 1.5, "numberOfPhotos": 12, "estimatedCost": 4.2}
        })
    }

    #[test]
    fn test_assembles_full_record() {
        let properties = JobProperties::from_record(Service::AnalysisV1, &o2d_record()).unwrap();

        assert_eq!(properties.id, "job-id");
        assert_eq!(properties.kind, JobKind::Objects2D);
        assert_eq!(properties.state, JobState::Success);
        assert_eq!(properties.owner_id.as_deref(), Some("itwin-id"));
        assert_eq!(properties.ended_date_time.as_deref(), Some("2024-03-01T10:09:00Z"));
        assert_eq!(properties.estimated_units, Some(1.25));
        assert_eq!(properties.exit_code, Some(0));
        assert_eq!(properties.warnings[0].params, vec!["3", "12"]);
        assert!(properties.errors.is_empty());

        let cost = properties.cost_estimation.unwrap();
        assert_eq!(cost.number_of_photos, Some(12.0));
        assert_eq!(cost.estimated_cost, Some(4.2));
        assert_eq!(cost.mega_points, None);

        assert_eq!(properties.settings.input("photos"), Some("photosId"));
        assert_eq!(properties.settings.output("objects2D"), Some("objects2DId"));
        assert_eq!(
            properties.settings.option("minPhotos").unwrap().as_int(),
            Some(3)
        );
    }

    #[test]
    fn test_without_execution_information_cost_is_unset() {
        let mut record = o2d_record();
        let object = record.as_object_mut().unwrap();
        object.remove("executionInformation");
        object.remove("costEstimation");

        let properties = JobProperties::from_record(Service::AnalysisV1, &record).unwrap();
        assert_eq!(properties.created_date_time.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(properties.submission_date_time, None);
        assert_eq!(properties.estimated_units, None);
        assert_eq!(properties.exit_code, None);
        assert!(properties.cost_estimation.is_none());
    }

    #[test]
    fn test_unknown_job_type_is_fatal() {
        let mut record = o2d_record();
        record["type"] = json!("invalidJobType");
        let err = JobProperties::from_record(Service::AnalysisV1, &record).unwrap_err();
        assert_eq!(err, RealityError::UnknownJobKind("invalidJobType".to_string()));
        assert!(err.to_string().contains("invalidJobType"));
    }

    #[test]
    fn test_unknown_slot_in_record_is_fatal() {
        let mut record = o2d_record();
        record["outputs"] = json!([{"type": "exportedLines3DDGN", "id": "x"}]);
        let err = JobProperties::from_record(Service::AnalysisV1, &record).unwrap_err();
        assert!(matches!(err, RealityError::UnknownSlotKind { .. }));
        assert!(err.to_string().contains("exportedLines3DDGN"));
    }

    #[test]
    fn test_malformed_execution_information_is_rejected() {
        let mut record = o2d_record();
        record["executionInformation"] = json!("yesterday");
        let err = JobProperties::from_record(Service::AnalysisV1, &record).unwrap_err();
        assert!(matches!(err, RealityError::MalformedPayload(_)));
    }

    #[test]
    fn test_from_response_unwraps_job() {
        let body = json!({"job": o2d_record()});
        let properties = JobProperties::from_response(Service::AnalysisV1, &body).unwrap();
        assert_eq!(properties.name, "O2D job");

        let err = JobProperties::from_response(Service::AnalysisV1, &json!({})).unwrap_err();
        assert!(matches!(err, RealityError::MalformedPayload(_)));
    }

    #[test]
    fn test_modeling_record() {
        let record = json!({
            "id": "cc-job",
            "type": "Reconstruction",
            "name": "mesh",
            "workspaceId": "ws",
            "state": "over",
            "inputs": [{"id": "photos"}, {"id": "orientations"}],
            "settings": {
                "outputs": [{"format": "Cesium 3D Tiles", "id": "tiles-id"}],
                "meshQuality": "Draft"
            },
            "executionInformation": {"submittedDateTime": "2024-01-01T00:00:00Z"}
        });
        let properties = JobProperties::from_record(Service::Modeling, &record).unwrap();
        assert_eq!(properties.state, JobState::Over);
        assert_eq!(properties.owner_id.as_deref(), Some("ws"));
        assert_eq!(
            properties.submission_date_time.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
        assert_eq!(properties.settings.input_ids("realityData").len(), 2);
        assert_eq!(properties.settings.output("Cesium 3D Tiles"), Some("tiles-id"));
    }

    #[test]
    fn test_record_with_only_type_and_settings() {
        let record = json!({
            "type": "objects2D",
            "inputs": [{"type": "photos", "id": "photosId"}],
            "options": {"minPhotos": "4"}
        });
        let properties = JobProperties::from_record(Service::AnalysisV1, &record).unwrap();
        assert_eq!(properties.id, "");
        assert_eq!(properties.name, "");
        assert_eq!(properties.state, JobState::Unknown);
        assert_eq!(properties.owner_id, None);
        assert_eq!(properties.settings.input("photos"), Some("photosId"));
        assert_eq!(
            properties.settings.option("minPhotos").unwrap().as_int(),
            Some(4)
        );
    }

    #[test]
    fn test_owner_prefers_the_service_owner_key() {
        let record = json!({
            "id": "cc-job",
            "type": "Full",
            "iTwinId": "itwin",
            "workspaceId": "ws",
            "inputs": [{"id": "photos"}]
        });
        let properties = JobProperties::from_record(Service::Modeling, &record).unwrap();
        assert_eq!(properties.owner_id.as_deref(), Some("ws"));

        let mut record = o2d_record();
        record["workspaceId"] = json!("ws");
        let properties = JobProperties::from_record(Service::AnalysisV1, &record).unwrap();
        assert_eq!(properties.owner_id.as_deref(), Some("itwin-id"));
    }
}
