// ABOUTME: Request envelope and job lifecycle calls against one service generation
// ABOUTME: Maps transport and status failures into RealityError; no retries

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::auth::TokenProvider;
use super::models::{CostEstimation, CostParameters, ErrorResponse};
use super::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::error::{RealityError, Result};
use crate::job::{JobHandle, JobProgress, JobProperties, JobState};
use crate::service::Service;
use crate::settings::JobSettings;

pub struct ServiceClient {
    service: Service,
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl ServiceClient {
    /// Client on the service's public endpoint over reqwest.
    pub fn new(service: Service, tokens: Arc<dyn TokenProvider>) -> anyhow::Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(
            service,
            service.default_base_url(),
            transport,
            tokens,
        ))
    }

    pub fn with_transport(
        service: Service,
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            service,
            base_url,
            transport,
            tokens,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and returns the parsed body.
    ///
    /// Only GET, DELETE, POST and PATCH are accepted. A status outside
    /// `expected` fails with `UnexpectedStatus`, using the body's
    /// `error.message` and `error.details` when present.
    pub async fn submit_request(
        &self,
        path: &str,
        method: Method,
        expected: &[u16],
        payload: Option<&Value>,
    ) -> Result<Value> {
        if !is_allowed(&method) {
            return Err(RealityError::InvalidMethod(method.to_string()));
        }

        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| RealityError::TokenUnavailable(format!("{:#}", e)))?;

        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Sending request");

        let request = TransportRequest {
            method: method.clone(),
            url: url.clone(),
            headers: vec![
                ("Authorization", format!("Bearer {}", token)),
                ("Accept", self.service.accept_header().to_string()),
                ("Content-Type", "application/json".to_string()),
            ],
            body: payload.cloned(),
        };

        let response = self.transport.send(request).await.map_err(|e| {
            let reason = format!("{:#}", e);
            warn!(method = %method, url = %url, error = %reason, "Request failed");
            RealityError::TransportFailure(reason)
        })?;

        debug!(method = %method, url = %url, status = response.status, "Response received");

        if !expected.contains(&response.status) {
            let message = status_message(response.status, expected, &response.body);
            warn!(status = response.status, message = %message, "Unexpected status");
            return Err(RealityError::UnexpectedStatus {
                status: response.status,
                message,
            });
        }

        Ok(response.body)
    }

    pub async fn create_job(
        &self,
        settings: &JobSettings,
        name: &str,
        owner_id: &str,
    ) -> Result<JobHandle> {
        let mut body = settings.to_wire(self.service)?;
        body.insert("name".to_string(), Value::from(name));
        body.insert(self.service.owner_key().to_string(), Value::from(owner_id));

        let response = self
            .submit_request("/jobs", Method::POST, &[201], Some(&Value::Object(body)))
            .await?;

        let id = response
            .pointer("/job/id")
            .and_then(Value::as_str)
            .ok_or_else(|| RealityError::malformed("creation response has no job id"))?;

        info!(job_id = %id, kind = %settings.kind(), "Created job");
        Ok(JobHandle::new(id))
    }

    pub async fn submit_job(&self, job: &JobHandle) -> Result<()> {
        self.change_state(job, JobState::Active).await
    }

    pub async fn cancel_job(&self, job: &JobHandle) -> Result<()> {
        self.change_state(job, JobState::Cancelled).await
    }

    pub async fn delete_job(&self, job: &JobHandle) -> Result<()> {
        self.submit_request(&job_path(job), Method::DELETE, &[204], None)
            .await?;
        info!(job_id = %job, "Deleted job");
        Ok(())
    }

    pub async fn get_job_properties(&self, job: &JobHandle) -> Result<JobProperties> {
        let body = self
            .submit_request(&job_path(job), Method::GET, &[200], None)
            .await?;
        JobProperties::from_response(self.service, &body)
    }

    /// Queries several jobs concurrently; the first failure wins.
    pub async fn get_jobs_properties(&self, jobs: &[JobHandle]) -> Result<Vec<JobProperties>> {
        futures::future::try_join_all(jobs.iter().map(|job| self.get_job_properties(job))).await
    }

    pub async fn get_job_progress(&self, job: &JobHandle) -> Result<JobProgress> {
        let path = format!("{}/progress", job_path(job));
        let body = self
            .submit_request(&path, Method::GET, &[200], None)
            .await?;
        JobProgress::from_response(&body)
    }

    pub async fn estimate_cost(
        &self,
        job: &JobHandle,
        parameters: &CostParameters,
    ) -> Result<CostEstimation> {
        let payload = json!({ "costEstimationParameters": parameters });
        let body = self
            .submit_request(&job_path(job), Method::PATCH, &[200], Some(&payload))
            .await?;

        let estimation = body
            .pointer("/job/costEstimation")
            .ok_or_else(|| RealityError::malformed("response has no job.costEstimation"))?;
        CostEstimation::deserialize(estimation)
            .map_err(|e| RealityError::malformed(format!("cost estimation: {}", e)))
    }

    /// Polls progress until the job reaches a terminal state.
    pub async fn poll_until_complete(
        &self,
        job: &JobHandle,
        interval: Duration,
        callback: impl Fn(&JobProgress),
    ) -> Result<JobProgress> {
        loop {
            let progress = self.get_job_progress(job).await?;
            callback(&progress);

            if progress.state.is_terminal() {
                return Ok(progress);
            }
            tokio::time::sleep(interval).await;
        }
    }

    async fn change_state(&self, job: &JobHandle, state: JobState) -> Result<()> {
        let payload = json!({ "state": state.as_str() });
        self.submit_request(&job_path(job), Method::PATCH, &[200], Some(&payload))
            .await?;
        info!(job_id = %job, state = %state, "Changed job state");
        Ok(())
    }
}

fn is_allowed(method: &Method) -> bool {
    *method == Method::GET
        || *method == Method::DELETE
        || *method == Method::POST
        || *method == Method::PATCH
}

fn job_path(job: &JobHandle) -> String {
    format!("/jobs/{}", job.id())
}

fn status_message(status: u16, expected: &[u16], body: &Value) -> String {
    match ErrorResponse::deserialize(body) {
        Ok(ErrorResponse { error }) => {
            let mut message = format!("Error {} {}", status, error.message);
            if let Some(details) = error.details {
                message.push_str(&format!(". Details : {}", details));
            }
            message
        }
        Err(_) => format!("Error {}: expected one of {:?}", status, expected),
    }
}
