use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::models::{
    ActivateRequest, ActivationResponse, DeviceStatus, Formula, OverlapCheck, QuizRequest,
    QuizResponse, Schedule, ScheduleDraft, ScheduleList, ScheduleStatus,
};

/// Everything the diffuser backend exposes under `/api/*`. Trait-shaped so
/// the synchronizer and CLI can run against a test double.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn activate(&self, request: &ActivateRequest) -> Result<ActivationResponse>;
    async fn deactivate(&self) -> Result<ActivationResponse>;
    async fn status(&self) -> Result<DeviceStatus>;

    async fn schedule_status(&self) -> Result<ScheduleStatus>;
    async fn pause_schedule(&self) -> Result<ActivationResponse>;
    async fn resume_schedule(&self) -> Result<ActivationResponse>;
    async fn clear_override(&self) -> Result<ActivationResponse>;

    async fn list_schedules(&self) -> Result<ScheduleList>;
    async fn create_schedule(&self, draft: &ScheduleDraft) -> Result<Schedule>;
    async fn update_schedule(&self, id: u32, draft: &ScheduleDraft) -> Result<Schedule>;
    async fn delete_schedule(&self, id: u32) -> Result<()>;
    async fn check_overlap(&self, draft: &ScheduleDraft) -> Result<OverlapCheck>;

    async fn submit_quiz(&self, answers: &[Formula]) -> Result<QuizResponse>;
}

pub type SharedApi = Arc<dyn DeviceApi>;

/// reqwest-backed implementation against a configurable base URL.
pub struct HttpDeviceApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpDeviceApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{method} {url}");

        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| ClientError::Network(format!("invalid response body: {err}")))?;

        if !status.is_success() {
            return Err(Self::error_from(status, &payload));
        }

        serde_json::from_value(payload)
            .map_err(|err| ClientError::Network(format!("unexpected response shape: {err}")))
    }

    fn error_from(status: StatusCode, payload: &Value) -> ClientError {
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));
        ClientError::Network(message)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(Method::GET, endpoint, None::<&Value>).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        self.request(Method::POST, endpoint, Some(body)).await
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    async fn activate(&self, request: &ActivateRequest) -> Result<ActivationResponse> {
        self.post("/api/activate", request).await
    }

    async fn deactivate(&self) -> Result<ActivationResponse> {
        self.post("/api/deactivate", &Value::Object(Default::default()))
            .await
    }

    async fn status(&self) -> Result<DeviceStatus> {
        self.get("/api/status").await
    }

    async fn schedule_status(&self) -> Result<ScheduleStatus> {
        self.get("/api/schedule-status").await
    }

    async fn pause_schedule(&self) -> Result<ActivationResponse> {
        self.post("/api/pause-schedule", &Value::Object(Default::default()))
            .await
    }

    async fn resume_schedule(&self) -> Result<ActivationResponse> {
        self.post("/api/resume-schedule", &Value::Object(Default::default()))
            .await
    }

    async fn clear_override(&self) -> Result<ActivationResponse> {
        self.post("/api/clear-override", &Value::Object(Default::default()))
            .await
    }

    async fn list_schedules(&self) -> Result<ScheduleList> {
        self.get("/api/schedules").await
    }

    async fn create_schedule(&self, draft: &ScheduleDraft) -> Result<Schedule> {
        draft.validate()?;
        self.post("/api/schedules", draft).await
    }

    async fn update_schedule(&self, id: u32, draft: &ScheduleDraft) -> Result<Schedule> {
        draft.validate()?;
        self.request(Method::PUT, &format!("/api/schedules/{id}"), Some(draft))
            .await
    }

    async fn delete_schedule(&self, id: u32) -> Result<()> {
        let _: Value = self
            .request(Method::DELETE, &format!("/api/schedules/{id}"), None::<&Value>)
            .await?;
        Ok(())
    }

    async fn check_overlap(&self, draft: &ScheduleDraft) -> Result<OverlapCheck> {
        self.post("/api/schedules/check-overlap", draft).await
    }

    async fn submit_quiz(&self, answers: &[Formula]) -> Result<QuizResponse> {
        let request = QuizRequest {
            answers: answers.to_vec(),
        };
        self.post("/api/quiz-result", &request).await
    }
}
