use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::errors::ImageGenError;
use super::types::{CreateTaskRequest, CreateTaskResult, Envelope, ModelInfo, TaskInfo};
use crate::config::{WujieConfig, CREATE_TASK_PATH, MODEL_INFOS_PATH, QUERY_TASK_PATH};

/// The three remote operations of the image service.
///
/// Implementations only surface transport problems as errors. A non-success
/// envelope is returned as-is so callers can choose the failure to report.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<Envelope<CreateTaskResult>, ImageGenError>;

    async fn query_task(&self, key: &str) -> Result<Envelope<TaskInfo>, ImageGenError>;

    async fn list_models(&self) -> Result<Envelope<Vec<ModelInfo>>, ImageGenError>;
}

/// HTTP gateway. Holds one `reqwest::Client`, safe to share across concurrent calls.
#[derive(Debug, Clone)]
pub struct WujieClient {
    client: Client,
    base_url: Url,
}

impl WujieClient {
    pub fn new(config: &WujieConfig) -> Result<Self, ImageGenError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ImageGenError::RequestFailed(format!("invalid API key header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        // Trailing slash so endpoint paths land under any prefix, e.g. `/proxy`.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ImageGenError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ImageGenError::RequestFailed(format!("invalid endpoint {path}: {e}")))
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: Response,
    ) -> Result<Envelope<T>, ImageGenError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageGenError::RequestFailed(format!(
                "status: {}, body: {}",
                status, body
            )));
        }
        Ok(response.json::<Envelope<T>>().await?)
    }
}

#[async_trait]
impl TaskGateway for WujieClient {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<Envelope<CreateTaskResult>, ImageGenError> {
        let url = self.endpoint(CREATE_TASK_PATH)?;
        let response = self.client.post(url).json(request).send().await?;
        Self::read_envelope(response).await
    }

    async fn query_task(&self, key: &str) -> Result<Envelope<TaskInfo>, ImageGenError> {
        let url = self.endpoint(QUERY_TASK_PATH)?;
        let response = self.client.get(url).query(&[("key", key)]).send().await?;
        Self::read_envelope(response).await
    }

    async fn list_models(&self) -> Result<Envelope<Vec<ModelInfo>>, ImageGenError> {
        let url = self.endpoint(MODEL_INFOS_PATH)?;
        let response = self.client.get(url).send().await?;
        Self::read_envelope(response).await
    }
}
