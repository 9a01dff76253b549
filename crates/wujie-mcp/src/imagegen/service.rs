use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::errors::ImageGenError;
use super::format::{format_completed, format_model_table, format_status};
use super::gateway::{TaskGateway, WujieClient};
use super::reconcile::{query_state, Reconciler};
use super::submit::{submit_task, GenerateImageParams};
use super::types::ModelInfo;
use crate::config::WujieConfig;

/// The three tool operations, independent of the MCP surface.
#[derive(Clone)]
pub struct ImageService {
    gateway: Arc<dyn TaskGateway>,
    reconciler: Reconciler,
    default_model: i64,
}

impl ImageService {
    pub fn new(gateway: Arc<dyn TaskGateway>, config: &WujieConfig) -> Self {
        Self {
            reconciler: Reconciler::new(gateway.clone(), config.poll.clone()),
            gateway,
            default_model: config.default_model,
        }
    }

    pub fn from_config(config: &WujieConfig) -> Result<Self, ImageGenError> {
        let client = WujieClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Submits a task and waits for its terminal state.
    pub async fn generate(
        &self,
        params: GenerateImageParams,
        cancel: CancellationToken,
    ) -> Result<String, ImageGenError> {
        let request = params.into_request(self.default_model)?;
        let task = submit_task(self.gateway.as_ref(), &request).await?;
        let completed = self.reconciler.wait_for_completion(&task, cancel).await?;
        Ok(format_completed(&completed))
    }

    pub async fn query(&self, key: &str) -> Result<String, ImageGenError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ImageGenError::InvalidParams("task key is required".into()));
        }
        let state = query_state(self.gateway.as_ref(), key).await?;
        tracing::debug!(task_key = %key, status = state.label(), "queried task once");
        Ok(format_status(key, &state))
    }

    pub async fn fetch_models(&self) -> Result<Vec<ModelInfo>, ImageGenError> {
        let envelope = self.gateway.list_models().await?;
        if !envelope.is_success() {
            return Err(ImageGenError::CatalogRejected(envelope.message_or_default()));
        }
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn list_models(&self) -> Result<String, ImageGenError> {
        let models = self.fetch_models().await?;
        Ok(format_model_table(&models))
    }
}
