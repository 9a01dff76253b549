use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::errors::ImageGenError;
use super::gateway::TaskGateway;
use super::types::CreateTaskRequest;
use crate::config::{DEFAULT_DIMENSION, DEFAULT_NUM};

pub const ALLOWED_DIMENSIONS: [u32; 4] = [512, 768, 1024, 1360];

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GenerateImageParams {
    /// What to draw. Style and detail keywords help.
    pub prompt: String,
    /// Model code, see `query_model_infos`. Defaults to the configured model.
    pub model: Option<i64>,
    /// Number of images to generate. Defaults to 1.
    pub num: Option<u32>,
    /// Image width in pixels: one of 512, 768, 1024, 1360. Defaults to 512.
    #[schemars(extend("enum" = [512, 768, 1024, 1360]))]
    pub width: Option<u32>,
    /// Image height in pixels: one of 512, 768, 1024, 1360. Defaults to 512.
    #[schemars(extend("enum" = [512, 768, 1024, 1360]))]
    pub height: Option<u32>,
    /// Negative prompt: things that should not appear in the image.
    pub uc_prompt: Option<String>,
    /// URL of a base image for image-to-image generation.
    pub init_image_url: Option<String>,
    /// Sampling steps.
    pub steps: Option<u32>,
    /// CFG scale, how closely the image follows the prompt.
    pub cfg: Option<f64>,
    /// Sampler preset index.
    pub sampler_index: Option<i64>,
    /// Seed for reproducible output.
    pub seed: Option<String>,
}

impl GenerateImageParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Validates caller input and fills in defaults.
    pub fn into_request(self, default_model: i64) -> Result<CreateTaskRequest, ImageGenError> {
        if self.prompt.trim().is_empty() {
            return Err(ImageGenError::InvalidParams("prompt is required".into()));
        }
        let width = check_dimension("width", self.width)?;
        let height = check_dimension("height", self.height)?;
        let num = self.num.unwrap_or(DEFAULT_NUM);
        if num == 0 {
            return Err(ImageGenError::InvalidParams("num must be at least 1".into()));
        }

        Ok(CreateTaskRequest {
            prompt: self.prompt,
            model: self.model.unwrap_or(default_model),
            num,
            width,
            height,
            init_image_url: self.init_image_url.unwrap_or_default(),
            uc_prompt: self.uc_prompt.filter(|p| !p.is_empty()),
            steps: self.steps,
            cfg: self.cfg,
            sampler_index: self.sampler_index,
            seed: self.seed.filter(|s| !s.is_empty()),
        })
    }
}

fn check_dimension(name: &str, value: Option<u32>) -> Result<u32, ImageGenError> {
    match value {
        None => Ok(DEFAULT_DIMENSION),
        Some(v) if ALLOWED_DIMENSIONS.contains(&v) => Ok(v),
        Some(v) => Err(ImageGenError::InvalidParams(format!(
            "{} must be one of {:?}, got {}",
            name, ALLOWED_DIMENSIONS, v
        ))),
    }
}

/// Handle to a freshly created task.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTask {
    pub key: String,
    pub expected_seconds: u64,
    pub expected_cost: Option<i64>,
}

/// Issues exactly one create request.
pub async fn submit_task(
    gateway: &dyn TaskGateway,
    request: &CreateTaskRequest,
) -> Result<SubmittedTask, ImageGenError> {
    let envelope = gateway.create_task(request).await?;
    if !envelope.is_success() {
        return Err(ImageGenError::CreateRejected(envelope.message_or_default()));
    }

    let result = envelope.data.unwrap_or_default();
    let first = result
        .results
        .into_iter()
        .next()
        .filter(|info| !info.key.is_empty())
        .ok_or(ImageGenError::EmptyKey)?;

    tracing::info!(
        task_key = %first.key,
        expected_second = first.expected_second,
        expected_cost = ?result.expected_integral_cost,
        model = request.model,
        "image task created"
    );

    Ok(SubmittedTask {
        key: first.key,
        expected_seconds: first.expected_second,
        expected_cost: result.expected_integral_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let req = GenerateImageParams::new("a lighthouse").into_request(1018).unwrap();
        assert_eq!(req.model, 1018);
        assert_eq!(req.num, 1);
        assert_eq!((req.width, req.height), (512, 512));
        assert_eq!(req.init_image_url, "");
        assert!(req.steps.is_none());
    }

    #[test]
    fn caller_values_win() {
        let params = GenerateImageParams {
            model: Some(1013),
            width: Some(1360),
            height: Some(768),
            cfg: Some(7.5),
            seed: Some("42".into()),
            ..GenerateImageParams::new("a lighthouse")
        };
        let req = params.into_request(1018).unwrap();
        assert_eq!(req.model, 1013);
        assert_eq!((req.width, req.height), (1360, 768));
        assert_eq!(req.cfg, Some(7.5));
        assert_eq!(req.seed.as_deref(), Some("42"));
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        let params = GenerateImageParams {
            width: Some(640),
            ..GenerateImageParams::new("x")
        };
        let err = params.into_request(1018).unwrap_err();
        assert!(matches!(err, ImageGenError::InvalidParams(msg) if msg.contains("width")));
    }

    #[test]
    fn schema_lists_allowed_dimensions() {
        let schema = serde_json::to_value(schemars::schema_for!(GenerateImageParams)).unwrap();
        let allowed = serde_json::json!(ALLOWED_DIMENSIONS);
        assert_eq!(schema["properties"]["width"]["enum"], allowed);
        assert_eq!(schema["properties"]["height"]["enum"], allowed);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert!(matches!(
            GenerateImageParams::new("  ").into_request(1018),
            Err(ImageGenError::InvalidParams(_))
        ));
    }
}
