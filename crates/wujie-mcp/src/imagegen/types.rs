use serde::{Deserialize, Serialize};

pub const SUCCESS_CODE: i64 = 200;

/// Uniform wrapper returned by every remote operation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("code {}", self.code))
    }
}

/// Body of a create-task request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateTaskRequest {
    pub prompt: String,
    pub model: i64,
    pub num: u32,
    pub width: u32,
    pub height: u32,
    pub init_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uc_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct CreateTaskResult {
    #[serde(default)]
    pub results: Vec<TaskKeyInfo>,
    #[serde(default)]
    pub expected_integral_cost: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct TaskKeyInfo {
    #[serde(default)]
    pub key: String,
    /// Estimated wait in seconds.
    #[serde(default)]
    pub expected_second: u64,
    #[serde(default, rename = "batchTask_key")]
    pub batch_task_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct FailMessage {
    #[serde(default)]
    pub fail_code: Option<i64>,
    #[serde(default)]
    pub fail_message: Option<String>,
}

/// Raw task record as returned by the query endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct TaskInfo {
    pub status: i64,
    #[serde(default)]
    pub picture_url: Option<String>,
    /// Compressed copy, only produced for pictures above 20MB.
    #[serde(default)]
    pub mini_picture_url: Option<String>,
    #[serde(default)]
    pub generate_time: Option<i64>,
    #[serde(default)]
    pub start_gen_time: Option<i64>,
    #[serde(default)]
    pub complete_time: Option<i64>,
    #[serde(default)]
    pub involve_yellow: Option<i64>,
    #[serde(default)]
    pub fail_message: Option<FailMessage>,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub integral_cost: Option<i64>,
    #[serde(default)]
    pub integral_cost_message: Option<String>,
}

impl TaskInfo {
    pub fn is_flagged(&self) -> bool {
        self.involve_yellow.is_some_and(|flag| flag != 0)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.fail_message
            .as_ref()
            .and_then(|f| f.fail_message.as_deref())
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model_code: i64,
    #[serde(default)]
    pub model_desc: String,
}
