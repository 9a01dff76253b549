use super::types::TaskInfo;

pub const POLICY_VIOLATION_MESSAGE: &str =
    "the generated image was flagged as inappropriate content";
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";
pub const ZERO_COST_MESSAGE: &str = "no credits were consumed, the account balance may be insufficient";

/// Semantic bucket of a raw remote status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Queued,
    Generating,
    Succeeded,
    Failed,
    Cancelled,
    Unknown,
}

impl StatusCategory {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 | 1 | 11 => StatusCategory::Queued,
            2 => StatusCategory::Generating,
            4 => StatusCategory::Succeeded,
            3 | 12 => StatusCategory::Failed,
            -1 => StatusCategory::Cancelled,
            _ => StatusCategory::Unknown,
        }
    }
}

/// A task record classified into one of the reconciler's states.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Queued {
        cost: Option<i64>,
    },
    Generating {
        cost: Option<i64>,
    },
    Succeeded {
        artifact_url: String,
        mini_artifact_url: Option<String>,
        cost: i64,
        seed: Option<String>,
    },
    Failed {
        reason: String,
    },
    Cancelled {
        reason: String,
    },
    Unknown {
        code: i64,
        cost: Option<i64>,
    },
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded { .. } | TaskState::Failed { .. } | TaskState::Cancelled { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskState::Queued { .. } => "queued",
            TaskState::Generating { .. } => "generating",
            TaskState::Succeeded { .. } => "succeeded",
            TaskState::Failed { .. } => "failed",
            TaskState::Cancelled { .. } => "cancelled",
            TaskState::Unknown { .. } => "unknown",
        }
    }
}

/// Classifies one query response. Rules are checked in order and the first match wins:
/// zero cost, flagged success, success, failure/cancellation, queued, generating, unknown.
pub fn classify(info: &TaskInfo) -> TaskState {
    let category = StatusCategory::from_code(info.status);

    if info.integral_cost == Some(0) {
        let reason = info
            .integral_cost_message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| ZERO_COST_MESSAGE.to_string());
        return TaskState::Failed { reason };
    }

    match category {
        StatusCategory::Succeeded if info.is_flagged() => TaskState::Failed {
            reason: POLICY_VIOLATION_MESSAGE.to_string(),
        },
        StatusCategory::Succeeded => TaskState::Succeeded {
            artifact_url: info.picture_url.clone().unwrap_or_default(),
            mini_artifact_url: info.mini_picture_url.clone().filter(|u| !u.is_empty()),
            cost: info.integral_cost.unwrap_or_default(),
            seed: info.seed.clone().filter(|s| !s.is_empty()),
        },
        StatusCategory::Failed => TaskState::Failed {
            reason: failure_reason(info),
        },
        StatusCategory::Cancelled => TaskState::Cancelled {
            reason: failure_reason(info),
        },
        StatusCategory::Queued => TaskState::Queued {
            cost: info.integral_cost,
        },
        StatusCategory::Generating => TaskState::Generating {
            cost: info.integral_cost,
        },
        StatusCategory::Unknown => TaskState::Unknown {
            code: info.status,
            cost: info.integral_cost,
        },
    }
}

fn failure_reason(info: &TaskInfo) -> String {
    info.failure_reason()
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
        .to_string()
}
