use super::reconcile::CompletedTask;
use super::status::TaskState;
use super::types::ModelInfo;

pub fn format_completed(task: &CompletedTask) -> String {
    let mut lines = vec![
        format!("Image generated for task {}", task.key),
        format!("Image: {}", task.artifact_url),
    ];
    if let Some(mini) = &task.mini_artifact_url {
        lines.push(format!("Compressed image: {}", mini));
    }
    if let Some(seed) = &task.seed {
        lines.push(format!("Seed: {}", seed));
    }
    lines.push(format!("Credits consumed: {}", task.cost));
    lines.join("\n")
}

/// Status line for a one-shot query.
pub fn format_status(key: &str, state: &TaskState) -> String {
    let (status, cost) = match state {
        TaskState::Queued { cost } => ("queued, waiting to start".to_string(), *cost),
        TaskState::Generating { cost } => ("generating".to_string(), *cost),
        TaskState::Succeeded {
            artifact_url,
            mini_artifact_url,
            cost,
            ..
        } => {
            let mut text = format!("completed, image: {}", artifact_url);
            if let Some(mini) = mini_artifact_url {
                text.push_str(&format!(" (compressed: {})", mini));
            }
            (text, Some(*cost))
        }
        TaskState::Failed { reason } => (format!("failed: {}", reason), None),
        TaskState::Cancelled { reason } => (format!("cancelled: {}", reason), None),
        TaskState::Unknown { code, cost } => (format!("unknown status {}", code), *cost),
    };

    match cost {
        Some(cost) => format!("Task {}: {}\nCredits consumed so far: {}", key, status, cost),
        None => format!("Task {}: {}", key, status),
    }
}

pub fn format_model_table(models: &[ModelInfo]) -> String {
    let mut out = String::from("| model_code | model_desc |\n| --- | --- |");
    for model in models {
        out.push_str(&format!(
            "\n| {} | {} |",
            model.model_code,
            model.model_desc.replace('|', "\\|")
        ));
    }
    out
}
