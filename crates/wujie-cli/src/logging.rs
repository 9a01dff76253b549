use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Once;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::paths::Paths;

// Used to ensure we only set up tracing once
static INIT: Once = Once::new();

pub fn prepare_log_directory(component: &str) -> Result<PathBuf> {
    let dir = Paths::log_dir(component);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    Ok(dir)
}

/// Sets up JSON file logging under the state directory.
///
/// Nothing is written to stdout: the `mcp` command speaks JSON-RPC there.
pub fn setup_logging(name: Option<&str>) -> Result<()> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = (|| {
            let log_dir = prepare_log_directory("cli")?;
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            let log_filename = match name {
                Some(n) => format!("{}-{}.log", timestamp, n),
                None => format!("{}.log", timestamp),
            };
            let file_appender = tracing_appender::rolling::RollingFileAppender::new(
                Rotation::NEVER,
                log_dir,
                log_filename,
            );

            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(file_appender)
                .with_ansi(false)
                .json();

            let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("")
                    .add_directive("wujie_mcp=debug".parse().unwrap())
                    .add_directive("wujie_cli=info".parse().unwrap())
                    .add_directive(LevelFilter::WARN.into())
            });

            Registry::default()
                .with(file_layer.with_filter(env_filter))
                .try_init()
                .context("Failed to set global subscriber")
        })();
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn log_directory_is_created_under_state_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();
        let _guard = env_lock::lock_env([("WUJIE_PATH_ROOT", Some(root.as_str()))]);

        let log_dir = prepare_log_directory("cli").unwrap();
        assert!(log_dir.is_dir());
        assert!(log_dir.starts_with(temp_dir.path()));
        assert!(log_dir.ends_with("state/logs/cli"));
    }
}
