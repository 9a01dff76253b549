use etcetera::{choose_app_strategy, AppStrategy, AppStrategyArgs};
use std::path::PathBuf;

pub struct Paths;

impl Paths {
    /// Platform state directory, or `$WUJIE_PATH_ROOT/state` when that override is set.
    pub fn state_dir() -> PathBuf {
        if let Ok(test_root) = std::env::var("WUJIE_PATH_ROOT") {
            return PathBuf::from(test_root).join("state");
        }
        match choose_app_strategy(AppStrategyArgs {
            top_level_domain: "Wujie".to_string(),
            author: "Wujie".to_string(),
            app_name: "wujie".to_string(),
        }) {
            Ok(strategy) => strategy.state_dir().unwrap_or(strategy.data_dir()),
            Err(_) => std::env::temp_dir().join("wujie"),
        }
    }

    pub fn in_state_dir(subpath: &str) -> PathBuf {
        Self::state_dir().join(subpath)
    }

    pub fn log_dir(component: &str) -> PathBuf {
        Self::in_state_dir("logs").join(component)
    }
}
