pub mod config;
pub mod imagegen;
pub mod mcp_server_runner;

pub use config::{ConfigError, PollSettings, WujieConfig};
pub use imagegen::{ImageGenServer, ImageService};
