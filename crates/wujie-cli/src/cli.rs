use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use wujie_mcp::imagegen::GenerateImageParams;
use wujie_mcp::WujieConfig;

use crate::commands::{info::handle_info, tools};

#[derive(Parser)]
#[command(
    name = "wujie",
    author,
    version,
    about = "Wujie AI image generation over MCP",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What to draw
    prompt: String,

    /// Model code (see `wujie models`)
    #[arg(long)]
    model: Option<i64>,

    /// Number of images
    #[arg(long)]
    num: Option<u32>,

    /// Width in pixels: 512, 768, 1024 or 1360
    #[arg(long)]
    width: Option<u32>,

    /// Height in pixels: 512, 768, 1024 or 1360
    #[arg(long)]
    height: Option<u32>,

    /// Negative prompt
    #[arg(long = "negative")]
    uc_prompt: Option<String>,

    /// Base image URL for image-to-image generation
    #[arg(long)]
    init_image_url: Option<String>,

    #[arg(long)]
    steps: Option<u32>,

    #[arg(long)]
    cfg: Option<f64>,

    #[arg(long)]
    sampler_index: Option<i64>,

    #[arg(long)]
    seed: Option<String>,
}

impl From<GenerateArgs> for GenerateImageParams {
    fn from(args: GenerateArgs) -> Self {
        GenerateImageParams {
            prompt: args.prompt,
            model: args.model,
            num: args.num,
            width: args.width,
            height: args.height,
            uc_prompt: args.uc_prompt,
            init_image_url: args.init_image_url,
            steps: args.steps,
            cfg: args.cfg,
            sampler_index: args.sampler_index,
            seed: args.seed,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Serve the image generation tools over stdio
    #[command(about = "Run the MCP server on stdio")]
    Mcp,

    /// Submit a prompt and wait for the image
    #[command(about = "Generate an image and wait for it")]
    Generate(GenerateArgs),

    /// Show the current status of a task
    #[command(about = "Query a task once")]
    Query {
        /// Task key returned by `generate`
        key: String,
    },

    /// List available models
    #[command(about = "List image models")]
    Models,

    /// Show resolved configuration and paths
    #[command(about = "Display configuration and log location")]
    Info,
}

impl Command {
    /// Suffix for this run's log file.
    fn log_name(&self) -> &'static str {
        match self {
            Command::Mcp => "mcp",
            Command::Generate(_) => "generate",
            Command::Query { .. } => "query",
            Command::Models => "models",
            Command::Info => "info",
        }
    }
}

pub async fn cli() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = crate::logging::setup_logging(Some(cli.command.log_name())) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if let Command::Info = cli.command {
        return handle_info();
    }

    // A missing credential stops the process before any server or request starts.
    let config = WujieConfig::load()?;

    match cli.command {
        Command::Mcp => wujie_mcp::mcp_server_runner::serve_image_server(&config).await,
        Command::Generate(args) => tools::handle_generate(&config, args.into()).await,
        Command::Query { key } => tools::handle_query(&config, &key).await,
        Command::Models => tools::handle_models(&config).await,
        Command::Info => handle_info(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_file_is_named_after_the_subcommand() {
        let cli = Cli::try_parse_from(["wujie", "mcp"]).unwrap();
        assert_eq!(cli.command.log_name(), "mcp");
        let cli = Cli::try_parse_from(["wujie", "query", "abc123"]).unwrap();
        assert_eq!(cli.command.log_name(), "query");
    }

    #[test]
    fn generate_args_become_tool_params() {
        let cli = Cli::try_parse_from([
            "wujie",
            "generate",
            "a red fox",
            "--width",
            "1024",
            "--negative",
            "blur",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let params: GenerateImageParams = args.into();
        assert_eq!(params.prompt, "a red fox");
        assert_eq!(params.width, Some(1024));
        assert_eq!(params.uc_prompt.as_deref(), Some("blur"));
        assert!(params.model.is_none());
    }
}
