use anyhow::Result;
use wujie_cli::cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli().await
}
