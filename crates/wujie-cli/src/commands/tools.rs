use anyhow::Result;
use tokio_util::sync::CancellationToken;
use wujie_mcp::imagegen::GenerateImageParams;
use wujie_mcp::{ImageService, WujieConfig};

pub async fn handle_generate(config: &WujieConfig, params: GenerateImageParams) -> Result<()> {
    let service = ImageService::from_config(config)?;
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, aborting poll loop");
            on_ctrl_c.cancel();
        }
    });

    eprintln!("Submitting task, this can take a while...");
    let text = service.generate(params, cancel).await?;
    println!("{}", text);
    Ok(())
}

pub async fn handle_query(config: &WujieConfig, key: &str) -> Result<()> {
    let service = ImageService::from_config(config)?;
    println!("{}", service.query(key).await?);
    Ok(())
}

pub async fn handle_models(config: &WujieConfig) -> Result<()> {
    let service = ImageService::from_config(config)?;
    println!("{}", service.list_models().await?);
    Ok(())
}
