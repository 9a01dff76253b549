use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};

use crate::config::WujieConfig;
use crate::imagegen::{ImageGenServer, ImageService};

pub async fn serve<S>(server: S) -> Result<()>
where
    S: rmcp::ServerHandler,
{
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}

/// Builds the image server from configuration and serves it over stdio until the client disconnects.
pub async fn serve_image_server(config: &WujieConfig) -> Result<()> {
    let service = ImageService::from_config(config)?;
    tracing::info!(
        base_url = %config.base_url,
        default_model = config.default_model,
        "starting image generation MCP server"
    );
    serve(ImageGenServer::new(service)).await
}
