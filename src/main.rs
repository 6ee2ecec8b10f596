use anyhow::Result;
use storefront::config::AppConfig;
use storefront::server::ServerBuilder;
use storefront::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;
    let store = storage::connect(&config.storage).await?;
    tokio::fs::create_dir_all(&config.uploads.dir).await?;

    tracing::info!(
        public_url = %config.server.public_url,
        uploads = %config.uploads.dir.display(),
        "starting storefront"
    );

    ServerBuilder::new(config)
        .with_shared_store(store)
        .serve()
        .await
}
