use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use city_explorer::{init_tracing, router, AppConfig, AppState, Collector, HttpMapsClient, TokioThrottle};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = AppConfig::from_env().context("invalid configuration")?;

    let provider = Arc::new(HttpMapsClient::new(&config)?);
    let collector = Collector::new(provider, Arc::new(TokioThrottle), &config);
    let addr = config.bind_addr.clone();
    let app = router(Arc::new(AppState { config, collector }));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("city explorer listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
