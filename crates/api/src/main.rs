use anyhow::Context;

use inkwell_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inkwell_observability::init();

    let config = ApiConfig::from_env().context("loading configuration")?;
    let bind_addr = config.bind_addr;
    tracing::info!(?config, "starting");

    let app = inkwell_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
