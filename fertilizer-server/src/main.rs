use clap::Parser;
use fertilizer_server::{AppState, ServerConfig, app, init_logging};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = ServerConfig::parse();
    init_logging(&cfg.log);

    let app = app(AppState::from_config(&cfg));
    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    info!(addr = %cfg.addr, delay_ms = cfg.delay_ms, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
