//! HTTP API: `/bet`, `/deposit`, `/withdraw` plus health and metrics
//!
//! Every handler does one ledger operation against the shared SQLite file and
//! then a best-effort operator notification.

mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;

pub use error::ApiError;
pub use routes::{router, AmountQuery, BetRequest};
pub use state::ApiState;

/// Binds `host:port` and serves the API until Ctrl+C.
pub async fn serve(state: ApiState, host: &str, port: u16, static_dir: Option<&str>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid API address {}:{}: {}", host, port, e))?;
    let app = router(state, static_dir);

    log::info!("Starting API server on http://{}", addr);
    log::info!("  POST /bet       - Place a bet");
    log::info!("  POST /deposit   - Deposit via Paystack");
    log::info!("  POST /withdraw  - Withdraw");
    log::info!("  GET  /health    - Health check");
    log::info!("  GET  /metrics   - Prometheus metrics");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("API server shutting down");
        })
        .await?;

    Ok(())
}
