use std::net::SocketAddr;

use microblog::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let metrics = match telemetry::setup_metrics_recorder() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(error = %err, "prometheus recorder not installed");
            None
        },
    };

    let state = microblog::initialize_state(metrics).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, version = %state.config.version, "server started");

    axum::serve(listener, microblog::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
