/// API сервер оценки риска

use std::sync::Arc;

use health_risk_ml::{
    api::{self, AppState},
    config::{ServerConfig, TrainingConfig},
    RiskService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let server = ServerConfig::from_env();
    let training = TrainingConfig::from_env();
    tracing::info!(
        "Risk model: {} samples, {} epochs (trained on first request)",
        training.samples,
        training.epochs
    );

    let state = AppState {
        service: Arc::new(RiskService::new(training)),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(server.bind_addr).await?;
    tracing::info!("Server listening on http://{}", server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
