//! HTTP surface for status checks and phenotype prediction.
//!
//! - `GET /status` — liveness message
//! - `POST /predict?sequence=<DNA>` — echoes the sequence with its prediction

use axum::{
    Json, Router,
    extract::Query,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::entities::prediction;

pub const STATUS_MESSAGE: &str = "Backend Is Running";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub sequence: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub sequence: String,
    pub prediction: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

async fn predict(Query(params): Query<PredictParams>) -> Json<PredictResponse> {
    let prediction = prediction::predict(&params.sequence);
    Json(PredictResponse {
        sequence: params.sequence,
        prediction,
    })
}

/// Serves the API on `host:port` until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the address is invalid or the listener cannot bind.
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let ip: std::net::IpAddr = host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid host address: {e}"))?;
    let bind = std::net::SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server: {e}"))?;
    tracing::info!("API listening on http://{bind}");
    tracing::info!("  Status:  GET  http://{bind}/status");
    tracing::info!("  Predict: POST http://{bind}/predict?sequence=<DNA>");

    axum::serve(listener, router())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down…");
        })
        .await?;
    Ok(())
}
