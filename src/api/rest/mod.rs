pub mod auth;
pub mod orders;
pub mod session;
pub mod ws;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::engine::projection::status_counts;
use crate::error::AppError;
use crate::models::status::OrderStatus;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(orders::router())
        .merge(session::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    phase: &'static str,
    orders: usize,
    pending: usize,
    in_progress: usize,
    delivered: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let orders = state.store.list().await?;
    let counts = status_counts(&orders);
    let phase = state.session.read().await.phase().label();

    Ok(Json(HealthResponse {
        status: "ok",
        phase,
        orders: orders.len(),
        pending: counts.get(&OrderStatus::Pending).copied().unwrap_or(0),
        in_progress: counts.get(&OrderStatus::InProgress).copied().unwrap_or(0),
        delivered: counts.get(&OrderStatus::Delivered).copied().unwrap_or(0),
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
