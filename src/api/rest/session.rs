use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::engine::transition::apply_status_transition;
use crate::error::AppError;
use crate::models::order::OrderDocument;
use crate::models::status::OrderStatus;
use crate::session::SessionView;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/select", post(select_order).delete(clear_selection))
        .route("/session/delivery", post(begin_delivery).delete(cancel_delivery))
        .route("/session/delivery/confirm", post(confirm_delivery))
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.read().await.view(&state.vocabulary))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub order_id: String,
}

async fn select_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.write().await;
    session.select(&payload.order_id)?;
    Ok(Json(session.view(&state.vocabulary)))
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let mut session = state.session.write().await;
    session.clear_selection();
    Json(session.view(&state.vocabulary))
}

async fn begin_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.write().await;
    session.begin_delivery(&payload.order_id)?;
    Ok(Json(session.view(&state.vocabulary)))
}

async fn cancel_delivery(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let mut session = state.session.write().await;
    session.cancel_delivery();
    Json(session.view(&state.vocabulary))
}

/// Applies the pending delivery through the store. A failed write leaves the
/// confirmation open and the order unchanged; nothing is committed locally
/// ahead of the store's acknowledgement.
async fn confirm_delivery(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrderDocument>, AppError> {
    let pending = state
        .session
        .read()
        .await
        .pending_delivery_order_id()
        .ok_or_else(|| AppError::BadRequest("no delivery awaiting confirmation".to_string()))?;

    let result = apply_status_transition(
        state.store.as_ref(),
        &state.transitions_in_flight,
        &state.transition_policy,
        &pending,
        OrderStatus::Delivered,
    )
    .await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .status_transitions_total
        .with_label_values(&[outcome])
        .inc();

    let order = result?;
    state.session.write().await.finish_delivery(&pending);

    Ok(Json(order.to_document(&state.vocabulary)))
}
