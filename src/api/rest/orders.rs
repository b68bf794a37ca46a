use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use serde::Deserialize;

use crate::engine::projection::filter_by_status;
use crate::engine::transition::apply_status_transition;
use crate::error::AppError;
use crate::models::order::{NewOrder, OrderDocument, OrderItem};
use crate::models::position::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", post(update_order_status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderItem>,
    pub latitude: f64,
    pub longitude: f64,
    pub total: f64,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderDocument>, AppError> {
    let draft = NewOrder {
        customer_id: payload.customer_id,
        customer_name: payload.customer_name,
        customer_phone: payload.customer_phone,
        delivery_address: payload.delivery_address,
        items: payload.items,
        position: GeoPoint {
            lat: payload.latitude,
            lng: payload.longitude,
        },
        total: payload.total,
    };

    draft.validate()?;

    let order = state.store.insert(draft).await?;
    Ok(Json(order.to_document(&state.vocabulary)))
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderDocument>>, AppError> {
    let filter = match params.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            state
                .vocabulary
                .parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status: {raw}")))?,
        ),
    };

    let orders = state.store.list().await?;
    let documents = filter_by_status(&orders, filter)
        .iter()
        .map(|order| order.to_document(&state.vocabulary))
        .collect();

    Ok(Json(documents))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDocument>, AppError> {
    let order = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order.to_document(&state.vocabulary)))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDocument>, AppError> {
    let next = state
        .vocabulary
        .parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", payload.status)))?;

    let result = apply_status_transition(
        state.store.as_ref(),
        &state.transitions_in_flight,
        &state.transition_policy,
        &id,
        next,
    )
    .await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .status_transitions_total
        .with_label_values(&[outcome])
        .inc();

    let order = result?;
    Ok(Json(order.to_document(&state.vocabulary)))
}
