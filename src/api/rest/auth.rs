use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::sign_in;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub email: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    sign_in(
        state.access_policy.as_ref(),
        state.identity.as_ref(),
        &payload.email,
        &payload.password,
    )
    .await?;

    info!(email = %payload.email, "driver signed in");
    Ok(Json(LoginResponse {
        email: payload.email,
    }))
}
