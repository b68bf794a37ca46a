use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::engine::ranking::rank;
use crate::error::AppError;
use crate::location::{AcquireOptions, PositionSource, acquire_position};
use crate::models::order::Order;
use crate::models::position::GeoPoint;
use crate::models::ranked::{RankedOrder, RankedOrderView};
use crate::models::status::StatusVocabulary;
use crate::route::{RouteHandle, RouteRenderer};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    Initializing,
    LocationUnavailable,
    Ready(GeoPoint),
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Initializing => "initializing",
            SessionPhase::LocationUnavailable => "location-unavailable",
            SessionPhase::Ready(_) => "ready",
        }
    }

    pub fn position(&self) -> Option<GeoPoint> {
        match self {
            SessionPhase::Ready(position) => Some(*position),
            _ => None,
        }
    }
}

/// All client-visible driver state: the session phase, the latest order
/// snapshot with its ranked view, the map selection, and the confirm-delivery
/// dialog. Held behind one lock; views are serialized projections.
pub struct DriverSession {
    phase: SessionPhase,
    orders: Vec<Order>,
    ranked: Vec<RankedOrder>,
    selected: Option<String>,
    pending_delivery: Option<String>,
    renderer: Arc<dyn RouteRenderer>,
    active_route: Option<RouteHandle>,
}

impl DriverSession {
    pub fn new(renderer: Arc<dyn RouteRenderer>) -> Self {
        Self {
            phase: SessionPhase::Initializing,
            orders: Vec::new(),
            ranked: Vec::new(),
            selected: None,
            pending_delivery: None,
            renderer,
            active_route: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn ranked(&self) -> &[RankedOrder] {
        &self.ranked
    }

    pub fn selected_order_id(&self) -> Option<String> {
        self.selected.clone()
    }

    pub fn pending_delivery_order_id(&self) -> Option<String> {
        self.pending_delivery.clone()
    }

    pub fn apply_position(&mut self, position: GeoPoint) {
        self.phase = SessionPhase::Ready(position);
        self.rerank();
        self.refresh_route();
    }

    pub fn position_failed(&mut self) {
        if self.phase == SessionPhase::Initializing {
            self.phase = SessionPhase::LocationUnavailable;
        }
    }

    /// Applies one full snapshot from the store subscription: re-ranks
    /// against the latest position and drops selection or confirmation state
    /// that no longer refers to a live order.
    pub fn apply_snapshot(&mut self, orders: Vec<Order>) {
        self.orders = orders;

        if let Some(selected) = self.selected.as_deref()
            && !self.orders.iter().any(|o| o.id == selected)
        {
            self.selected = None;
        }

        if let Some(pending) = self.pending_delivery.as_deref()
            && !self
                .orders
                .iter()
                .any(|o| o.id == pending && !o.status.is_terminal())
        {
            self.pending_delivery = None;
        }

        self.rerank();
        self.refresh_route();
    }

    pub fn select(&mut self, id: &str) -> Result<(), AppError> {
        if !self.orders.iter().any(|o| o.id == id) {
            return Err(AppError::InvalidSelection(format!(
                "order {id} is not in the current order set"
            )));
        }

        self.selected = Some(id.to_string());
        self.refresh_route();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.refresh_route();
    }

    pub fn begin_delivery(&mut self, id: &str) -> Result<(), AppError> {
        let order = self
            .orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| {
                AppError::InvalidSelection(format!("order {id} is not in the current order set"))
            })?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "order {id} is already delivered"
            )));
        }

        self.pending_delivery = Some(id.to_string());
        Ok(())
    }

    pub fn finish_delivery(&mut self, id: &str) {
        if self.pending_delivery.as_deref() == Some(id) {
            self.pending_delivery = None;
        }
    }

    pub fn cancel_delivery(&mut self) {
        self.pending_delivery = None;
    }

    pub fn view(&self, vocabulary: &StatusVocabulary) -> SessionView {
        SessionView {
            phase: self.phase.label(),
            position: self.phase.position(),
            orders: self.ranked.iter().map(|r| r.to_view(vocabulary)).collect(),
            selected_order_id: self.selected.clone(),
            pending_delivery_order_id: self.pending_delivery.clone(),
        }
    }

    fn rerank(&mut self) {
        match self.phase {
            SessionPhase::Ready(position) => self.ranked = rank(&position, &self.orders),
            _ => self.ranked.clear(),
        }
    }

    /// Tears down the previously drawn route before requesting a new one, so
    /// at most one route rendering is active per session.
    fn refresh_route(&mut self) {
        if let Some(handle) = self.active_route.take() {
            self.renderer.clear(handle);
        }

        let SessionPhase::Ready(position) = self.phase else {
            return;
        };
        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        let Some(order) = self.orders.iter().find(|o| o.id == selected) else {
            return;
        };

        self.active_route = Some(self.renderer.draw(position, order.position));
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: &'static str,
    pub position: Option<GeoPoint>,
    pub orders: Vec<RankedOrderView>,
    pub selected_order_id: Option<String>,
    pub pending_delivery_order_id: Option<String>,
}

/// Resolves the driver position once, then applies every order snapshot from
/// the store subscription to the session. One acquisition in flight, one
/// synchronous ranking pass per snapshot.
pub async fn run_session_engine(
    state: Arc<AppState>,
    source: Arc<dyn PositionSource>,
    options: AcquireOptions,
) {
    info!("session engine started");

    match acquire_position(source.as_ref(), &options).await {
        Ok(position) => {
            state
                .metrics
                .position_requests_total
                .with_label_values(&["success"])
                .inc();
            info!(lat = position.lat, lng = position.lng, "driver position resolved");
            state.session.write().await.apply_position(position);
        }
        Err(err) => {
            state
                .metrics
                .position_requests_total
                .with_label_values(&["error"])
                .inc();
            error!(error = %err, "driver position unavailable");
            state.session.write().await.position_failed();
        }
    }

    let mut snapshot_rx = state.store.subscribe();

    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();

        {
            let start = Instant::now();
            let mut session = state.session.write().await;
            session.apply_snapshot(snapshot);

            state
                .metrics
                .orders_in_snapshot
                .set(session.orders().len() as i64);
            state.metrics.rank_passes_total.inc();
            state
                .metrics
                .rank_latency_seconds
                .observe(start.elapsed().as_secs_f64());
        }

        if snapshot_rx.changed().await.is_err() {
            let err =
                AppError::PersistenceSubscriptionFailed("orders snapshot channel closed".to_string());
            warn!(error = %err, "session engine stopped");
            break;
        }
    }
}
