use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};

use crate::auth::{AccessPolicy, IdentityProvider};
use crate::engine::transition::TransitionPolicy;
use crate::models::status::StatusVocabulary;
use crate::observability::metrics::Metrics;
use crate::route::{BroadcastRouteRenderer, RouteCommand};
use crate::session::DriverSession;
use crate::store::OrderStore;

pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub session: RwLock<DriverSession>,
    pub route_events_tx: broadcast::Sender<RouteCommand>,
    pub transitions_in_flight: DashMap<String, ()>,
    pub vocabulary: StatusVocabulary,
    pub transition_policy: TransitionPolicy,
    pub access_policy: Arc<dyn AccessPolicy>,
    pub identity: Arc<dyn IdentityProvider>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        vocabulary: StatusVocabulary,
        transition_policy: TransitionPolicy,
        access_policy: Arc<dyn AccessPolicy>,
        identity: Arc<dyn IdentityProvider>,
        event_buffer_size: usize,
    ) -> Self {
        let (route_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let renderer = Arc::new(BroadcastRouteRenderer::new(route_events_tx.clone()));

        Self {
            store,
            session: RwLock::new(DriverSession::new(renderer)),
            route_events_tx,
            transitions_in_flight: DashMap::new(),
            vocabulary,
            transition_policy,
            access_policy,
            identity,
            metrics: Metrics::new(),
        }
    }
}
