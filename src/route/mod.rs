use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::position::GeoPoint;

pub type RouteHandle = u64;

/// External collaborator that draws a path between two points. Opaque to the
/// core; the only obligations are draw and teardown.
pub trait RouteRenderer: Send + Sync {
    fn draw(&self, from: GeoPoint, to: GeoPoint) -> RouteHandle;

    fn clear(&self, handle: RouteHandle);
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RouteCommand {
    Draw {
        route_id: RouteHandle,
        from: GeoPoint,
        to: GeoPoint,
    },
    Clear {
        route_id: RouteHandle,
    },
}

/// Renderer that forwards draw/clear commands to websocket subscribers; the
/// browser map executes them. Commands sent with no subscriber are dropped.
pub struct BroadcastRouteRenderer {
    next_id: AtomicU64,
    events_tx: broadcast::Sender<RouteCommand>,
}

impl BroadcastRouteRenderer {
    pub fn new(events_tx: broadcast::Sender<RouteCommand>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            events_tx,
        }
    }
}

impl RouteRenderer for BroadcastRouteRenderer {
    fn draw(&self, from: GeoPoint, to: GeoPoint) -> RouteHandle {
        let route_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.events_tx.send(RouteCommand::Draw { route_id, from, to });
        route_id
    }

    fn clear(&self, handle: RouteHandle) {
        let _ = self.events_tx.send(RouteCommand::Clear { route_id: handle });
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::{BroadcastRouteRenderer, RouteCommand, RouteRenderer};
    use crate::models::position::GeoPoint;

    #[test]
    fn draw_then_clear_emits_matching_route_ids() {
        let (tx, mut rx) = broadcast::channel(8);
        let renderer = BroadcastRouteRenderer::new(tx);

        let from = GeoPoint {
            lat: 13.0827,
            lng: 80.2707,
        };
        let to = GeoPoint {
            lat: 13.13308,
            lng: 80.17414,
        };

        let handle = renderer.draw(from, to);
        renderer.clear(handle);

        match rx.try_recv().unwrap() {
            RouteCommand::Draw { route_id, .. } => assert_eq!(route_id, handle),
            other => panic!("expected draw, got {other:?}"),
        }
        match rx.try_recv().unwrap() {
            RouteCommand::Clear { route_id } => assert_eq!(route_id, handle),
            other => panic!("expected clear, got {other:?}"),
        }
    }

    #[test]
    fn handles_are_unique_per_draw() {
        let (tx, _rx) = broadcast::channel(8);
        let renderer = BroadcastRouteRenderer::new(tx);

        let p = GeoPoint { lat: 0.0, lng: 0.0 };
        assert_ne!(renderer.draw(p, p), renderer.draw(p, p));
    }
}
