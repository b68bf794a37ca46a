use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};

use crate::models::order::OrderDocument;
use crate::route::RouteCommand;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum WsEvent {
    Orders { orders: Vec<OrderDocument> },
    Route { command: RouteCommand },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Feeds the browser map: every order snapshot from the store subscription
/// plus route draw/clear commands. The subscription is released when the
/// client disconnects.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut route_rx = state.route_events_tx.subscribe();
    let mut snapshots = WatchStream::new(state.store.subscribe());
    let vocabulary = state.vocabulary;

    info!("websocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                snapshot = snapshots.next() => match snapshot {
                    Some(orders) => WsEvent::Orders {
                        orders: orders
                            .iter()
                            .map(|order| order.to_document(&vocabulary))
                            .collect(),
                    },
                    None => break,
                },
                command = route_rx.recv() => match command {
                    Ok(command) => WsEvent::Route { command },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "websocket client lagging behind route events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize ws event");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("websocket client disconnected");
}
