//! WebSocket transport.
//!
//! Every connection is a player. Inbound frames are `{event, data, ack?}`
//! requests; a frame carrying an `ack` id is answered with
//! `{event: "ack", ack, data: <response>}`. Room projections and chat are
//! pushed to each seat as they happen. Closing the socket leaves the room.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use fateline_core::error::DomainError;
use fateline_table::application::dispatcher::rejection;
use fateline_table::domain::player::PlayerId;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::hub::text_frame;
use crate::state::AppState;

/// A client request.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    event: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    ack: Option<u64>,
}

/// The reply to a request that carried an ack id.
#[derive(Debug, Serialize)]
struct AckFrame {
    event: &'static str,
    ack: u64,
    data: Value,
}

impl AckFrame {
    fn new(ack: u64, data: Value) -> Self {
        Self {
            event: "ack",
            ack,
            data,
        }
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id: PlayerId = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    if let Err(err) = state.hub.register(player_id, tx.clone()) {
        error!(player_id = %player_id, error = %err, "failed to attach connection");
        return;
    }
    info!(player_id = %player_id, "connection opened");

    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => handle_text(&state, player_id, text.as_str(), &tx),
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Err(err) = disconnect(&state, player_id) {
        error!(player_id = %player_id, error = %err, "failed to leave room on close");
    }
    write_task.abort();
    info!(player_id = %player_id, "connection closed");
}

fn handle_text(state: &AppState, player_id: PlayerId, text: &str, tx: &UnboundedSender<Message>) {
    let frame = match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(player_id = %player_id, error = %err, "malformed frame");
            if let Some(ack) = salvage_ack(text) {
                let refusal = DomainError::Validation(format!("malformed frame: {err}"));
                reply(tx, ack, rejection(&refusal));
            }
            return;
        }
    };

    let ack = frame.ack;
    if let Err(err) = dispatch(state, player_id, frame, tx) {
        error!(player_id = %player_id, error = %err, "request could not be dispatched");
        if let Some(ack) = ack {
            reply(tx, ack, rejection(&err));
        }
    }
}

/// Runs a request and fans out its events while still holding the
/// dispatcher, so every seat sees updates in the order they were applied.
fn dispatch(
    state: &AppState,
    player_id: PlayerId,
    frame: InboundFrame,
    tx: &UnboundedSender<Message>,
) -> Result<(), DomainError> {
    let mut dispatcher = state.dispatcher()?;
    let handled = dispatcher.handle_frame(player_id, &frame.event, frame.data);
    if let Some(ack) = frame.ack {
        reply(tx, ack, handled.response);
    }
    state.hub.deliver(handled.deliveries)
}

fn disconnect(state: &AppState, player_id: PlayerId) -> Result<(), DomainError> {
    let result = state.dispatcher().and_then(|mut dispatcher| {
        let deliveries = dispatcher.disconnect(player_id);
        state.hub.deliver(deliveries)
    });
    state.hub.unregister(player_id)?;
    result
}

fn reply(tx: &UnboundedSender<Message>, ack: u64, data: Value) {
    match text_frame(&AckFrame::new(ack, data)) {
        Ok(message) => {
            // The writer only stops once the socket is gone.
            let _ = tx.send(message);
        }
        Err(err) => error!(ack, error = %err, "failed to encode ack"),
    }
}

/// Recovers the ack id from a frame that is JSON but not a valid request.
fn salvage_ack(text: &str) -> Option<u64> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("ack")?
        .as_u64()
}

/// Returns the WebSocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_defaults_to_null() {
        let frame: InboundFrame = serde_json::from_str(r#"{"event":"game:endTurn","ack":3}"#).unwrap();

        assert_eq!(frame.event, "game:endTurn");
        assert_eq!(frame.data, Value::Null);
        assert_eq!(frame.ack, Some(3));
    }

    #[test]
    fn test_salvage_ack_from_invalid_request() {
        assert_eq!(salvage_ack(r#"{"data":{},"ack":7}"#), Some(7));
        assert_eq!(salvage_ack("not json"), None);
        assert_eq!(salvage_ack(r#"{"event":1}"#), None);
    }

    #[test]
    fn test_ack_frame_shape() {
        let value = serde_json::to_value(AckFrame::new(9, serde_json::json!({ "ok": true }))).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "event": "ack", "ack": 9, "data": { "ok": true } })
        );
    }
}
