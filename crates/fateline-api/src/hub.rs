//! Live WebSocket connections keyed by player id.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::ws::Message;
use fateline_core::error::DomainError;
use fateline_table::application::projection::Delivery;
use fateline_table::domain::player::PlayerId;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Routes outbound frames to each connection's writer task.
#[derive(Debug, Default)]
pub struct Hub {
    connections: Mutex<HashMap<PlayerId, UnboundedSender<Message>>>,
}

impl Hub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a connection's outbound queue.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the connection table is poisoned.
    pub fn register(
        &self,
        player_id: PlayerId,
        sender: UnboundedSender<Message>,
    ) -> Result<(), DomainError> {
        self.connections()?.insert(player_id, sender);
        Ok(())
    }

    /// Detaches a connection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the connection table is poisoned.
    pub fn unregister(&self, player_id: PlayerId) -> Result<(), DomainError> {
        self.connections()?.remove(&player_id);
        Ok(())
    }

    /// Number of attached connections.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the connection table is poisoned.
    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.connections()?.len())
    }

    /// Serializes and queues every delivery for its recipient.
    ///
    /// Recipients without a live connection are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the connection table is
    /// poisoned or an event fails to serialize.
    pub fn deliver(&self, deliveries: Vec<Delivery>) -> Result<(), DomainError> {
        let connections = self.connections()?;
        for Delivery { recipient, event } in deliveries {
            let Some(sender) = connections.get(&recipient) else {
                debug!(player_id = %recipient, "no connection for delivery");
                continue;
            };
            let frame = text_frame(&event)?;
            if sender.send(frame).is_err() {
                warn!(player_id = %recipient, "connection writer is gone");
            }
        }
        Ok(())
    }

    fn connections(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<PlayerId, UnboundedSender<Message>>>, DomainError>
    {
        self.connections
            .lock()
            .map_err(|_| DomainError::Infrastructure("connection table lock poisoned".into()))
    }
}

/// Encodes a value as a text frame.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the value fails to serialize.
pub fn text_frame<T: Serialize>(value: &T) -> Result<Message, DomainError> {
    let payload = serde_json::to_string(value)
        .map_err(|e| DomainError::Infrastructure(format!("failed to encode frame: {e}")))?;
    Ok(Message::Text(payload.into()))
}

#[cfg(test)]
mod tests {
    use fateline_table::application::projection::ServerEvent;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_deliver_routes_by_recipient() {
        // Arrange
        let hub = Hub::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.register(a, tx_a).unwrap();
        hub.register(b, tx_b).unwrap();

        // Act
        hub.deliver(vec![Delivery {
            recipient: b,
            event: ServerEvent::Log(Vec::new()),
        }])
        .unwrap();

        // Assert
        assert!(rx_a.try_recv().is_err());
        let Ok(Message::Text(text)) = rx_b.try_recv() else {
            panic!("expected a text frame for b");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["event"], "log:update");
        assert_eq!(value["data"], serde_json::json!([]));
    }

    #[test]
    fn test_unknown_recipient_is_skipped() {
        let hub = Hub::new();

        let result = hub.deliver(vec![Delivery {
            recipient: Uuid::new_v4(),
            event: ServerEvent::ChatHistory(Vec::new()),
        }]);

        assert!(result.is_ok());
    }

    #[test]
    fn test_unregister_detaches() {
        let hub = Hub::new();
        let player = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();
        hub.register(player, tx).unwrap();

        hub.unregister(player).unwrap();

        assert_eq!(hub.len().unwrap(), 0);
    }
}
