//! The single entry point for player requests.
//!
//! The dispatcher owns the room registry and the injected collaborators.
//! It runs each request to completion, turns the result into an
//! acknowledgement, and projects every room the request changed.

use std::sync::Arc;

use fateline_content::domain::catalog::CharacterCatalog;
use fateline_core::clock::Clock;
use fateline_core::command::Command;
use fateline_core::error::{DomainError, ErrorCategory};
use fateline_core::rng::DeterministicRng;
use serde_json::{Value, json};
use tracing::{Span, debug, error, field, instrument, warn};

use crate::application::command_handlers::{Effect, HandlerContext, Outcome, handle};
use crate::application::projection::{Delivery, PublicRoom, ServerEvent, public_room, publish};
use crate::application::registry::RoomRegistry;
use crate::domain::commands::RoomRequest;
use crate::domain::player::PlayerId;
use crate::domain::room::RoomId;

/// Acknowledgement plus the events the request caused.
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    /// `{ok: true, ...}` or `{ok: false, error, message}`.
    pub response: Value,
    pub deliveries: Vec<Delivery>,
}

impl Handled {
    /// Whether the request succeeded.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.response["ok"] == Value::Bool(true)
    }
}

/// Builds the failure acknowledgement for an error.
#[must_use]
pub fn rejection(err: &DomainError) -> Value {
    json!({
        "ok": false,
        "error": err.code(),
        "message": err.to_string(),
    })
}

/// Serializes all room traffic through one owner.
pub struct Dispatcher {
    registry: RoomRegistry,
    catalog: Arc<dyn CharacterCatalog>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rooms", &self.registry.len())
            .field("catalog", &self.catalog.version_hash())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with no rooms.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CharacterCatalog>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            registry: RoomRegistry::new(),
            catalog,
            clock,
            rng,
        }
    }

    /// The catalog rooms deal from.
    #[must_use]
    pub fn catalog(&self) -> &dyn CharacterCatalog {
        self.catalog.as_ref()
    }

    /// The room a player sits in.
    #[must_use]
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.registry.room_of(player_id)
    }

    /// Number of live rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// The public snapshot of a room.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoomNotFound` if no such room exists.
    pub fn public_snapshot(&self, room_id: RoomId) -> Result<PublicRoom, DomainError> {
        self.registry.get(room_id).map(public_room)
    }

    /// Decodes and handles a raw `{event, data}` request.
    pub fn handle_frame(&mut self, actor: PlayerId, event: &str, data: Value) -> Handled {
        match RoomRequest::from_parts(event, data) {
            Ok(request) => self.handle(actor, request),
            Err(err) => {
                warn!(player_id = %actor, event, error = %err, "malformed request");
                Handled {
                    response: rejection(&err),
                    deliveries: Vec::new(),
                }
            }
        }
    }

    /// Handles one request from `actor`.
    #[instrument(
        skip(self, request),
        fields(command = request.command_type(), player_id = %actor, room_id = field::Empty)
    )]
    pub fn handle(&mut self, actor: PlayerId, request: RoomRequest) -> Handled {
        if let Some(room_id) = self.registry.room_of(actor) {
            Span::current().record("room_id", field::display(room_id));
        }
        let mutating = request.is_mutating();
        let mut ctx = HandlerContext {
            clock: self.clock.as_ref(),
            rng: self.rng.as_mut(),
            catalog: self.catalog.as_ref(),
        };
        match handle(&mut self.registry, actor, request, &mut ctx) {
            Ok(Outcome { reply, effect }) => {
                let mut response = json!({ "ok": true });
                if let (Some(target), Value::Object(extra)) = (response.as_object_mut(), reply) {
                    target.extend(extra);
                }
                let deliveries = self.deliveries(actor, &effect);
                debug!(mutating, deliveries = deliveries.len(), "request handled");
                Handled {
                    response,
                    deliveries,
                }
            }
            Err(err) => {
                if err.category() == ErrorCategory::Internal {
                    error!(error = %err, "request failed");
                } else {
                    warn!(code = err.code(), "request rejected");
                }
                Handled {
                    response: rejection(&err),
                    deliveries: Vec::new(),
                }
            }
        }
    }

    /// Treats a closed connection as leaving the room.
    pub fn disconnect(&mut self, actor: PlayerId) -> Vec<Delivery> {
        if self.registry.room_of(actor).is_none() {
            return Vec::new();
        }
        debug!(player_id = %actor, "connection closed; leaving room");
        self.handle(actor, RoomRequest::LeaveRoom {}).deliveries
    }

    fn deliveries(&self, actor: PlayerId, effect: &Effect) -> Vec<Delivery> {
        match effect {
            Effect::None => Vec::new(),
            Effect::Room(room_id) => self.registry.get(*room_id).map(publish).unwrap_or_default(),
            Effect::Chat { room_id, message } => self
                .registry
                .get(*room_id)
                .map(|room| {
                    room.players
                        .iter()
                        .map(|p| Delivery {
                            recipient: p.id,
                            event: ServerEvent::Chat(message.clone()),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Effect::History { room_id } => self
                .registry
                .get(*room_id)
                .map(|room| {
                    vec![Delivery {
                        recipient: actor,
                        event: ServerEvent::ChatHistory(room.chat.iter().cloned().collect()),
                    }]
                })
                .unwrap_or_default(),
        }
    }
}
