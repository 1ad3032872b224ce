//! Request handlers.
//!
//! This module routes a decoded [`RoomRequest`] to the room it concerns,
//! runs the domain operation and reports what the caller should push out.

use fateline_content::application::query_handlers::list_characters;
use fateline_content::domain::catalog::CharacterCatalog;
use fateline_core::clock::Clock;
use fateline_core::error::DomainError;
use fateline_core::rng::DeterministicRng;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::application::registry::RoomRegistry;
use crate::domain::commands::RoomRequest;
use crate::domain::player::{Player, PlayerId};
use crate::domain::room::{ChatMessage, Room, RoomId};

/// Collaborators a handler needs besides the registry.
pub struct HandlerContext<'a> {
    pub clock: &'a dyn Clock,
    pub rng: &'a mut dyn DeterministicRng,
    pub catalog: &'a dyn CharacterCatalog,
}

/// What the caller should publish after a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// The room changed; re-project it.
    Room(RoomId),
    /// A chat line to fan out to the room.
    Chat { room_id: RoomId, message: ChatMessage },
    /// Send the room's chat history to the requester.
    History { room_id: RoomId },
}

/// Result of a successfully handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Extra fields merged into the `{ok: true}` acknowledgement.
    pub reply: Value,
    pub effect: Effect,
}

impl Outcome {
    fn changed(room_id: RoomId) -> Self {
        Self {
            reply: json!({}),
            effect: Effect::Room(room_id),
        }
    }

    fn with(mut self, reply: Value) -> Self {
        self.reply = reply;
        self
    }

    fn read(reply: Value) -> Self {
        Self {
            reply,
            effect: Effect::None,
        }
    }
}

/// Handles one request from `actor`.
///
/// # Errors
///
/// Returns the `DomainError` of the first failed precondition. Nothing is
/// changed when an error is returned.
pub fn handle(
    registry: &mut RoomRegistry,
    actor: PlayerId,
    request: RoomRequest,
    ctx: &mut HandlerContext<'_>,
) -> Result<Outcome, DomainError> {
    match request {
        RoomRequest::CreateRoom { name } => {
            if registry.room_of(actor).is_some() {
                return Err(DomainError::AlreadyInRoom);
            }
            let player = Player::new(actor, &name)?;
            let room_id = Uuid::new_v4();
            registry.create(room_id, player)?;
            Ok(Outcome::changed(room_id).with(json!({ "roomId": room_id, "playerId": actor })))
        }
        RoomRequest::JoinRoom { room_id, name } => {
            if registry.room_of(actor).is_some() {
                return Err(DomainError::AlreadyInRoom);
            }
            let player = Player::new(actor, &name)?;
            registry.get_mut(room_id)?.join(player)?;
            registry.bind(actor, room_id);
            Ok(Outcome::changed(room_id).with(json!({ "roomId": room_id, "playerId": actor })))
        }
        RoomRequest::LeaveRoom {} => {
            let room_id = registry.room_of(actor).ok_or(DomainError::NotInRoom)?;
            let departure = registry.get_mut(room_id)?.leave(actor)?;
            registry.unbind(actor);
            if departure.emptied {
                registry.remove_if_empty(room_id);
            } else if let Some(owner_id) = departure.new_owner {
                info!(room_id = %room_id, owner_id = %owner_id, "room ownership passed");
            }
            Ok(Outcome::changed(room_id))
        }
        RoomRequest::GetCharacters {} => {
            Ok(Outcome::read(json!({ "characters": list_characters(ctx.catalog) })))
        }
        request => {
            let room_id = registry.room_of(actor).ok_or(DomainError::NotInRoom)?;
            let room = registry.get_mut(room_id)?;
            handle_in_room(room, actor, request, ctx)
        }
    }
}

#[allow(clippy::too_many_lines)]
fn handle_in_room(
    room: &mut Room,
    actor: PlayerId,
    request: RoomRequest,
    ctx: &mut HandlerContext<'_>,
) -> Result<Outcome, DomainError> {
    let room_id = room.id;
    let clock = ctx.clock;
    let done = || Outcome::changed(room_id);

    match request {
        RoomRequest::ChooseCharacter { character_id } => {
            room.choose_character(actor, &character_id, ctx.catalog)?;
            Ok(done())
        }
        RoomRequest::SetReady { ready } => {
            room.set_ready(actor, ready)?;
            Ok(done())
        }
        RoomRequest::StartGame {} => {
            room.start(actor, ctx.catalog, ctx.rng)?;
            Ok(done())
        }
        RoomRequest::EndTurn {} => {
            let advance = room.end_turn(actor, clock)?;
            Ok(done().with(json!({
                "wrapped": advance.wrapped,
                "activePlayerId": room.meta.active_player_id,
            })))
        }
        RoomRequest::Draw { count } => {
            let drawn = room.draw(actor, count.unwrap_or(1), ctx.rng, clock)?;
            Ok(done().with(json!({ "drawn": drawn })))
        }
        RoomRequest::PlayToLocation {
            card_id,
            location_index,
        } => {
            room.play_to_location(actor, card_id, location_index, clock)?;
            Ok(done())
        }
        RoomRequest::Discard { card_id, card_ids } => {
            let ids = RoomRequest::discard_ids(card_id, card_ids)?;
            room.discard(actor, &ids, clock)?;
            Ok(done())
        }
        RoomRequest::MoveCard { card_id, from, to } => {
            room.move_card(actor, card_id, from, to, clock)?;
            Ok(done())
        }
        RoomRequest::RemoveCard {
            card_id,
            from,
            target_id,
        } => {
            let row = room.remove_card(actor, target_id, card_id, from, clock)?;
            Ok(done().with(json!({ "row": row })))
        }
        RoomRequest::ReshuffleDeck {} => {
            let moved = room.reshuffle_deck(actor, ctx.rng, clock)?;
            Ok(done().with(json!({ "moved": moved })))
        }
        RoomRequest::ClaimWin {} => {
            room.claim_win(actor, clock)?;
            Ok(done())
        }
        RoomRequest::PlayEffect { card_id } => {
            room.play_effect(actor, card_id, clock)?;
            Ok(done())
        }
        RoomRequest::SpawnToken {
            token_id,
            location_index,
        } => {
            let card = room.spawn_token(actor, &token_id, location_index, ctx.catalog, clock)?;
            Ok(done().with(json!({ "cardId": card.id })))
        }
        RoomRequest::UndoSelf {} => {
            let undone_id = room.undo_self(actor, clock)?;
            Ok(done().with(json!({ "undoneId": undone_id })))
        }
        RoomRequest::ChangePower { delta } => {
            let power = room.change_power(actor, delta, clock)?;
            Ok(done().with(json!({ "power": power })))
        }
        RoomRequest::ChangeTrust { delta } => {
            let trust = room.change_trust(actor, delta, clock)?;
            Ok(done().with(json!({ "trust": trust })))
        }
        RoomRequest::SetPawn { to } => {
            room.set_pawn(actor, to, clock)?;
            Ok(done())
        }
        RoomRequest::ToggleLocationLock {
            index,
            locked,
            target_id,
        } => {
            let locked = room.toggle_location_lock(actor, target_id, index, locked, clock)?;
            Ok(done().with(json!({ "locked": locked })))
        }
        RoomRequest::ToggleCardLock { card_id, locked } => {
            let locked = room.toggle_card_lock(actor, card_id, locked, clock)?;
            Ok(done().with(json!({ "locked": locked })))
        }
        RoomRequest::DeltaStrength { card_id, delta } => {
            let modifier = room.delta_strength(actor, card_id, delta, clock)?;
            Ok(done().with(json!({ "strengthModifier": modifier })))
        }
        RoomRequest::SetHandVisible { visible } => {
            room.set_hand_visible(actor, visible, clock)?;
            Ok(done())
        }
        RoomRequest::FateStart { target_id } => {
            let session = room.fate_start(actor, target_id, ctx.rng, clock)?;
            Ok(done().with(json!({ "session": session })))
        }
        RoomRequest::FateCancel {} => {
            room.fate_cancel(actor, clock)?;
            Ok(done())
        }
        RoomRequest::FateChoose { card_id } => {
            let session = room.fate_choose(actor, card_id, clock)?;
            Ok(done().with(json!({ "session": session })))
        }
        RoomRequest::FatePlaceSelected { location_index } => {
            room.fate_place_selected(actor, location_index, clock)?;
            Ok(done())
        }
        RoomRequest::FateDiscardSelected {} => {
            room.fate_discard_selected(actor, clock)?;
            Ok(done())
        }
        RoomRequest::FateDiscardBoth {} => {
            room.fate_discard_both(actor, clock)?;
            Ok(done())
        }
        RoomRequest::FateStartFromDiscard { target_id, card_id } => {
            let session = room.fate_start_from_discard(actor, target_id, card_id, clock)?;
            Ok(done().with(json!({ "session": session })))
        }
        RoomRequest::FateGetDiscard { target_id } => {
            let cards = room.fate_discard_pile(actor, target_id.unwrap_or(actor))?;
            Ok(Outcome::read(json!({ "cards": cards })))
        }
        RoomRequest::FateReshuffle { target_id } => {
            let moved = room.fate_reshuffle(actor, target_id.unwrap_or(actor), ctx.rng, clock)?;
            Ok(done().with(json!({ "moved": moved })))
        }
        RoomRequest::FateReturnFromDiscard { target_id, card_id } => {
            room.fate_return_from_discard(actor, target_id, card_id, clock)?;
            Ok(done())
        }
        RoomRequest::PeekStart { target_id, count } => {
            let session = room.peek_start(actor, target_id, count, clock)?;
            Ok(done().with(json!({ "session": session })))
        }
        RoomRequest::PeekConfirm { order_ids } => {
            room.peek_confirm(actor, &order_ids, clock)?;
            Ok(done())
        }
        RoomRequest::PeekCancel {} => {
            room.peek_cancel(actor, clock)?;
            Ok(done())
        }
        RoomRequest::SiftStart { target_id } => {
            let session = room.sift_start(actor, target_id.unwrap_or(actor), clock)?;
            Ok(done().with(json!({ "session": session })))
        }
        RoomRequest::SiftChoose { discard_id } => {
            room.sift_choose(actor, discard_id, clock)?;
            Ok(done())
        }
        RoomRequest::SiftCancel {} => {
            room.sift_cancel(actor, clock)?;
            Ok(done())
        }
        RoomRequest::GetDiscard { target_id } => {
            let cards = room.discard_pile(actor, target_id.unwrap_or(actor))?;
            Ok(Outcome::read(json!({ "cards": cards })))
        }
        RoomRequest::TakeFromDiscard { card_id } => {
            room.take_from_discard(actor, card_id, clock)?;
            Ok(done())
        }
        RoomRequest::SendChat { text } => {
            let message = room.post_chat(actor, &text, clock)?;
            Ok(Outcome {
                reply: json!({}),
                effect: Effect::Chat { room_id, message },
            })
        }
        RoomRequest::ChatHistory {} => {
            if room.seat(actor).is_none() {
                return Err(DomainError::NotInRoom);
            }
            Ok(Outcome {
                reply: json!({}),
                effect: Effect::History { room_id },
            })
        }
        RoomRequest::CreateRoom { .. }
        | RoomRequest::JoinRoom { .. }
        | RoomRequest::LeaveRoom {}
        | RoomRequest::GetCharacters {} => Err(DomainError::Infrastructure(
            "registry request routed to a room".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use fateline_test_support::{FixedClock, MockRng, test_catalog};

    use super::*;

    fn run(
        registry: &mut RoomRegistry,
        actor: PlayerId,
        request: RoomRequest,
    ) -> Result<Outcome, DomainError> {
        let catalog = test_catalog();
        let clock = FixedClock::default();
        let mut rng = MockRng;
        let mut ctx = HandlerContext {
            clock: &clock,
            rng: &mut rng,
            catalog: &catalog,
        };
        handle(registry, actor, request, &mut ctx)
    }

    fn created(registry: &mut RoomRegistry, actor: PlayerId) -> RoomId {
        let outcome = run(
            registry,
            actor,
            RoomRequest::CreateRoom {
                name: "Ada".to_owned(),
            },
        )
        .unwrap();
        serde_json::from_value(outcome.reply["roomId"].clone()).unwrap()
    }

    #[test]
    fn test_create_replies_with_ids() {
        // Arrange
        let mut registry = RoomRegistry::new();
        let actor = Uuid::new_v4();

        // Act
        let room_id = created(&mut registry, actor);

        // Assert
        assert_eq!(registry.room_of(actor), Some(room_id));
        assert!(matches!(
            run(
                &mut registry,
                actor,
                RoomRequest::CreateRoom {
                    name: "Ada".to_owned()
                }
            ),
            Err(DomainError::AlreadyInRoom)
        ));
    }

    #[test]
    fn test_join_unknown_room_fails() {
        let mut registry = RoomRegistry::new();
        let room_id = Uuid::new_v4();

        let result = run(
            &mut registry,
            Uuid::new_v4(),
            RoomRequest::JoinRoom {
                room_id,
                name: "Bo".to_owned(),
            },
        );

        assert_eq!(result, Err(DomainError::RoomNotFound(room_id)));
    }

    #[test]
    fn test_room_requests_need_membership() {
        let mut registry = RoomRegistry::new();

        let result = run(&mut registry, Uuid::new_v4(), RoomRequest::EndTurn {});

        assert_eq!(result, Err(DomainError::NotInRoom));
    }

    #[test]
    fn test_last_leave_closes_room() {
        let mut registry = RoomRegistry::new();
        let actor = Uuid::new_v4();
        let room_id = created(&mut registry, actor);

        let outcome = run(&mut registry, actor, RoomRequest::LeaveRoom {}).unwrap();

        assert_eq!(outcome.effect, Effect::Room(room_id));
        assert!(registry.is_empty());
        assert_eq!(registry.room_of(actor), None);
    }

    #[test]
    fn test_owner_leaving_hands_room_to_next_seat() {
        // Arrange
        let mut registry = RoomRegistry::new();
        let (owner, guest) = (Uuid::new_v4(), Uuid::new_v4());
        let room_id = created(&mut registry, owner);
        run(
            &mut registry,
            guest,
            RoomRequest::JoinRoom {
                room_id,
                name: "Bo".to_owned(),
            },
        )
        .unwrap();

        // Act
        run(&mut registry, owner, RoomRequest::LeaveRoom {}).unwrap();

        // Assert
        let room = registry.get(room_id).unwrap();
        assert_eq!(room.owner_id, guest);
        assert_eq!(registry.room_of(owner), None);
        assert_eq!(registry.room_of(guest), Some(room_id));
    }

    #[test]
    fn test_characters_are_readable_outside_rooms() {
        let mut registry = RoomRegistry::new();

        let outcome = run(&mut registry, Uuid::new_v4(), RoomRequest::GetCharacters {}).unwrap();

        assert_eq!(outcome.effect, Effect::None);
        assert_eq!(outcome.reply["characters"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_chat_send_yields_chat_effect() {
        let mut registry = RoomRegistry::new();
        let actor = Uuid::new_v4();
        let room_id = created(&mut registry, actor);

        let outcome = run(
            &mut registry,
            actor,
            RoomRequest::SendChat {
                text: "hi".to_owned(),
            },
        )
        .unwrap();

        assert!(matches!(
            outcome.effect,
            Effect::Chat { room_id: id, ref message } if id == room_id && message.text == "hi"
        ));
    }
}
