//! Game moves on a running room.
//!
//! Each move validates every precondition before touching state, then
//! applies its effect and appends one action-log entry.

use fateline_content::domain::catalog::CharacterCatalog;
use fateline_content::domain::templates::HandVisibility;
use fateline_core::clock::Clock;
use fateline_core::error::DomainError;
use fateline_core::rng::DeterministicRng;

use super::actions::{ActionKind, HandCard};
use super::board::Row;
use super::cards::{Card, CardId, Face, MAX_STRENGTH_MODIFIER, STRENGTH_STEP_LIMIT, position};
use super::player::{MAX_POWER, MAX_TRUST, PlayerId, step_counter};
use super::room::Room;

/// Most cards a single draw request may take.
pub const MAX_DRAW: usize = 10;

impl Room {
    /// Draws up to `count` cards into the requester's hand.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a count outside `1..=10`, or `DeckEmpty` when
    /// both the deck and the discard are empty.
    pub fn draw(
        &mut self,
        actor: PlayerId,
        count: usize,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<Vec<CardId>, DomainError> {
        self.require_playing(actor)?;
        if !(1..=MAX_DRAW).contains(&count) {
            return Err(DomainError::Validation(format!(
                "draw count must be 1 to {MAX_DRAW}"
            )));
        }
        let zones = &mut self.actor_mut(actor)?.zones;
        if zones.deck.is_empty() && zones.discard.is_empty() {
            return Err(DomainError::DeckEmpty);
        }
        let drawn = zones.draw(count, rng);
        self.record(
            actor,
            ActionKind::Draw {
                card_ids: drawn.items.clone(),
                recycled: drawn.recycled,
            },
            clock,
        );
        Ok(drawn.items)
    }

    /// Plays a card from hand onto the bottom row of one of the requester's
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound`, `BadLocationIndex` or `LocationLocked`.
    pub fn play_to_location(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        location_index: usize,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        let hand_index = player
            .zones
            .hand_index(card_id)
            .ok_or(DomainError::CardNotFound(card_id))?;
        player.board.open_location(location_index)?;

        let card = player.zones.hand.remove(hand_index);
        player.board.locations[location_index]
            .bottom
            .push(card.turned(Face::Up));
        self.record(
            actor,
            ActionKind::Play {
                card_id,
                location_index,
                hand_index,
            },
            clock,
        );
        Ok(())
    }

    /// Discards cards from the requester's hand, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty or repeating list, or `CardNotFound`
    /// if any card is not in hand.
    pub fn discard(
        &mut self,
        actor: PlayerId,
        card_ids: &[CardId],
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        if card_ids.is_empty() {
            return Err(DomainError::Validation("no cards to discard".to_owned()));
        }
        if card_ids
            .iter()
            .enumerate()
            .any(|(i, id)| card_ids[..i].contains(id))
        {
            return Err(DomainError::Validation(
                "a card is listed more than once".to_owned(),
            ));
        }
        let zones = &mut self.actor_mut(actor)?.zones;
        if let Some(&missing) = card_ids.iter().find(|&&id| zones.hand_index(id).is_none()) {
            return Err(DomainError::CardNotFound(missing));
        }

        let mut cards = Vec::with_capacity(card_ids.len());
        for &card_id in card_ids {
            let Some(hand_index) = zones.hand_index(card_id) else {
                continue;
            };
            let card = zones.hand.remove(hand_index);
            zones.discard.push(card.turned(Face::Up));
            cards.push(HandCard {
                card_id,
                hand_index,
            });
        }
        self.record(actor, ActionKind::Discard { cards }, clock);
        Ok(())
    }

    /// Resolves a one-shot card from hand straight to the discard.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` if the card is not in hand.
    pub fn play_effect(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let zones = &mut self.actor_mut(actor)?.zones;
        let hand_index = zones
            .hand_index(card_id)
            .ok_or(DomainError::CardNotFound(card_id))?;
        let card = zones.hand.remove(hand_index);
        zones.discard.push(card.turned(Face::Up));
        self.record(
            actor,
            ActionKind::PlayEffect {
                card_id,
                hand_index,
            },
            clock,
        );
        Ok(())
    }

    /// Moves a card between the bottom rows of two of the requester's
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns `BadLocationIndex`, `NoChange`, `CardNotFound`, `CardLocked` or
    /// `LocationLocked` for the destination.
    pub fn move_card(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        from: usize,
        to: usize,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let board = &mut self.actor_mut(actor)?.board;
        let source = board.location(from)?;
        let from_index = source
            .bottom_index(card_id)
            .ok_or(DomainError::CardNotFound(card_id))?;
        if source.bottom[from_index].locked {
            return Err(DomainError::CardLocked(card_id));
        }
        board.open_location(to)?;
        if from == to {
            return Err(DomainError::NoChange);
        }

        let card = board.locations[from].bottom.remove(from_index);
        board.locations[to].bottom.push(card);
        self.record(
            actor,
            ActionKind::Move {
                card_id,
                from,
                to,
                from_index,
            },
            clock,
        );
        Ok(())
    }

    /// Removes a card from a board location.
    ///
    /// A bottom-row card goes to its board owner's discard. A top-row card
    /// is vanquished to its board owner's fate discard. `target_id` names
    /// the board owner and defaults to the requester.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound`, `BadLocationIndex`, `CardNotFound` or
    /// `CardLocked`.
    pub fn remove_card(
        &mut self,
        actor: PlayerId,
        target_id: Option<PlayerId>,
        card_id: CardId,
        from: usize,
        clock: &dyn Clock,
    ) -> Result<Row, DomainError> {
        self.require_playing(actor)?;
        let target_id = target_id.unwrap_or(actor);
        let target = self.player_mut(target_id)?;
        target.board.location(from)?;
        let slot = target
            .board
            .find(card_id)
            .filter(|slot| slot.location == from)
            .ok_or(DomainError::CardNotFound(card_id))?;
        if target.board.card_at(slot).is_some_and(|c| c.locked) {
            return Err(DomainError::CardLocked(card_id));
        }
        let card = target
            .board
            .take(slot)
            .ok_or(DomainError::CardNotFound(card_id))?
            .turned(Face::Up);
        let (row, index) = (slot.row, slot.index);
        let action = match row {
            Row::Top => {
                target.zones.fate_discard.push(card);
                ActionKind::Vanquish {
                    target_id,
                    card_id,
                    from,
                }
            }
            Row::Bottom => {
                target.zones.discard.push(card);
                ActionKind::Remove {
                    target_id,
                    card_id,
                    from,
                    from_index: index,
                }
            }
        };
        self.record(actor, action, clock);
        Ok(row)
    }

    /// Shuffles the requester's discard into their deck.
    ///
    /// # Errors
    ///
    /// Returns `DiscardEmpty` if there is nothing to shuffle in.
    pub fn reshuffle_deck(
        &mut self,
        actor: PlayerId,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<usize, DomainError> {
        self.require_playing(actor)?;
        let moved = self.actor_mut(actor)?.zones.reshuffle_discard(rng)?;
        self.record(actor, ActionKind::Reshuffle { moved }, clock);
        Ok(moved)
    }

    /// Takes a card from the requester's discard back into hand.
    ///
    /// # Errors
    ///
    /// Returns `DiscardEmpty` if the discard is empty, or `CardNotFound`.
    pub fn take_from_discard(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let zones = &mut self.actor_mut(actor)?.zones;
        if zones.discard.is_empty() {
            return Err(DomainError::DiscardEmpty);
        }
        let discard_index =
            position(&zones.discard, card_id).ok_or(DomainError::CardNotFound(card_id))?;
        let card = zones.discard.remove(discard_index);
        zones.hand.push(card.turned(Face::Up));
        self.record(
            actor,
            ActionKind::Retrieve {
                card_id,
                discard_index,
            },
            clock,
        );
        Ok(())
    }

    /// A player's discard pile, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotPlaying` or `PlayerNotFound`.
    pub fn discard_pile(&self, actor: PlayerId, target_id: PlayerId) -> Result<&[Card], DomainError> {
        self.require_playing(actor)?;
        Ok(&self.player(target_id)?.zones.discard)
    }

    /// Changes the requester's power by at most ten, within `[0, 50]`.
    ///
    /// # Errors
    ///
    /// Returns `NoChange` if the power would stay the same.
    pub fn change_power(
        &mut self,
        actor: PlayerId,
        delta: i32,
        clock: &dyn Clock,
    ) -> Result<i32, DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        let (prev, next) = step_counter(player.power, delta, MAX_POWER)?;
        player.power = next;
        self.record(actor, ActionKind::Power { prev, next }, clock);
        Ok(next)
    }

    /// Changes the requester's trust by at most ten, within `[0, 50]`.
    ///
    /// # Errors
    ///
    /// Returns `NoChange` if the trust would stay the same.
    pub fn change_trust(
        &mut self,
        actor: PlayerId,
        delta: i32,
        clock: &dyn Clock,
    ) -> Result<i32, DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        let (prev, next) = step_counter(player.trust, delta, MAX_TRUST)?;
        player.trust = next;
        self.record(actor, ActionKind::Trust { prev, next }, clock);
        Ok(next)
    }

    /// Moves the requester's pawn. Only the active player may do this.
    ///
    /// # Errors
    ///
    /// Returns `NotYourTurn`, `BadLocationIndex`, `LocationLocked` or
    /// `NoChange`.
    pub fn set_pawn(&mut self, actor: PlayerId, to: usize, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_active(actor)?;
        let board = &mut self.actor_mut(actor)?.board;
        board.open_location(to)?;
        let from = board.mover_at;
        if from == to {
            return Err(DomainError::NoChange);
        }
        board.mover_at = to;
        self.record(actor, ActionKind::Pawn { from, to }, clock);
        Ok(())
    }

    /// Sets or toggles a location's lock on the target's board (default:
    /// the requester's).
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound`, `BadLocationIndex` or `NoChange`.
    pub fn toggle_location_lock(
        &mut self,
        actor: PlayerId,
        target_id: Option<PlayerId>,
        index: usize,
        locked: Option<bool>,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.require_playing(actor)?;
        let target_id = target_id.unwrap_or(actor);
        let location = self.player_mut(target_id)?.board.location_mut(index)?;
        let prev = location.locked;
        let next = locked.unwrap_or(!prev);
        if next == prev {
            return Err(DomainError::NoChange);
        }
        location.locked = next;
        self.record(
            actor,
            ActionKind::LocationLock {
                target_id,
                index,
                prev,
                next,
            },
            clock,
        );
        Ok(next)
    }

    /// Sets or toggles the lock flag of a card on any board.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `NoChange`.
    pub fn toggle_card_lock(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        locked: Option<bool>,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.require_playing(actor)?;
        let card = self
            .players
            .iter_mut()
            .find_map(|p| p.board.card_mut(card_id))
            .ok_or(DomainError::CardNotFound(card_id))?;
        let prev = card.locked;
        let next = locked.unwrap_or(!prev);
        if next == prev {
            return Err(DomainError::NoChange);
        }
        card.locked = next;
        self.record(actor, ActionKind::CardLock { card_id, prev, next }, clock);
        Ok(next)
    }

    /// Adjusts a card's strength modifier by at most five, within
    /// `[-20, 20]`.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `NoChange`.
    pub fn delta_strength(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        delta: i32,
        clock: &dyn Clock,
    ) -> Result<i32, DomainError> {
        self.require_playing(actor)?;
        let card = self
            .card_mut(card_id)
            .ok_or(DomainError::CardNotFound(card_id))?;
        let prev = card.strength_modifier;
        let step = delta.clamp(-STRENGTH_STEP_LIMIT, STRENGTH_STEP_LIMIT);
        let next = (prev + step).clamp(-MAX_STRENGTH_MODIFIER, MAX_STRENGTH_MODIFIER);
        if next == prev {
            return Err(DomainError::NoChange);
        }
        card.strength_modifier = next;
        self.record(actor, ActionKind::Strength { card_id, prev, next }, clock);
        Ok(next)
    }

    /// Creates one of the requester's companion tokens on a bottom row.
    ///
    /// # Errors
    ///
    /// Returns `CharacterNotFound`, `TokenNotFound`, `BadLocationIndex` or
    /// `LocationLocked`.
    pub fn spawn_token(
        &mut self,
        actor: PlayerId,
        token_id: &str,
        location_index: usize,
        catalog: &dyn CharacterCatalog,
        clock: &dyn Clock,
    ) -> Result<Card, DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        let character_id = player
            .character_id
            .as_deref()
            .ok_or(DomainError::CharacterNotChosen)?;
        let character = catalog
            .character(character_id)
            .ok_or_else(|| DomainError::CharacterNotFound(character_id.to_owned()))?;
        let template = character
            .token(token_id)
            .ok_or_else(|| DomainError::TokenNotFound(token_id.to_owned()))?;
        player.board.open_location(location_index)?;

        let card = Card::from_template(template, Face::Up);
        player.board.locations[location_index]
            .bottom
            .push(card.clone());
        self.record(
            actor,
            ActionKind::SpawnToken {
                card_id: card.id,
                token_id: token_id.to_owned(),
                location_index,
            },
            clock,
        );
        Ok(card)
    }

    /// Shows or hides the requester's hand, for characters that allow it.
    ///
    /// # Errors
    ///
    /// Returns `HandVisibilityFixed` or `NoChange`.
    pub fn set_hand_visible(
        &mut self,
        actor: PlayerId,
        visible: bool,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        if player.hand_policy != HandVisibility::Optional {
            return Err(DomainError::HandVisibilityFixed);
        }
        if player.hand_visible == visible {
            return Err(DomainError::NoChange);
        }
        player.hand_visible = visible;
        self.record(actor, ActionKind::HandVisibility { visible }, clock);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fateline_test_support::{FixedClock, MockRng, test_catalog};

    use super::*;
    use crate::domain::room::tests::started_room;

    #[test]
    fn test_draw_moves_top_of_deck_to_hand() {
        // Arrange
        let (mut room, a, _) = started_room();
        let top = room.players[0].zones.deck.last().unwrap().id;

        // Act
        let drawn = room
            .draw(a, 1, &mut MockRng, &FixedClock::default())
            .unwrap();

        // Assert
        assert_eq!(drawn, vec![top]);
        assert_eq!(room.players[0].zones.hand.last().unwrap().id, top);
        assert_eq!(room.log.len(), 1);
    }

    #[test]
    fn test_draw_count_outside_limit_is_rejected() {
        // Arrange
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let before = room.clone();

        // Act
        let none = room.draw(a, 0, &mut MockRng, &clock);
        let too_many = room.draw(a, MAX_DRAW + 1, &mut MockRng, &clock);

        // Assert
        assert!(matches!(none, Err(DomainError::Validation(_))));
        assert!(matches!(too_many, Err(DomainError::Validation(_))));
        assert_eq!(room, before);
        assert!(room.draw(a, MAX_DRAW, &mut MockRng, &clock).is_ok());
    }

    #[test]
    fn test_draw_with_empty_piles_fails_without_logging() {
        let (mut room, a, _) = started_room();
        room.players[0].zones.deck.clear();

        let result = room.draw(a, 1, &mut MockRng, &FixedClock::default());

        assert_eq!(result, Err(DomainError::DeckEmpty));
        assert!(room.log.is_empty());
    }

    #[test]
    fn test_play_to_locked_location_leaves_hand_unchanged() {
        // Arrange
        let (mut room, _, b) = started_room();
        let hand = room.players[1].zones.hand.clone();

        // Act
        let result = room.play_to_location(b, hand[0].id, 0, &FixedClock::default());

        // Assert
        assert_eq!(result, Err(DomainError::LocationLocked(0)));
        assert_eq!(room.players[1].zones.hand, hand);
    }

    #[test]
    fn test_play_to_location_moves_card_to_bottom_row() {
        let (mut room, a, _) = started_room();
        let card_id = room.players[0].zones.hand[1].id;

        room.play_to_location(a, card_id, 2, &FixedClock::default())
            .unwrap();

        let player = &room.players[0];
        assert_eq!(player.zones.hand.len(), 3);
        assert_eq!(player.board.locations[2].bottom[0].id, card_id);
    }

    #[test]
    fn test_discard_rejects_unknown_or_repeated_cards() {
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let first = room.players[0].zones.hand[0].id;
        let stray = room.players[0].zones.deck[0].id;

        assert_eq!(
            room.discard(a, &[first, stray], &clock),
            Err(DomainError::CardNotFound(stray))
        );
        assert!(matches!(
            room.discard(a, &[first, first], &clock),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(room.players[0].zones.hand.len(), 4);
    }

    #[test]
    fn test_move_card_between_bottom_rows() {
        // Arrange
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let card_id = room.players[0].zones.hand[0].id;
        room.play_to_location(a, card_id, 0, &clock).unwrap();

        // Act
        room.move_card(a, card_id, 0, 3, &clock).unwrap();

        // Assert
        let board = &room.players[0].board;
        assert!(board.locations[0].bottom.is_empty());
        assert_eq!(board.locations[3].bottom[0].id, card_id);
    }

    #[test]
    fn test_locked_card_cannot_move_or_be_removed() {
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let card_id = room.players[0].zones.hand[0].id;
        room.play_to_location(a, card_id, 0, &clock).unwrap();
        room.toggle_card_lock(a, card_id, Some(true), &clock).unwrap();

        assert_eq!(
            room.move_card(a, card_id, 0, 1, &clock),
            Err(DomainError::CardLocked(card_id))
        );
        assert_eq!(
            room.remove_card(a, None, card_id, 0, &clock),
            Err(DomainError::CardLocked(card_id))
        );
    }

    #[test]
    fn test_remove_top_row_card_vanquishes_to_owner_fate_discard() {
        // Arrange
        let (mut room, a, b) = started_room();
        let clock = FixedClock::default();
        let session = room.fate_start(a, b, &mut MockRng, &clock).unwrap();
        let hero = session.cards[0].id;
        room.fate_choose(a, hero, &clock).unwrap();
        room.fate_place_selected(a, 1, &clock).unwrap();

        // Act
        let row = room.remove_card(a, Some(b), hero, 1, &clock).unwrap();

        // Assert
        assert_eq!(row, Row::Top);
        assert_eq!(room.players[1].zones.fate_discard.last().unwrap().id, hero);
        assert!(room.players[1].board.locations[1].top.is_empty());
    }

    #[test]
    fn test_remove_card_from_another_location_is_not_found() {
        // Arrange
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let card_id = room.players[0].zones.hand[0].id;
        room.play_to_location(a, card_id, 1, &clock).unwrap();
        let before = room.clone();

        // Act
        let result = room.remove_card(a, None, card_id, 2, &clock);

        // Assert
        assert_eq!(result, Err(DomainError::CardNotFound(card_id)));
        assert_eq!(room, before);
    }

    #[test]
    fn test_power_change_is_clamped_and_rejects_no_change() {
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();

        assert_eq!(room.change_power(a, 0, &clock), Err(DomainError::NoChange));
        assert_eq!(room.change_power(a, 99, &clock), Ok(10));
        assert_eq!(room.change_power(a, -99, &clock), Ok(0));
        assert_eq!(room.change_power(a, -1, &clock), Err(DomainError::NoChange));
    }

    #[test]
    fn test_pawn_is_turn_gated() {
        let (mut room, a, b) = started_room();
        let clock = FixedClock::default();

        assert_eq!(room.set_pawn(b, 1, &clock), Err(DomainError::NotYourTurn));
        assert_eq!(room.set_pawn(a, 0, &clock), Err(DomainError::NoChange));
        room.set_pawn(a, 2, &clock).unwrap();
        assert_eq!(room.players[0].board.mover_at, 2);
    }

    #[test]
    fn test_pawn_cannot_enter_locked_location() {
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        room.toggle_location_lock(a, None, 1, None, &clock).unwrap();

        assert_eq!(
            room.set_pawn(a, 1, &clock),
            Err(DomainError::LocationLocked(1))
        );
    }

    #[test]
    fn test_location_lock_no_change_fails() {
        let (mut room, a, b) = started_room();
        let clock = FixedClock::default();

        assert_eq!(
            room.toggle_location_lock(a, Some(b), 0, Some(true), &clock),
            Err(DomainError::NoChange)
        );
        assert_eq!(
            room.toggle_location_lock(a, Some(b), 0, None, &clock),
            Ok(false)
        );
    }

    #[test]
    fn test_strength_delta_is_clamped() {
        // Arrange
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let card_id = room.players[0].zones.hand[0].id;

        // Act
        let mut last = 0;
        for _ in 0..6 {
            last = room.delta_strength(a, card_id, 9, &clock).unwrap_or(last);
        }

        // Assert
        assert_eq!(last, MAX_STRENGTH_MODIFIER);
        assert_eq!(
            room.delta_strength(a, card_id, 1, &clock),
            Err(DomainError::NoChange)
        );
    }

    #[test]
    fn test_spawn_token_uses_character_template() {
        let (mut room, a, b) = started_room();
        let catalog = test_catalog();
        let clock = FixedClock::default();

        let token = room.spawn_token(a, "hawk", 1, &catalog, &clock).unwrap();

        assert_eq!(token.template_id, "hawk");
        assert_eq!(room.players[0].board.locations[1].bottom[0].id, token.id);
        assert_eq!(
            room.spawn_token(b, "hawk", 1, &catalog, &clock),
            Err(DomainError::TokenNotFound("hawk".to_owned()))
        );
    }

    #[test]
    fn test_hand_visibility_is_character_gated() {
        let (mut room, a, b) = started_room();
        let clock = FixedClock::default();

        assert_eq!(
            room.set_hand_visible(a, true, &clock),
            Err(DomainError::HandVisibilityFixed)
        );
        room.set_hand_visible(b, true, &clock).unwrap();
        assert!(room.players[1].hand_visible);
        assert_eq!(
            room.set_hand_visible(b, true, &clock),
            Err(DomainError::NoChange)
        );
    }

    #[test]
    fn test_take_from_discard_returns_card_to_hand() {
        let (mut room, a, _) = started_room();
        let clock = FixedClock::default();
        let card_id = room.players[0].zones.hand[0].id;
        room.play_effect(a, card_id, &clock).unwrap();

        room.take_from_discard(a, card_id, &clock).unwrap();

        assert!(room.players[0].zones.discard.is_empty());
        assert_eq!(room.players[0].zones.hand.last().unwrap().id, card_id);
    }

    #[test]
    fn test_moves_require_playing_phase() {
        let catalog = test_catalog();
        let actor = uuid::Uuid::new_v4();
        let mut room = Room::new(
            uuid::Uuid::new_v4(),
            crate::domain::player::Player::new(actor, "Ada").unwrap(),
        );
        room.choose_character(actor, "scout", &catalog).unwrap();

        assert_eq!(
            room.draw(actor, 1, &mut MockRng, &FixedClock::default()),
            Err(DomainError::NotPlaying)
        );
        assert_eq!(
            room.change_power(uuid::Uuid::new_v4(), 1, &FixedClock::default()),
            Err(DomainError::NotInRoom)
        );
    }
}
