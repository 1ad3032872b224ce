//! Inverting the requester's most recent action.

use fateline_core::clock::Clock;
use fateline_core::error::{DomainError, UndoRefusal};
use tracing::debug;

use super::actions::{ActionKind, HandCard};
use super::cards::{CardId, Face, position};
use super::player::PlayerId;
use super::room::Room;

fn changed(what: &str) -> DomainError {
    DomainError::CannotUndoStateChanged(what.to_owned())
}

impl Room {
    /// Undoes the requester's last action and logs the undo.
    ///
    /// Only the newest entry that is not itself an undo is considered.
    /// Returns the id of the undone entry.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUndo`, `NotYourLastAction`, `AlreadyUndone`,
    /// `CannotUndo` for kinds without an inverse, or
    /// `CannotUndoStateChanged` when the cards have moved on since.
    pub fn undo_self(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<u64, DomainError> {
        self.require_playing(actor)?;
        let entry = self.log.last_undoable().ok_or(DomainError::NothingToUndo)?;
        if entry.actor_id != actor {
            return Err(DomainError::NotYourLastAction);
        }
        if entry.undone {
            return Err(DomainError::AlreadyUndone);
        }
        let (undone_id, action) = (entry.id, entry.action.clone());

        self.invert(actor, &action)?;
        self.log.mark_undone(undone_id);
        self.record(actor, ActionKind::Undo { undone_id }, clock);
        debug!(room_id = %self.id, undone_id, kind = action.name(), "action undone");
        Ok(undone_id)
    }

    fn invert(&mut self, actor: PlayerId, action: &ActionKind) -> Result<(), DomainError> {
        match action {
            ActionKind::Draw { recycled: true, .. }
            | ActionKind::Reshuffle { .. }
            | ActionKind::FateReshuffle { .. } => Err(DomainError::CannotUndo(UndoRefusal::Reshuffle)),
            ActionKind::Power { .. } => Err(DomainError::CannotUndo(UndoRefusal::Power)),
            ActionKind::Draw { card_ids, .. } => self.undo_draw(actor, card_ids),
            ActionKind::Play {
                card_id,
                location_index,
                hand_index,
            } => self.undo_play(actor, *card_id, *location_index, *hand_index),
            ActionKind::Discard { cards } => self.undo_discard(actor, cards),
            ActionKind::Move {
                card_id,
                from,
                to,
                from_index,
            } => self.undo_move(actor, *card_id, *from, *to, *from_index),
            ActionKind::Remove {
                target_id,
                card_id,
                from,
                from_index,
            } => self.undo_remove(*target_id, *card_id, *from, *from_index),
            ActionKind::Retrieve {
                card_id,
                discard_index,
            } => self.undo_retrieve(actor, *card_id, *discard_index),
            ActionKind::Pawn { from, .. } => {
                self.actor_mut(actor)?.board.mover_at = *from;
                Ok(())
            }
            ActionKind::LocationLock {
                target_id,
                index,
                prev,
                ..
            } => {
                let target = self
                    .player_mut(*target_id)
                    .map_err(|_| changed("the board owner has left"))?;
                target.board.location_mut(*index)?.locked = *prev;
                Ok(())
            }
            ActionKind::CardLock { card_id, prev, .. } => {
                let card = self
                    .players
                    .iter_mut()
                    .find_map(|p| p.board.card_mut(*card_id))
                    .ok_or_else(|| changed("the card is no longer on a board"))?;
                card.locked = *prev;
                Ok(())
            }
            ActionKind::Strength { card_id, prev, .. } => {
                let card = self
                    .card_mut(*card_id)
                    .ok_or_else(|| changed("the card can no longer be found"))?;
                card.strength_modifier = *prev;
                Ok(())
            }
            ActionKind::PlayEffect {
                card_id,
                hand_index,
            } => self.undo_play_effect(actor, *card_id, *hand_index),
            ActionKind::FateReturn {
                target_id,
                card_id,
                discard_index,
            } => self.undo_fate_return(*target_id, *card_id, *discard_index),
            ActionKind::Vanquish { .. }
            | ActionKind::Trust { .. }
            | ActionKind::HandVisibility { .. }
            | ActionKind::EndTurn { .. }
            | ActionKind::ClaimWin
            | ActionKind::SpawnToken { .. }
            | ActionKind::Fate { .. }
            | ActionKind::Peek { .. }
            | ActionKind::Sift { .. }
            | ActionKind::Undo { .. } => {
                Err(DomainError::CannotUndo(UndoRefusal::Unsupported(action.name())))
            }
        }
    }

    fn undo_draw(&mut self, actor: PlayerId, card_ids: &[CardId]) -> Result<(), DomainError> {
        let zones = &mut self.actor_mut(actor)?.zones;
        if card_ids.iter().any(|&id| zones.hand_index(id).is_none()) {
            return Err(changed("a drawn card has left the hand"));
        }
        // Last drawn goes back first so the first drawn ends on top.
        for &card_id in card_ids.iter().rev() {
            if let Some(index) = zones.hand_index(card_id) {
                let card = zones.hand.remove(index);
                zones.deck.push(card.turned(Face::Down));
            }
        }
        Ok(())
    }

    fn undo_play(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        location_index: usize,
        hand_index: usize,
    ) -> Result<(), DomainError> {
        let player = self.actor_mut(actor)?;
        let location = player.board.location_mut(location_index)?;
        let index = location
            .bottom_index(card_id)
            .ok_or_else(|| changed("the card has left the location"))?;
        let card = location.bottom.remove(index);
        let hand = &mut player.zones.hand;
        hand.insert(hand_index.min(hand.len()), card.turned(Face::Up));
        Ok(())
    }

    fn undo_discard(&mut self, actor: PlayerId, cards: &[HandCard]) -> Result<(), DomainError> {
        let zones = &mut self.actor_mut(actor)?.zones;
        let ids: Vec<CardId> = cards.iter().map(|c| c.card_id).collect();
        if !zones.discard_ends_with(&ids) {
            return Err(changed("the discarded cards are no longer on top"));
        }
        for entry in cards.iter().rev() {
            if let Some(card) = zones.discard.pop() {
                let at = entry.hand_index.min(zones.hand.len());
                zones.hand.insert(at, card.turned(Face::Up));
            }
        }
        Ok(())
    }

    fn undo_move(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        from: usize,
        to: usize,
        from_index: usize,
    ) -> Result<(), DomainError> {
        let board = &mut self.actor_mut(actor)?.board;
        board.location(from)?;
        let index = board
            .location(to)?
            .bottom_index(card_id)
            .ok_or_else(|| changed("the card has left its destination"))?;
        let card = board.locations[to].bottom.remove(index);
        let source = &mut board.locations[from].bottom;
        source.insert(from_index.min(source.len()), card);
        Ok(())
    }

    fn undo_remove(
        &mut self,
        target_id: PlayerId,
        card_id: CardId,
        from: usize,
        from_index: usize,
    ) -> Result<(), DomainError> {
        let target = self
            .player_mut(target_id)
            .map_err(|_| changed("the board owner has left"))?;
        target.board.location(from)?;
        if target.zones.discard.last().map(|c| c.id) != Some(card_id) {
            return Err(changed("the card is no longer on top of the discard"));
        }
        if let Some(card) = target.zones.discard.pop() {
            let bottom = &mut target.board.locations[from].bottom;
            bottom.insert(from_index.min(bottom.len()), card);
        }
        Ok(())
    }

    fn undo_retrieve(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        discard_index: usize,
    ) -> Result<(), DomainError> {
        let zones = &mut self.actor_mut(actor)?.zones;
        let index = zones
            .hand_index(card_id)
            .ok_or_else(|| changed("the card has left the hand"))?;
        let card = zones.hand.remove(index);
        let at = discard_index.min(zones.discard.len());
        zones.discard.insert(at, card);
        Ok(())
    }

    fn undo_play_effect(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        hand_index: usize,
    ) -> Result<(), DomainError> {
        let zones = &mut self.actor_mut(actor)?.zones;
        if zones.discard.last().map(|c| c.id) != Some(card_id) {
            return Err(changed("the card is no longer on top of the discard"));
        }
        if let Some(card) = zones.discard.pop() {
            let at = hand_index.min(zones.hand.len());
            // Face up, as it was in the hand before it was played.
            zones.hand.insert(at, card.turned(Face::Up));
        }
        Ok(())
    }

    fn undo_fate_return(
        &mut self,
        target_id: PlayerId,
        card_id: CardId,
        discard_index: usize,
    ) -> Result<(), DomainError> {
        let zones = &mut self
            .player_mut(target_id)
            .map_err(|_| changed("the deck owner has left"))?
            .zones;
        let index = position(&zones.fate_deck, card_id)
            .ok_or_else(|| changed("the card has left the fate deck"))?;
        let card = zones.fate_deck.remove(index);
        let at = discard_index.min(zones.fate_discard.len());
        zones.fate_discard.insert(at, card.turned(Face::Up));
        Ok(())
    }
}
