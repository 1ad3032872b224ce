//! Fate sessions: short-lived, single-owner transactions over a target
//! player's fate pile.
//!
//! A room holds at most one session of each kind. Cards drawn into a
//! session belong to the session until it resolves or is cancelled.

use fateline_core::clock::Clock;
use fateline_core::error::DomainError;
use fateline_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::debug;

use super::actions::{ActionKind, FateStep, SessionStep};
use super::cards::{Card, CardId, Face, position};
use super::player::PlayerId;
use super::room::Room;

/// Cards drawn by a plain fate session.
pub const FATE_DRAW: usize = 2;

/// Most cards a peek may take.
pub const MAX_PEEK: usize = 5;

/// Cards drawn by a sift.
pub const SIFT_DRAW: usize = 2;

/// Where a plain fate session's cards came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FateOrigin {
    /// Drawn off the fate deck.
    Deck,
    /// Taken from this index of the fate discard.
    Discard { index: usize },
}

/// A plain fate session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FateSession {
    pub owner_id: PlayerId,
    pub target_id: PlayerId,
    /// Drawn cards in draw order.
    pub cards: Vec<Card>,
    pub selected_id: Option<CardId>,
    #[serde(skip)]
    pub origin: FateOrigin,
}

/// A peek or sift session. `cards[0]` was the top of the fate deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookSession {
    pub owner_id: PlayerId,
    pub target_id: PlayerId,
    pub cards: Vec<Card>,
}

/// The three session slots of a room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FateSessions {
    pub fate: Option<FateSession>,
    pub peek: Option<LookSession>,
    pub sift: Option<LookSession>,
}

impl FateSessions {
    /// Cards currently held by open sessions.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        let fate = self.fate.iter().flat_map(|s| &s.cards);
        let peek = self.peek.iter().flat_map(|s| &s.cards);
        let sift = self.sift.iter().flat_map(|s| &s.cards);
        fate.chain(peek).chain(sift)
    }
}

trait Owned {
    fn owner_id(&self) -> PlayerId;
}

impl Owned for FateSession {
    fn owner_id(&self) -> PlayerId {
        self.owner_id
    }
}

impl Owned for LookSession {
    fn owner_id(&self) -> PlayerId {
        self.owner_id
    }
}

/// Whether `actor` already holds the slot. Fails if someone else does.
fn claim<S: Owned>(slot: Option<&S>, actor: PlayerId) -> Result<bool, DomainError> {
    match slot {
        None => Ok(false),
        Some(s) if s.owner_id() == actor => Ok(true),
        Some(_) => Err(DomainError::AnotherSessionActive),
    }
}

/// The open session, if `actor` owns it.
fn held<S: Owned>(slot: Option<&S>, actor: PlayerId) -> Result<&S, DomainError> {
    let session = slot.ok_or(DomainError::NoActiveSession)?;
    if session.owner_id() != actor {
        return Err(DomainError::AnotherSessionActive);
    }
    Ok(session)
}

impl Room {
    fn target_seat(&self, target_id: PlayerId) -> Result<usize, DomainError> {
        self.seat(target_id)
            .ok_or(DomainError::PlayerNotFound(target_id))
    }

    /// Draws two fate cards from the target's pile into a new session.
    ///
    /// # Errors
    ///
    /// Returns `SessionAlreadyOpen` if the requester already holds the plain
    /// fate session, `AnotherSessionActive` if someone else does,
    /// `PlayerNotFound`, or `FateDeckEmpty` when both fate piles are empty.
    pub fn fate_start(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<FateSession, DomainError> {
        self.require_playing(actor)?;
        if claim(self.sessions.fate.as_ref(), actor)? {
            return Err(DomainError::SessionAlreadyOpen);
        }
        let seat = self.target_seat(target_id)?;
        let zones = &mut self.players[seat].zones;
        if zones.fate_deck.is_empty() && zones.fate_discard.is_empty() {
            return Err(DomainError::FateDeckEmpty);
        }
        let drawn = zones.fate_draw(FATE_DRAW, rng);
        let step = FateStep::Started {
            drawn: drawn.items.len(),
            recycled: drawn.recycled,
        };
        let session = FateSession {
            owner_id: actor,
            target_id,
            cards: drawn.items,
            selected_id: None,
            origin: FateOrigin::Deck,
        };
        self.sessions.fate = Some(session.clone());
        self.record(actor, ActionKind::Fate { target_id, step }, clock);
        Ok(session)
    }

    /// Opens a plain fate session holding one card taken from the target's
    /// fate discard, already selected.
    ///
    /// # Errors
    ///
    /// Returns the same session errors as [`Room::fate_start`], or
    /// `CardNotFound` if the card is not in the target's fate discard.
    pub fn fate_start_from_discard(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        card_id: CardId,
        clock: &dyn Clock,
    ) -> Result<FateSession, DomainError> {
        self.require_playing(actor)?;
        if claim(self.sessions.fate.as_ref(), actor)? {
            return Err(DomainError::SessionAlreadyOpen);
        }
        let seat = self.target_seat(target_id)?;
        let zones = &mut self.players[seat].zones;
        let index =
            position(&zones.fate_discard, card_id).ok_or(DomainError::CardNotFound(card_id))?;
        let card = zones.fate_discard.remove(index);
        let session = FateSession {
            owner_id: actor,
            target_id,
            cards: vec![card],
            selected_id: Some(card_id),
            origin: FateOrigin::Discard { index },
        };
        self.sessions.fate = Some(session.clone());
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::StartedFromDiscard { card_id },
            },
            clock,
        );
        Ok(session)
    }

    /// Marks one drawn card as the one to play.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive` or `CardNotFound`.
    pub fn fate_choose(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        clock: &dyn Clock,
    ) -> Result<FateSession, DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.fate.as_ref(), actor)?;
        if position(&session.cards, card_id).is_none() {
            return Err(DomainError::CardNotFound(card_id));
        }
        let target_id = session.target_id;
        let mut session = session.clone();
        session.selected_id = Some(card_id);
        self.sessions.fate = Some(session.clone());
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::Selected { card_id },
            },
            clock,
        );
        Ok(session)
    }

    /// Places the selected card on the target's board top row; any other
    /// drawn card goes to the target's fate discard.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive`, `NothingSelected`,
    /// `BadLocationIndex`, `LocationLocked` or `LocationFull`.
    pub fn fate_place_selected(
        &mut self,
        actor: PlayerId,
        location_index: usize,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.fate.as_ref(), actor)?;
        let selected = session.selected_id.ok_or(DomainError::NothingSelected)?;
        let target_id = session.target_id;
        let seat = self.target_seat(target_id)?;
        let location = self.players[seat].board.open_location(location_index)?;
        if !location.has_free_slot() {
            return Err(DomainError::LocationFull(location_index));
        }

        let Some(session) = self.sessions.fate.take() else {
            return Err(DomainError::NoActiveSession);
        };
        let target = &mut self.players[seat];
        for card in session.cards {
            if card.id == selected {
                target.board.locations[location_index]
                    .top
                    .push(card.turned(Face::Up));
            } else {
                target.zones.fate_discard.push(card);
            }
        }
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::Placed {
                    card_id: selected,
                    location_index,
                },
            },
            clock,
        );
        Ok(())
    }

    /// Sends every drawn card to the target's fate discard, the selected one
    /// last.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive` or `NothingSelected`.
    pub fn fate_discard_selected(
        &mut self,
        actor: PlayerId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.fate.as_ref(), actor)?;
        let selected = session.selected_id.ok_or(DomainError::NothingSelected)?;
        let target_id = session.target_id;
        let seat = self.target_seat(target_id)?;

        let Some(session) = self.sessions.fate.take() else {
            return Err(DomainError::NoActiveSession);
        };
        let (chosen, others): (Vec<Card>, Vec<Card>) =
            session.cards.into_iter().partition(|c| c.id == selected);
        let pile = &mut self.players[seat].zones.fate_discard;
        pile.extend(others);
        pile.extend(chosen);
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::DiscardedSelected { card_id: selected },
            },
            clock,
        );
        Ok(())
    }

    /// Sends both drawn cards to the target's fate discard in draw order.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive`, or `Validation` if
    /// the session does not hold exactly two cards.
    pub fn fate_discard_both(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.fate.as_ref(), actor)?;
        if session.cards.len() != FATE_DRAW {
            return Err(DomainError::Validation(format!(
                "discardBoth needs exactly {FATE_DRAW} drawn cards"
            )));
        }
        let target_id = session.target_id;
        let seat = self.target_seat(target_id)?;

        let Some(session) = self.sessions.fate.take() else {
            return Err(DomainError::NoActiveSession);
        };
        self.players[seat].zones.fate_discard.extend(session.cards);
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::DiscardedBoth,
            },
            clock,
        );
        Ok(())
    }

    /// Returns the drawn cards where they came from.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` or `AnotherSessionActive`.
    pub fn fate_cancel(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let target_id = held(self.sessions.fate.as_ref(), actor)?.target_id;
        if let Some(session) = self.sessions.fate.take() {
            self.restore_fate(session);
        }
        self.record(
            actor,
            ActionKind::Fate {
                target_id,
                step: FateStep::Cancelled,
            },
            clock,
        );
        Ok(())
    }

    fn restore_fate(&mut self, session: FateSession) {
        let Some(seat) = self.seat(session.target_id) else {
            return;
        };
        let zones = &mut self.players[seat].zones;
        match session.origin {
            FateOrigin::Deck => zones.fate_restore(session.cards),
            FateOrigin::Discard { index } => {
                for card in session.cards.into_iter().rev() {
                    let at = index.min(zones.fate_discard.len());
                    zones.fate_discard.insert(at, card);
                }
            }
        }
    }

    fn restore_look(&mut self, session: LookSession) {
        if let Some(seat) = self.seat(session.target_id) {
            self.players[seat].zones.fate_restore(session.cards);
        }
    }

    /// Takes up to `count` cards off the target's fate deck for private
    /// viewing. Re-opening by the holder returns the open session.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a count outside `1..=5`,
    /// `AnotherSessionActive`, `PlayerNotFound` or `FateDeckEmpty`.
    pub fn peek_start(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        count: usize,
        clock: &dyn Clock,
    ) -> Result<LookSession, DomainError> {
        self.require_playing(actor)?;
        if !(1..=MAX_PEEK).contains(&count) {
            return Err(DomainError::Validation(format!(
                "peek count must be 1 to {MAX_PEEK}"
            )));
        }
        if claim(self.sessions.peek.as_ref(), actor)? {
            if let Some(open) = &self.sessions.peek {
                debug!(room_id = %self.id, "peek already open for requester");
                return Ok(open.clone());
            }
        }
        let seat = self.target_seat(target_id)?;
        let zones = &mut self.players[seat].zones;
        if zones.fate_deck.is_empty() {
            return Err(DomainError::FateDeckEmpty);
        }
        let cards = zones.fate_take(count);
        let taken = cards.len();
        let session = LookSession {
            owner_id: actor,
            target_id,
            cards,
        };
        self.sessions.peek = Some(session.clone());
        self.record(
            actor,
            ActionKind::Peek {
                target_id,
                count: taken,
                step: SessionStep::Started,
            },
            clock,
        );
        Ok(session)
    }

    /// Puts the peeked cards back so that `order[0]` is the new top.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive`, or `Validation` if
    /// `order` is not a permutation of the peeked cards.
    pub fn peek_confirm(
        &mut self,
        actor: PlayerId,
        order: &[CardId],
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.peek.as_ref(), actor)?;
        let is_permutation = order.len() == session.cards.len()
            && session
                .cards
                .iter()
                .all(|c| order.iter().filter(|&&id| id == c.id).count() == 1);
        if !is_permutation {
            return Err(DomainError::Validation(
                "order must list every peeked card exactly once".to_owned(),
            ));
        }
        let (target_id, count) = (session.target_id, session.cards.len());

        let Some(mut session) = self.sessions.peek.take() else {
            return Err(DomainError::NoActiveSession);
        };
        session
            .cards
            .sort_by_key(|c| order.iter().position(|&id| id == c.id));
        self.restore_look(session);
        self.record(
            actor,
            ActionKind::Peek {
                target_id,
                count,
                step: SessionStep::Resolved,
            },
            clock,
        );
        Ok(())
    }

    /// Puts the peeked cards back in their original order.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` or `AnotherSessionActive`.
    pub fn peek_cancel(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.peek.as_ref(), actor)?;
        let (target_id, count) = (session.target_id, session.cards.len());
        if let Some(session) = self.sessions.peek.take() {
            self.restore_look(session);
        }
        self.record(
            actor,
            ActionKind::Peek {
                target_id,
                count,
                step: SessionStep::Cancelled,
            },
            clock,
        );
        Ok(())
    }

    /// Takes up to two cards off the target's fate deck; the requester must
    /// then choose one to discard. Re-opening by the holder returns the open
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `AnotherSessionActive`, `PlayerNotFound` or `FateDeckEmpty`.
    pub fn sift_start(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        clock: &dyn Clock,
    ) -> Result<LookSession, DomainError> {
        self.require_playing(actor)?;
        if claim(self.sessions.sift.as_ref(), actor)? {
            if let Some(open) = &self.sessions.sift {
                debug!(room_id = %self.id, "sift already open for requester");
                return Ok(open.clone());
            }
        }
        let seat = self.target_seat(target_id)?;
        let zones = &mut self.players[seat].zones;
        if zones.fate_deck.is_empty() {
            return Err(DomainError::FateDeckEmpty);
        }
        let session = LookSession {
            owner_id: actor,
            target_id,
            cards: zones.fate_take(SIFT_DRAW),
        };
        self.sessions.sift = Some(session.clone());
        self.record(
            actor,
            ActionKind::Sift {
                target_id,
                step: SessionStep::Started,
            },
            clock,
        );
        Ok(session)
    }

    /// Discards the chosen card and returns the other to the fate deck top.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession`, `AnotherSessionActive` or `CardNotFound`.
    pub fn sift_choose(
        &mut self,
        actor: PlayerId,
        discard_id: CardId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let session = held(self.sessions.sift.as_ref(), actor)?;
        if position(&session.cards, discard_id).is_none() {
            return Err(DomainError::CardNotFound(discard_id));
        }
        let target_id = session.target_id;
        let seat = self.target_seat(target_id)?;

        let Some(session) = self.sessions.sift.take() else {
            return Err(DomainError::NoActiveSession);
        };
        let (chosen, others): (Vec<Card>, Vec<Card>) =
            session.cards.into_iter().partition(|c| c.id == discard_id);
        let zones = &mut self.players[seat].zones;
        zones.fate_discard.extend(chosen);
        zones.fate_restore(others);
        self.record(
            actor,
            ActionKind::Sift {
                target_id,
                step: SessionStep::Resolved,
            },
            clock,
        );
        Ok(())
    }

    /// Puts the sifted cards back in their original order.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` or `AnotherSessionActive`.
    pub fn sift_cancel(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let target_id = held(self.sessions.sift.as_ref(), actor)?.target_id;
        if let Some(session) = self.sessions.sift.take() {
            self.restore_look(session);
        }
        self.record(
            actor,
            ActionKind::Sift {
                target_id,
                step: SessionStep::Cancelled,
            },
            clock,
        );
        Ok(())
    }

    /// Moves a card from the target's fate discard onto the fate deck top.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` or `CardNotFound`.
    pub fn fate_return_from_discard(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        card_id: CardId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let seat = self.target_seat(target_id)?;
        let zones = &mut self.players[seat].zones;
        let discard_index =
            position(&zones.fate_discard, card_id).ok_or(DomainError::CardNotFound(card_id))?;
        let card = zones.fate_discard.remove(discard_index);
        zones.fate_deck.push(card.turned(Face::Down));
        self.record(
            actor,
            ActionKind::FateReturn {
                target_id,
                card_id,
                discard_index,
            },
            clock,
        );
        Ok(())
    }

    /// Shuffles the target's fate discard back into their fate deck.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` or `FateDiscardEmpty`.
    pub fn fate_reshuffle(
        &mut self,
        actor: PlayerId,
        target_id: PlayerId,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<usize, DomainError> {
        self.require_playing(actor)?;
        let seat = self.target_seat(target_id)?;
        let moved = self.players[seat].zones.reshuffle_fate_discard(rng)?;
        self.record(actor, ActionKind::FateReshuffle { target_id, moved }, clock);
        Ok(moved)
    }

    /// The target's fate discard, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotPlaying` or `PlayerNotFound`.
    pub fn fate_discard_pile(
        &self,
        actor: PlayerId,
        target_id: PlayerId,
    ) -> Result<&[Card], DomainError> {
        self.require_playing(actor)?;
        Ok(&self.player(target_id)?.zones.fate_discard)
    }

    /// Settles sessions touching a departing player.
    ///
    /// Sessions the leaver owns are cancelled back into their target's
    /// piles. Sessions targeting the leaver are dropped.
    pub(crate) fn release_sessions(&mut self, leaver: PlayerId) {
        let touches = |owner: PlayerId, target: PlayerId| owner == leaver || target == leaver;
        if let Some(session) = self
            .sessions
            .fate
            .take_if(|s| touches(s.owner_id, s.target_id))
        {
            if session.target_id != leaver {
                self.restore_fate(session);
            }
        }
        let peek = self
            .sessions
            .peek
            .take_if(|s| touches(s.owner_id, s.target_id));
        let sift = self
            .sessions
            .sift
            .take_if(|s| touches(s.owner_id, s.target_id));
        for session in [peek, sift].into_iter().flatten() {
            if session.target_id != leaver {
                self.restore_look(session);
            }
        }
    }
}
