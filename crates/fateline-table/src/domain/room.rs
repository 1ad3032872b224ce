//! The room aggregate: seats, lobby and the turn cycle.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use fateline_content::domain::catalog::CharacterCatalog;
use fateline_core::clock::Clock;
use fateline_core::error::DomainError;
use fateline_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::actions::{ActionKind, ActionLog};
use super::cards::{Card, CardId};
use super::fate::FateSessions;
use super::player::{Player, PlayerId};
use super::turn::{Advance, next_active};

/// Identity of a room.
pub type RoomId = Uuid;

/// Seats per room.
pub const MAX_PLAYERS: usize = 6;

/// Players needed to start.
pub const MIN_PLAYERS: usize = 2;

/// Cards dealt to each player at game start.
pub const STARTING_HAND: usize = 4;

/// Starting power by seat; seats past the end use the last value.
pub const STARTING_POWER: [i32; 4] = [0, 1, 2, 3];

/// Chat messages the room retains.
pub const CHAT_CAPACITY: usize = 100;

/// Longest accepted chat message, in characters.
pub const MAX_CHAT_LEN: usize = 500;

/// Room lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Playing,
}

/// Phase, turn counter and active seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMeta {
    pub phase: Phase,
    pub turn: u32,
    pub active_player_id: Option<PlayerId>,
}

/// One chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: PlayerId,
    pub name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// What a departure did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// The last player left; the room should be dropped.
    pub emptied: bool,
    /// Ownership passed to this player.
    pub new_owner: Option<PlayerId>,
}

/// The aggregate root for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub owner_id: PlayerId,
    /// Seats in turn order.
    pub players: Vec<Player>,
    pub meta: GameMeta,
    pub chat: VecDeque<ChatMessage>,
    pub log: ActionLog,
    pub sessions: FateSessions,
}

impl Room {
    /// Opens a room in the lobby with `owner` in the first seat.
    #[must_use]
    pub fn new(id: RoomId, owner: Player) -> Self {
        Self {
            id,
            owner_id: owner.id,
            players: vec![owner],
            meta: GameMeta {
                phase: Phase::Lobby,
                turn: 0,
                active_player_id: None,
            },
            chat: VecDeque::new(),
            log: ActionLog::default(),
            sessions: FateSessions::default(),
        }
    }

    /// Seat index of a player.
    #[must_use]
    pub fn seat(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    /// Looks up a referenced player.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` if the player is not seated here.
    pub fn player(&self, player_id: PlayerId) -> Result<&Player, DomainError> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(DomainError::PlayerNotFound(player_id))
    }

    /// Looks up a referenced player mutably.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` if the player is not seated here.
    pub fn player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(DomainError::PlayerNotFound(player_id))
    }

    /// Looks up the requester.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotInRoom` if the requester is not seated here.
    pub fn actor_mut(&mut self, actor: PlayerId) -> Result<&mut Player, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == actor)
            .ok_or(DomainError::NotInRoom)
    }

    /// Display name of a player, if still seated.
    #[must_use]
    pub fn name_of(&self, player_id: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.as_str())
    }

    /// Requires a seated requester in a running game.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom` or `NotPlaying`.
    pub fn require_playing(&self, actor: PlayerId) -> Result<(), DomainError> {
        if self.seat(actor).is_none() {
            return Err(DomainError::NotInRoom);
        }
        if self.meta.phase != Phase::Playing {
            return Err(DomainError::NotPlaying);
        }
        Ok(())
    }

    /// Requires the requester to hold the turn.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotPlaying` or `NotYourTurn`.
    pub fn require_active(&self, actor: PlayerId) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        if self.meta.active_player_id != Some(actor) {
            return Err(DomainError::NotYourTurn);
        }
        Ok(())
    }

    fn require_lobby(&self, actor: PlayerId) -> Result<(), DomainError> {
        if self.seat(actor).is_none() {
            return Err(DomainError::NotInRoom);
        }
        if self.meta.phase != Phase::Lobby {
            return Err(DomainError::NotInLobby);
        }
        Ok(())
    }

    /// Appends an action entry stamped by `clock`.
    pub(crate) fn record(&mut self, actor: PlayerId, action: ActionKind, clock: &dyn Clock) -> u64 {
        self.log.append(actor, action, clock.now())
    }

    /// Seats a joining player.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyStarted`, `RoomFull` or `AlreadyInRoom`.
    pub fn join(&mut self, player: Player) -> Result<(), DomainError> {
        if self.meta.phase != Phase::Lobby {
            return Err(DomainError::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(DomainError::RoomFull);
        }
        if self.seat(player.id).is_some() {
            return Err(DomainError::AlreadyInRoom);
        }
        self.players.push(player);
        Ok(())
    }

    /// Removes a player, handing over the owner and active roles.
    ///
    /// Fate sessions the leaver owns are cancelled; sessions targeting the
    /// leaver are dropped along with the leaver's cards.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotInRoom` if the player is not seated here.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<Departure, DomainError> {
        let seat = self.seat(player_id).ok_or(DomainError::NotInRoom)?;
        self.release_sessions(player_id);
        self.players.remove(seat);

        let mut new_owner = None;
        if self.owner_id == player_id {
            if let Some(first) = self.players.first() {
                self.owner_id = first.id;
                new_owner = Some(first.id);
            }
        }
        if self.meta.active_player_id == Some(player_id) {
            let won: Vec<bool> = self.players.iter().map(|p| p.won).collect();
            let handoff = next_active(&won, None);
            self.meta.active_player_id = handoff.next.map(|i| self.players[i].id);
        }
        Ok(Departure {
            emptied: self.players.is_empty(),
            new_owner,
        })
    }

    /// Picks a character for the requester, clearing readiness on change.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotInLobby`, `CharacterNotFound` or
    /// `CharacterTaken`.
    pub fn choose_character(
        &mut self,
        actor: PlayerId,
        character_id: &str,
        catalog: &dyn CharacterCatalog,
    ) -> Result<(), DomainError> {
        self.require_lobby(actor)?;
        let character = catalog
            .character(character_id)
            .ok_or_else(|| DomainError::CharacterNotFound(character_id.to_owned()))?;
        let taken = self
            .players
            .iter()
            .any(|p| p.id != actor && p.character_id.as_deref() == Some(character_id));
        if taken {
            return Err(DomainError::CharacterTaken(character_id.to_owned()));
        }
        let player = self.actor_mut(actor)?;
        if player.character_id.as_deref() != Some(character_id) {
            player.character_id = Some(character.id.clone());
            player.hand_policy = character.hand_visibility;
            player.ready = false;
        }
        Ok(())
    }

    /// Sets the requester's readiness.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotInLobby` or `CharacterNotChosen`.
    pub fn set_ready(&mut self, actor: PlayerId, ready: bool) -> Result<(), DomainError> {
        self.require_lobby(actor)?;
        let player = self.actor_mut(actor)?;
        if ready && player.character_id.is_none() {
            return Err(DomainError::CharacterNotChosen);
        }
        player.ready = ready;
        Ok(())
    }

    /// Deals every seat and moves the room into play.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `AlreadyStarted`, `OwnerOnly`, `NotEnoughPlayers`,
    /// `PlayersNotReady` or `CharacterNotFound`.
    pub fn start(
        &mut self,
        actor: PlayerId,
        catalog: &dyn CharacterCatalog,
        rng: &mut dyn DeterministicRng,
    ) -> Result<(), DomainError> {
        if self.seat(actor).is_none() {
            return Err(DomainError::NotInRoom);
        }
        if self.meta.phase != Phase::Lobby {
            return Err(DomainError::AlreadyStarted);
        }
        if self.owner_id != actor {
            return Err(DomainError::OwnerOnly);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(DomainError::NotEnoughPlayers(MIN_PLAYERS));
        }
        if !self.players.iter().all(|p| p.ready) {
            return Err(DomainError::PlayersNotReady);
        }
        let characters = self
            .players
            .iter()
            .map(|p| {
                let id = p.character_id.as_deref().ok_or(DomainError::PlayersNotReady)?;
                catalog
                    .character(id)
                    .ok_or_else(|| DomainError::CharacterNotFound(id.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (seat, (player, character)) in self.players.iter_mut().zip(characters).enumerate() {
            let power = STARTING_POWER[seat.min(STARTING_POWER.len() - 1)];
            player.deal(character, power, STARTING_HAND, rng);
        }
        self.log.clear();
        self.sessions = FateSessions::default();
        self.meta = GameMeta {
            phase: Phase::Playing,
            turn: 1,
            active_player_id: self.players.first().map(|p| p.id),
        };
        info!(room_id = %self.id, players = self.players.len(), "game started");
        Ok(())
    }

    /// Ends the requester's turn.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotPlaying` or `NotYourTurn`.
    pub fn end_turn(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<Advance, DomainError> {
        self.require_active(actor)?;
        let advance = self.advance_from(self.seat(actor));
        self.record(
            actor,
            ActionKind::EndTurn {
                next_player_id: self.meta.active_player_id,
                wrapped: advance.wrapped,
            },
            clock,
        );
        Ok(advance)
    }

    /// Declares victory for the requester; the turn moves on if it was theirs.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, `NotPlaying` or `NoChange` if already won.
    pub fn claim_win(&mut self, actor: PlayerId, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_playing(actor)?;
        let player = self.actor_mut(actor)?;
        if player.won {
            return Err(DomainError::NoChange);
        }
        player.won = true;
        if self.meta.active_player_id == Some(actor) {
            self.advance_from(self.seat(actor));
        }
        self.record(actor, ActionKind::ClaimWin, clock);
        info!(room_id = %self.id, player_id = %actor, "victory claimed");
        Ok(())
    }

    fn advance_from(&mut self, current: Option<usize>) -> Advance {
        let won: Vec<bool> = self.players.iter().map(|p| p.won).collect();
        let advance = next_active(&won, current);
        self.meta.active_player_id = advance.next.map(|i| self.players[i].id);
        if advance.wrapped {
            self.meta.turn += 1;
        }
        info!(
            room_id = %self.id,
            turn = self.meta.turn,
            active_player_id = ?self.meta.active_player_id,
            "turn advanced"
        );
        advance
    }

    /// Appends a chat line from the requester.
    ///
    /// # Errors
    ///
    /// Returns `NotInRoom`, or `Validation` if the trimmed text is empty or
    /// too long.
    pub fn post_chat(
        &mut self,
        actor: PlayerId,
        text: &str,
        clock: &dyn Clock,
    ) -> Result<ChatMessage, DomainError> {
        let name = self.name_of(actor).ok_or(DomainError::NotInRoom)?.to_owned();
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_CHAT_LEN {
            return Err(DomainError::Validation(format!(
                "chat text must be 1 to {MAX_CHAT_LEN} characters"
            )));
        }
        let message = ChatMessage {
            player_id: actor,
            name,
            text: text.to_owned(),
            timestamp: clock.now(),
        };
        self.chat.push_back(message.clone());
        while self.chat.len() > CHAT_CAPACITY {
            self.chat.pop_front();
        }
        Ok(message)
    }

    /// Mutable access to a card held anywhere by any player.
    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.players.iter_mut().find_map(|p| p.card_mut(card_id))
    }

    /// Every card in the room, including cards held by open fate sessions.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.players
            .iter()
            .flat_map(Player::cards)
            .chain(self.sessions.cards())
    }
}
