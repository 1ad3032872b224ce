//! The bounded action log.
//!
//! Every mutating game request appends one [`ActionEntry`] whose
//! [`ActionKind`] payload carries what the undo engine needs to invert it.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cards::CardId;
use super::player::PlayerId;

/// Number of entries the log retains.
pub const LOG_CAPACITY: usize = 25;

/// A card leaving the hand, with the hand index it left from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandCard {
    pub card_id: CardId,
    pub hand_index: usize,
}

/// Steps of a plain fate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FateStep {
    Started { drawn: usize, recycled: bool },
    StartedFromDiscard { card_id: CardId },
    Selected { card_id: CardId },
    Placed { card_id: CardId, location_index: usize },
    DiscardedSelected { card_id: CardId },
    DiscardedBoth,
    Cancelled,
}

/// Steps shared by peek and sift sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    Started,
    Resolved,
    Cancelled,
}

/// Closed set of logged action kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ActionKind {
    Draw {
        card_ids: Vec<CardId>,
        recycled: bool,
    },
    Play {
        card_id: CardId,
        location_index: usize,
        hand_index: usize,
    },
    Discard {
        cards: Vec<HandCard>,
    },
    Move {
        card_id: CardId,
        from: usize,
        to: usize,
        from_index: usize,
    },
    Remove {
        target_id: PlayerId,
        card_id: CardId,
        from: usize,
        from_index: usize,
    },
    Vanquish {
        target_id: PlayerId,
        card_id: CardId,
        from: usize,
    },
    Retrieve {
        card_id: CardId,
        discard_index: usize,
    },
    Pawn {
        from: usize,
        to: usize,
    },
    LocationLock {
        target_id: PlayerId,
        index: usize,
        prev: bool,
        next: bool,
    },
    CardLock {
        card_id: CardId,
        prev: bool,
        next: bool,
    },
    Strength {
        card_id: CardId,
        prev: i32,
        next: i32,
    },
    PlayEffect {
        card_id: CardId,
        hand_index: usize,
    },
    FateReturn {
        target_id: PlayerId,
        card_id: CardId,
        discard_index: usize,
    },
    Power {
        prev: i32,
        next: i32,
    },
    Trust {
        prev: i32,
        next: i32,
    },
    HandVisibility {
        visible: bool,
    },
    Reshuffle {
        moved: usize,
    },
    FateReshuffle {
        target_id: PlayerId,
        moved: usize,
    },
    EndTurn {
        next_player_id: Option<PlayerId>,
        wrapped: bool,
    },
    ClaimWin,
    SpawnToken {
        card_id: CardId,
        token_id: String,
        location_index: usize,
    },
    Fate {
        target_id: PlayerId,
        step: FateStep,
    },
    Peek {
        target_id: PlayerId,
        count: usize,
        step: SessionStep,
    },
    Sift {
        target_id: PlayerId,
        step: SessionStep,
    },
    Undo {
        undone_id: u64,
    },
}

impl ActionKind {
    /// The snake-case kind label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draw { .. } => "draw",
            Self::Play { .. } => "play",
            Self::Discard { .. } => "discard",
            Self::Move { .. } => "move",
            Self::Remove { .. } => "remove",
            Self::Vanquish { .. } => "vanquish",
            Self::Retrieve { .. } => "retrieve",
            Self::Pawn { .. } => "pawn",
            Self::LocationLock { .. } => "location_lock",
            Self::CardLock { .. } => "card_lock",
            Self::Strength { .. } => "strength",
            Self::PlayEffect { .. } => "play_effect",
            Self::FateReturn { .. } => "fate_return",
            Self::Power { .. } => "power",
            Self::Trust { .. } => "trust",
            Self::HandVisibility { .. } => "hand_visibility",
            Self::Reshuffle { .. } => "reshuffle",
            Self::FateReshuffle { .. } => "fate_reshuffle",
            Self::EndTurn { .. } => "end_turn",
            Self::ClaimWin => "claim_win",
            Self::SpawnToken { .. } => "spawn_token",
            Self::Fate { .. } => "fate",
            Self::Peek { .. } => "peek",
            Self::Sift { .. } => "sift",
            Self::Undo { .. } => "undo",
        }
    }
}

/// One logged mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub actor_id: PlayerId,
    pub action: ActionKind,
    /// Set once the entry has been undone.
    pub undone: bool,
}

/// FIFO of the most recent [`LOG_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    entries: VecDeque<ActionEntry>,
    next_id: u64,
}

impl ActionLog {
    /// Appends an entry, dropping the oldest beyond capacity. Returns its id.
    pub fn append(&mut self, actor_id: PlayerId, action: ActionKind, at: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push_back(ActionEntry {
            id,
            timestamp: at,
            actor_id,
            action,
            undone: false,
        });
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
        id
    }

    /// The most recent entry that is not itself an undo.
    #[must_use]
    pub fn last_undoable(&self) -> Option<&ActionEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| !matches!(e.action, ActionKind::Undo { .. }))
    }

    /// Marks an entry undone.
    pub fn mark_undone(&mut self, id: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.undone = true;
        }
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Ids keep increasing.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
