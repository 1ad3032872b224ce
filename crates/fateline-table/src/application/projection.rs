//! Read models pushed to connected players.
//!
//! Projection is a pure function of a [`Room`]: one public snapshot shared
//! by the table, one private snapshot per seat, and the readable action log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::actions::{ActionEntry, ActionKind, FateStep, SessionStep};
use crate::domain::board::Board;
use crate::domain::cards::{Card, CardId};
use crate::domain::fate::LookSession;
use crate::domain::player::{Player, PlayerId};
use crate::domain::room::{ChatMessage, GameMeta, Room, RoomId};
use crate::domain::zones::ZoneCounts;

/// A server-initiated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "room:state")]
    RoomState(PublicRoom),
    #[serde(rename = "room:private")]
    Private(PrivateView),
    #[serde(rename = "log:update")]
    Log(Vec<LogLine>),
    #[serde(rename = "chat:message")]
    Chat(ChatMessage),
    #[serde(rename = "chat:history")]
    ChatHistory(Vec<ChatMessage>),
}

/// An event addressed to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: PlayerId,
    pub event: ServerEvent,
}

/// What every seat may see of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub character_id: Option<String>,
    pub ready: bool,
    pub power: i32,
    pub trust: i32,
    pub won: bool,
    pub hand_visible: bool,
    pub counts: ZoneCounts,
    pub discard_top: Option<Card>,
    pub fate_discard_top: Option<Card>,
    pub board: Board,
    /// Present only while the hand is shown.
    pub hand: Option<Vec<Card>>,
}

/// The open plain fate session. Its cards are face up for everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFate {
    pub owner_id: PlayerId,
    pub target_id: PlayerId,
    pub cards: Vec<Card>,
    pub selected_id: Option<CardId>,
}

/// An open peek or sift, without its cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub owner_id: PlayerId,
    pub target_id: PlayerId,
    pub count: usize,
}

impl From<&LookSession> for SessionSummary {
    fn from(session: &LookSession) -> Self {
        Self {
            owner_id: session.owner_id,
            target_id: session.target_id,
            count: session.cards.len(),
        }
    }
}

/// The table as everyone sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRoom {
    pub room_id: RoomId,
    pub owner_id: PlayerId,
    pub meta: GameMeta,
    pub players: Vec<PublicPlayer>,
    pub fate: Option<PublicFate>,
    pub peek: Option<SessionSummary>,
    pub sift: Option<SessionSummary>,
}

/// What only one seat may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateView {
    pub player_id: PlayerId,
    pub hand: Vec<Card>,
    pub counts: ZoneCounts,
    /// The player's own peek, cards in fate-deck order.
    pub peek: Option<LookSession>,
    /// The player's own sift.
    pub sift: Option<LookSession>,
}

/// One readable action-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub actor_id: PlayerId,
    pub actor_name: String,
    pub kind: &'static str,
    pub text: String,
    pub undone: bool,
}

fn public_player(player: &Player) -> PublicPlayer {
    PublicPlayer {
        id: player.id,
        name: player.name.clone(),
        character_id: player.character_id.clone(),
        ready: player.ready,
        power: player.power,
        trust: player.trust,
        won: player.won,
        hand_visible: player.hand_visible,
        counts: player.zones.counts(),
        discard_top: player.zones.discard.last().cloned(),
        fate_discard_top: player.zones.fate_discard.last().cloned(),
        board: player.board.clone(),
        hand: player.hand_visible.then(|| player.zones.hand.clone()),
    }
}

/// The public snapshot of a room.
#[must_use]
pub fn public_room(room: &Room) -> PublicRoom {
    PublicRoom {
        room_id: room.id,
        owner_id: room.owner_id,
        meta: room.meta,
        players: room.players.iter().map(public_player).collect(),
        fate: room.sessions.fate.as_ref().map(|s| PublicFate {
            owner_id: s.owner_id,
            target_id: s.target_id,
            cards: s.cards.clone(),
            selected_id: s.selected_id,
        }),
        peek: room.sessions.peek.as_ref().map(SessionSummary::from),
        sift: room.sessions.sift.as_ref().map(SessionSummary::from),
    }
}

/// The private snapshot for one seat.
#[must_use]
pub fn private_view(room: &Room, player: &Player) -> PrivateView {
    let own = |slot: &Option<LookSession>| {
        slot.as_ref()
            .filter(|s| s.owner_id == player.id)
            .cloned()
    };
    PrivateView {
        player_id: player.id,
        hand: player.zones.hand.clone(),
        counts: player.zones.counts(),
        peek: own(&room.sessions.peek),
        sift: own(&room.sessions.sift),
    }
}

/// The readable action log, oldest first.
#[must_use]
pub fn log_lines(room: &Room) -> Vec<LogLine> {
    room.log
        .entries()
        .map(|entry| LogLine {
            id: entry.id,
            timestamp: entry.timestamp,
            actor_id: entry.actor_id,
            actor_name: room.name_of(entry.actor_id).unwrap_or("someone").to_owned(),
            kind: entry.action.name(),
            text: describe(room, entry),
            undone: entry.undone,
        })
        .collect()
}

/// Everything to push after a successful mutation, per seat.
#[must_use]
pub fn publish(room: &Room) -> Vec<Delivery> {
    let public = public_room(room);
    let log = log_lines(room);
    room.players
        .iter()
        .flat_map(|player| {
            [
                ServerEvent::RoomState(public.clone()),
                ServerEvent::Private(private_view(room, player)),
                ServerEvent::Log(log.clone()),
            ]
            .map(|event| Delivery {
                recipient: player.id,
                event,
            })
        })
        .collect()
}

fn card_name(room: &Room, card_id: CardId) -> String {
    room.cards()
        .find(|c| c.id == card_id)
        .map_or_else(|| "a card".to_owned(), |c| c.name.clone())
}

fn player_name(room: &Room, player_id: PlayerId) -> &str {
    room.name_of(player_id).unwrap_or("someone")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn describe(room: &Room, entry: &ActionEntry) -> String {
    let actor = player_name(room, entry.actor_id);
    match &entry.action {
        ActionKind::Draw { card_ids, recycled } => {
            let reshuffled = if *recycled { " after reshuffling" } else { "" };
            format!("{actor} drew {}{reshuffled}", plural(card_ids.len(), "card"))
        }
        ActionKind::Play {
            card_id,
            location_index,
            ..
        } => format!(
            "{actor} played {} to location {}",
            card_name(room, *card_id),
            location_index + 1
        ),
        ActionKind::Discard { cards } => {
            format!("{actor} discarded {}", plural(cards.len(), "card"))
        }
        ActionKind::Move {
            card_id, from, to, ..
        } => format!(
            "{actor} moved {} from location {} to {}",
            card_name(room, *card_id),
            from + 1,
            to + 1
        ),
        ActionKind::Remove {
            target_id, card_id, ..
        } => format!(
            "{actor} removed {} from {}'s board",
            card_name(room, *card_id),
            player_name(room, *target_id)
        ),
        ActionKind::Vanquish {
            target_id, card_id, ..
        } => format!(
            "{actor} vanquished {} on {}'s board",
            card_name(room, *card_id),
            player_name(room, *target_id)
        ),
        ActionKind::Retrieve { card_id, .. } => format!(
            "{actor} took {} back from the discard",
            card_name(room, *card_id)
        ),
        ActionKind::Pawn { to, .. } => format!("{actor} moved to location {}", to + 1),
        ActionKind::LocationLock {
            target_id,
            index,
            next,
            ..
        } => format!(
            "{actor} {} location {} of {}",
            if *next { "locked" } else { "unlocked" },
            index + 1,
            player_name(room, *target_id)
        ),
        ActionKind::CardLock { card_id, next, .. } => format!(
            "{actor} {} {}",
            if *next { "locked" } else { "unlocked" },
            card_name(room, *card_id)
        ),
        ActionKind::Strength {
            card_id, prev, next, ..
        } => format!(
            "{actor} changed {}'s strength {prev:+} to {next:+}",
            card_name(room, *card_id)
        ),
        ActionKind::PlayEffect { card_id, .. } => {
            format!("{actor} played {}", card_name(room, *card_id))
        }
        ActionKind::FateReturn { target_id, .. } => format!(
            "{actor} returned a card to {}'s fate deck",
            player_name(room, *target_id)
        ),
        ActionKind::Power { prev, next } => format!("{actor} power {prev} to {next}"),
        ActionKind::Trust { prev, next } => format!("{actor} trust {prev} to {next}"),
        ActionKind::HandVisibility { visible } => format!(
            "{actor} {} their hand",
            if *visible { "revealed" } else { "hid" }
        ),
        ActionKind::Reshuffle { moved } => format!(
            "{actor} shuffled {} into their deck",
            plural(*moved, "card")
        ),
        ActionKind::FateReshuffle { target_id, moved } => format!(
            "{actor} shuffled {} into {}'s fate deck",
            plural(*moved, "card"),
            player_name(room, *target_id)
        ),
        ActionKind::EndTurn { next_player_id, .. } => match next_player_id {
            Some(next) => format!(
                "{actor} ended their turn; {} is up",
                player_name(room, *next)
            ),
            None => format!("{actor} ended their turn"),
        },
        ActionKind::ClaimWin => format!("{actor} claimed victory"),
        ActionKind::SpawnToken {
            card_id,
            location_index,
            ..
        } => format!(
            "{actor} created {} at location {}",
            card_name(room, *card_id),
            location_index + 1
        ),
        ActionKind::Fate { target_id, step } => {
            describe_fate(room, actor, player_name(room, *target_id), step)
        }
        ActionKind::Peek {
            target_id,
            count,
            step,
        } => {
            let target = player_name(room, *target_id);
            match step {
                SessionStep::Started => format!(
                    "{actor} is peeking at {} of {target}'s fate deck",
                    plural(*count, "card")
                ),
                SessionStep::Resolved => format!("{actor} reordered {target}'s fate deck"),
                SessionStep::Cancelled => format!("{actor} stopped peeking"),
            }
        }
        ActionKind::Sift { target_id, step } => {
            let target = player_name(room, *target_id);
            match step {
                SessionStep::Started => format!("{actor} is sifting {target}'s fate deck"),
                SessionStep::Resolved => format!("{actor} sifted {target}'s fate deck"),
                SessionStep::Cancelled => format!("{actor} stopped sifting"),
            }
        }
        ActionKind::Undo { undone_id } => format!("{actor} undid action #{undone_id}"),
    }
}

fn describe_fate(room: &Room, actor: &str, target: &str, step: &FateStep) -> String {
    match step {
        FateStep::Started { drawn, .. } => format!(
            "{actor} drew {} from {target}'s fate deck",
            plural(*drawn, "fate card")
        ),
        FateStep::StartedFromDiscard { card_id } => format!(
            "{actor} took {} from {target}'s fate discard",
            card_name(room, *card_id)
        ),
        FateStep::Selected { card_id } => {
            format!("{actor} chose {}", card_name(room, *card_id))
        }
        FateStep::Placed {
            card_id,
            location_index,
        } => format!(
            "{actor} placed {} at {target}'s location {}",
            card_name(room, *card_id),
            location_index + 1
        ),
        FateStep::DiscardedSelected { card_id } => {
            format!("{actor} discarded {}", card_name(room, *card_id))
        }
        FateStep::DiscardedBoth => format!("{actor} discarded both fate cards"),
        FateStep::Cancelled => format!("{actor} put the fate cards back"),
    }
}
