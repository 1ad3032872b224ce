//! Domain error types.
//!
//! Every failure in the engine is an expected, user-visible outcome. Each
//! variant carries a stable machine code returned to clients as
//! `{ok: false, error: <code>}`.

use thiserror::Error;
use uuid::Uuid;

/// Broad classes of request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The requester may not perform the request.
    Authorization,
    /// The room or card state does not allow the request.
    Precondition,
    /// A pile the request needs is empty.
    ResourceEmpty,
    /// An undo request could not be honored.
    Undo,
    /// A fate session conflict.
    Session,
    /// Malformed input.
    Validation,
    /// A server-side fault.
    Internal,
}

/// Why an action kind can never be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoRefusal {
    /// Power changes are final.
    Power,
    /// Shuffling destroys the previous order.
    Reshuffle,
    /// The action kind has no inverse.
    Unsupported(&'static str),
}

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No room with this id exists.
    #[error("room not found: {0}")]
    RoomNotFound(Uuid),

    /// The requester is not seated in a room.
    #[error("player is not in a room")]
    NotInRoom,

    /// Only the active player may do this.
    #[error("it is not your turn")]
    NotYourTurn,

    /// Only the room owner may do this.
    #[error("only the room owner can do that")]
    OwnerOnly,

    /// The requester is already seated in a room.
    #[error("player is already in a room")]
    AlreadyInRoom,

    /// The room has no free seat.
    #[error("room is full")]
    RoomFull,

    /// The room has left the lobby.
    #[error("game already started")]
    AlreadyStarted,

    /// The room is not in the lobby phase.
    #[error("room is not in the lobby")]
    NotInLobby,

    /// The room is not playing.
    #[error("game is not in progress")]
    NotPlaying,

    /// The catalog has no such character.
    #[error("character not found: {0}")]
    CharacterNotFound(String),

    /// Another seat already chose this character.
    #[error("character already taken: {0}")]
    CharacterTaken(String),

    /// The player has not chosen a character.
    #[error("choose a character first")]
    CharacterNotChosen,

    /// The room needs more players to start.
    #[error("at least {0} players are needed to start")]
    NotEnoughPlayers(usize),

    /// Some players are not ready.
    #[error("not every player is ready")]
    PlayersNotReady,

    /// A referenced player is not seated in this room.
    #[error("player not found: {0}")]
    PlayerNotFound(Uuid),

    /// The location index is out of range.
    #[error("bad location index: {0}")]
    BadLocationIndex(usize),

    /// The location is locked.
    #[error("location {0} is locked")]
    LocationLocked(usize),

    /// The location's top row is full.
    #[error("location {0} has no free slot")]
    LocationFull(usize),

    /// The card is locked in place.
    #[error("card {0} is locked")]
    CardLocked(Uuid),

    /// The card is not where the request expects it.
    #[error("card not found: {0}")]
    CardNotFound(Uuid),

    /// The character has no companion token with this id.
    #[error("token not found: {0}")]
    TokenNotFound(String),

    /// The character's hand visibility cannot be changed.
    #[error("hand visibility is fixed for this character")]
    HandVisibilityFixed,

    /// The request would not change anything.
    #[error("no change")]
    NoChange,

    /// The draw deck and its discard are both empty.
    #[error("deck is empty")]
    DeckEmpty,

    /// The discard pile is empty.
    #[error("discard pile is empty")]
    DiscardEmpty,

    /// The fate deck (and, where it recycles, its discard) is empty.
    #[error("fate deck is empty")]
    FateDeckEmpty,

    /// The fate discard pile is empty.
    #[error("fate discard pile is empty")]
    FateDiscardEmpty,

    /// The action log holds nothing to undo.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The last action belongs to another player.
    #[error("the last action is not yours")]
    NotYourLastAction,

    /// The last action was already undone.
    #[error("the last action was already undone")]
    AlreadyUndone,

    /// The inverse precondition no longer holds.
    #[error("cannot undo: {0}")]
    CannotUndoStateChanged(String),

    /// The action kind is never undoable.
    #[error("cannot undo {}", refusal_label(.0))]
    CannotUndo(UndoRefusal),

    /// Another player holds the session of this kind.
    #[error("another player has a session of this kind open")]
    AnotherSessionActive,

    /// The requester already holds the session of this kind.
    #[error("you already have a session of this kind open")]
    SessionAlreadyOpen,

    /// No session of this kind is open.
    #[error("no active session")]
    NoActiveSession,

    /// The fate session has no selected card.
    #[error("no card selected")]
    NothingSelected,

    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A server-side fault.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

fn refusal_label(refusal: &UndoRefusal) -> &'static str {
    match refusal {
        UndoRefusal::Power => "power changes",
        UndoRefusal::Reshuffle => "reshuffles",
        UndoRefusal::Unsupported(kind) => kind,
    }
}

impl DomainError {
    /// Stable machine-readable code for the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "room_not_found",
            Self::NotInRoom => "not_in_room",
            Self::NotYourTurn => "not_your_turn",
            Self::OwnerOnly => "owner_only",
            Self::AlreadyInRoom => "already_in_room",
            Self::RoomFull => "room_full",
            Self::AlreadyStarted => "already_started",
            Self::NotInLobby => "not_in_lobby",
            Self::NotPlaying => "not_playing",
            Self::CharacterNotFound(_) => "character_not_found",
            Self::CharacterTaken(_) => "character_taken",
            Self::CharacterNotChosen => "character_not_chosen",
            Self::NotEnoughPlayers(_) => "not_enough_players",
            Self::PlayersNotReady => "players_not_ready",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::BadLocationIndex(_) => "bad_location_index",
            Self::LocationLocked(_) => "location_locked",
            Self::LocationFull(_) => "location_full",
            Self::CardLocked(_) => "card_locked",
            Self::CardNotFound(_) => "card_not_found",
            Self::TokenNotFound(_) => "token_not_found",
            Self::HandVisibilityFixed => "hand_visibility_fixed",
            Self::NoChange => "no_change",
            Self::DeckEmpty => "deck_empty",
            Self::DiscardEmpty => "discard_empty",
            Self::FateDeckEmpty => "fate_deck_empty",
            Self::FateDiscardEmpty => "fate_discard_empty",
            Self::NothingToUndo => "nothing_to_undo",
            Self::NotYourLastAction => "not_your_last_action",
            Self::AlreadyUndone => "already_undone",
            Self::CannotUndoStateChanged(_) => "cannot_undo_state_changed",
            Self::CannotUndo(UndoRefusal::Power) => "cannot_undo_power",
            Self::CannotUndo(UndoRefusal::Reshuffle) => "cannot_undo_reshuffle",
            Self::CannotUndo(UndoRefusal::Unsupported(_)) => "cannot_undo_unsupported",
            Self::AnotherSessionActive => "another_session_active",
            Self::SessionAlreadyOpen => "session_already_open",
            Self::NoActiveSession => "no_active_session",
            Self::NothingSelected => "nothing_selected",
            Self::Validation(_) => "invalid_request",
            Self::Infrastructure(_) => "internal_error",
        }
    }

    /// The class this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RoomNotFound(_) | Self::NotInRoom | Self::NotYourTurn | Self::OwnerOnly => {
                ErrorCategory::Authorization
            }
            Self::DeckEmpty | Self::DiscardEmpty | Self::FateDeckEmpty | Self::FateDiscardEmpty => {
                ErrorCategory::ResourceEmpty
            }
            Self::NothingToUndo
            | Self::NotYourLastAction
            | Self::AlreadyUndone
            | Self::CannotUndoStateChanged(_)
            | Self::CannotUndo(_) => ErrorCategory::Undo,
            Self::AnotherSessionActive
            | Self::SessionAlreadyOpen
            | Self::NoActiveSession
            | Self::NothingSelected => ErrorCategory::Session,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Infrastructure(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Precondition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_distinguish_undo_refusals() {
        assert_eq!(
            DomainError::CannotUndo(UndoRefusal::Reshuffle).code(),
            "cannot_undo_reshuffle"
        );
        assert_eq!(
            DomainError::CannotUndo(UndoRefusal::Power).code(),
            "cannot_undo_power"
        );
        assert_eq!(
            DomainError::CannotUndo(UndoRefusal::Unsupported("end_turn")).code(),
            "cannot_undo_unsupported"
        );
    }

    #[test]
    fn test_cannot_undo_message_names_the_kind() {
        let err = DomainError::CannotUndo(UndoRefusal::Unsupported("spawn_token"));
        assert_eq!(err.to_string(), "cannot undo spawn_token");
        assert_eq!(
            DomainError::CannotUndo(UndoRefusal::Reshuffle).to_string(),
            "cannot undo reshuffles"
        );
    }

    #[test]
    fn test_categories_follow_taxonomy() {
        assert_eq!(
            DomainError::NotYourTurn.category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            DomainError::LocationLocked(0).category(),
            ErrorCategory::Precondition
        );
        assert_eq!(
            DomainError::FateDeckEmpty.category(),
            ErrorCategory::ResourceEmpty
        );
        assert_eq!(DomainError::AlreadyUndone.category(), ErrorCategory::Undo);
        assert_eq!(
            DomainError::AnotherSessionActive.category(),
            ErrorCategory::Session
        );
        assert_eq!(
            DomainError::Infrastructure("poisoned".into()).category(),
            ErrorCategory::Internal
        );
    }
}
