//! Inbound requests.
//!
//! Requests arrive as `{event, data}` pairs and decode into one closed
//! [`RoomRequest`] enum. Omitted `data` is treated as an empty object.

use fateline_core::command::Command;
use fateline_core::error::DomainError;
use serde::Deserialize;
use serde_json::Value;

use super::cards::CardId;
use super::player::PlayerId;
use super::room::RoomId;

/// A request from one connected player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum RoomRequest {
    #[serde(rename = "room:create")]
    CreateRoom { name: String },
    #[serde(rename = "room:join")]
    JoinRoom { room_id: RoomId, name: String },
    #[serde(rename = "room:leave")]
    LeaveRoom {},

    #[serde(rename = "lobby:chooseCharacter")]
    ChooseCharacter { character_id: String },
    #[serde(rename = "lobby:setReady")]
    SetReady { ready: bool },
    #[serde(rename = "lobby:start")]
    StartGame {},

    #[serde(rename = "game:endTurn")]
    EndTurn {},
    #[serde(rename = "game:draw")]
    Draw {
        #[serde(default)]
        count: Option<usize>,
    },
    #[serde(rename = "game:playToLocation")]
    PlayToLocation {
        card_id: CardId,
        location_index: usize,
    },
    #[serde(rename = "game:discard")]
    Discard {
        #[serde(default)]
        card_id: Option<CardId>,
        #[serde(default)]
        card_ids: Option<Vec<CardId>>,
    },
    #[serde(rename = "game:moveCard")]
    MoveCard {
        card_id: CardId,
        from: usize,
        to: usize,
    },
    #[serde(rename = "game:removeCard")]
    RemoveCard {
        card_id: CardId,
        from: usize,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "game:reshuffleDeck")]
    ReshuffleDeck {},
    #[serde(rename = "game:claimWin")]
    ClaimWin {},
    #[serde(rename = "game:playEffect")]
    PlayEffect { card_id: CardId },
    #[serde(rename = "game:spawnToken")]
    SpawnToken {
        token_id: String,
        location_index: usize,
    },

    #[serde(rename = "log:undoSelf")]
    UndoSelf {},
    #[serde(rename = "power:change")]
    ChangePower { delta: i32 },
    #[serde(rename = "trust:change")]
    ChangeTrust { delta: i32 },
    #[serde(rename = "pawn:set")]
    SetPawn { to: usize },
    #[serde(rename = "board:toggleLocationLock")]
    ToggleLocationLock {
        index: usize,
        #[serde(default)]
        locked: Option<bool>,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "board:toggleCardLock")]
    ToggleCardLock {
        card_id: CardId,
        #[serde(default)]
        locked: Option<bool>,
    },
    #[serde(rename = "card:deltaStrength")]
    DeltaStrength { card_id: CardId, delta: i32 },
    #[serde(rename = "hand:setVisible")]
    SetHandVisible { visible: bool },

    #[serde(rename = "fate:start")]
    FateStart { target_id: PlayerId },
    #[serde(rename = "fate:cancel")]
    FateCancel {},
    #[serde(rename = "fate:choosePlay")]
    FateChoose { card_id: CardId },
    #[serde(rename = "fate:placeSelected")]
    FatePlaceSelected { location_index: usize },
    #[serde(rename = "fate:discardSelected")]
    FateDiscardSelected {},
    #[serde(rename = "fate:discardBoth")]
    FateDiscardBoth {},
    #[serde(rename = "fate:startFromDiscard")]
    FateStartFromDiscard { target_id: PlayerId, card_id: CardId },
    #[serde(rename = "fate:getDiscard")]
    FateGetDiscard {
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "fate:reshuffleDeck")]
    FateReshuffle {
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "fate:returnFromDiscard")]
    FateReturnFromDiscard { target_id: PlayerId, card_id: CardId },

    #[serde(rename = "fatePeek:start")]
    PeekStart { target_id: PlayerId, count: usize },
    #[serde(rename = "fatePeek:confirm")]
    PeekConfirm { order_ids: Vec<CardId> },
    #[serde(rename = "fatePeek:cancel")]
    PeekCancel {},

    #[serde(rename = "fateSift:start")]
    SiftStart {
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "fateSift:choose")]
    SiftChoose { discard_id: CardId },
    #[serde(rename = "fateSift:cancel")]
    SiftCancel {},

    #[serde(rename = "pile:getDiscard")]
    GetDiscard {
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    #[serde(rename = "pile:takeFromDiscard")]
    TakeFromDiscard { card_id: CardId },

    #[serde(rename = "meta:getCharacters")]
    GetCharacters {},
    #[serde(rename = "chat:send")]
    SendChat { text: String },
    #[serde(rename = "chat:history")]
    ChatHistory {},
}

impl RoomRequest {
    /// Decodes an `{event, data}` pair.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unknown event or a payload
    /// that does not fit it.
    pub fn from_parts(event: &str, data: Value) -> Result<Self, DomainError> {
        let data = if data.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            data
        };
        let frame = serde_json::json!({ "event": event, "data": data });
        serde_json::from_value(frame)
            .map_err(|e| DomainError::Validation(format!("{event}: {e}")))
    }

    /// The cards a discard request names, whichever field carried them.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when neither field is set.
    pub fn discard_ids(
        card_id: Option<CardId>,
        card_ids: Option<Vec<CardId>>,
    ) -> Result<Vec<CardId>, DomainError> {
        match (card_ids, card_id) {
            (Some(ids), _) => Ok(ids),
            (None, Some(id)) => Ok(vec![id]),
            (None, None) => Err(DomainError::Validation(
                "game:discard needs cardId or cardIds".to_owned(),
            )),
        }
    }
}

impl Command for RoomRequest {
    fn command_type(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "room:create",
            Self::JoinRoom { .. } => "room:join",
            Self::LeaveRoom {} => "room:leave",
            Self::ChooseCharacter { .. } => "lobby:chooseCharacter",
            Self::SetReady { .. } => "lobby:setReady",
            Self::StartGame {} => "lobby:start",
            Self::EndTurn {} => "game:endTurn",
            Self::Draw { .. } => "game:draw",
            Self::PlayToLocation { .. } => "game:playToLocation",
            Self::Discard { .. } => "game:discard",
            Self::MoveCard { .. } => "game:moveCard",
            Self::RemoveCard { .. } => "game:removeCard",
            Self::ReshuffleDeck {} => "game:reshuffleDeck",
            Self::ClaimWin {} => "game:claimWin",
            Self::PlayEffect { .. } => "game:playEffect",
            Self::SpawnToken { .. } => "game:spawnToken",
            Self::UndoSelf {} => "log:undoSelf",
            Self::ChangePower { .. } => "power:change",
            Self::ChangeTrust { .. } => "trust:change",
            Self::SetPawn { .. } => "pawn:set",
            Self::ToggleLocationLock { .. } => "board:toggleLocationLock",
            Self::ToggleCardLock { .. } => "board:toggleCardLock",
            Self::DeltaStrength { .. } => "card:deltaStrength",
            Self::SetHandVisible { .. } => "hand:setVisible",
            Self::FateStart { .. } => "fate:start",
            Self::FateCancel {} => "fate:cancel",
            Self::FateChoose { .. } => "fate:choosePlay",
            Self::FatePlaceSelected { .. } => "fate:placeSelected",
            Self::FateDiscardSelected {} => "fate:discardSelected",
            Self::FateDiscardBoth {} => "fate:discardBoth",
            Self::FateStartFromDiscard { .. } => "fate:startFromDiscard",
            Self::FateGetDiscard { .. } => "fate:getDiscard",
            Self::FateReshuffle { .. } => "fate:reshuffleDeck",
            Self::FateReturnFromDiscard { .. } => "fate:returnFromDiscard",
            Self::PeekStart { .. } => "fatePeek:start",
            Self::PeekConfirm { .. } => "fatePeek:confirm",
            Self::PeekCancel {} => "fatePeek:cancel",
            Self::SiftStart { .. } => "fateSift:start",
            Self::SiftChoose { .. } => "fateSift:choose",
            Self::SiftCancel {} => "fateSift:cancel",
            Self::GetDiscard { .. } => "pile:getDiscard",
            Self::TakeFromDiscard { .. } => "pile:takeFromDiscard",
            Self::GetCharacters {} => "meta:getCharacters",
            Self::SendChat { .. } => "chat:send",
            Self::ChatHistory {} => "chat:history",
        }
    }

    fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::GetCharacters {}
                | Self::GetDiscard { .. }
                | Self::FateGetDiscard { .. }
                | Self::ChatHistory {}
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_decodes_camel_case_payload() {
        let card_id = Uuid::new_v4();

        let request = RoomRequest::from_parts(
            "game:playToLocation",
            json!({ "cardId": card_id, "locationIndex": 2 }),
        )
        .unwrap();

        assert_eq!(
            request,
            RoomRequest::PlayToLocation {
                card_id,
                location_index: 2
            }
        );
        assert_eq!(request.command_type(), "game:playToLocation");
    }

    #[test]
    fn test_missing_data_means_empty_payload() {
        assert_eq!(
            RoomRequest::from_parts("game:endTurn", Value::Null).unwrap(),
            RoomRequest::EndTurn {}
        );
        assert_eq!(
            RoomRequest::from_parts("game:draw", Value::Null).unwrap(),
            RoomRequest::Draw { count: None }
        );
    }

    #[test]
    fn test_unknown_event_is_a_validation_error() {
        let result = RoomRequest::from_parts("game:flip", json!({}));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_bad_payload_is_a_validation_error() {
        let result = RoomRequest::from_parts("power:change", json!({ "delta": "lots" }));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_discard_accepts_either_field() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(RoomRequest::discard_ids(Some(a), None), Ok(vec![a]));
        assert_eq!(
            RoomRequest::discard_ids(Some(a), Some(vec![b, a])),
            Ok(vec![b, a])
        );
        assert!(RoomRequest::discard_ids(None, None).is_err());
    }

    #[test]
    fn test_reads_are_not_mutating() {
        assert!(!RoomRequest::GetCharacters {}.is_mutating());
        assert!(!RoomRequest::ChatHistory {}.is_mutating());
        assert!(RoomRequest::UndoSelf {}.is_mutating());
    }
}
