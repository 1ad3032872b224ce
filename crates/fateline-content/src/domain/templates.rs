//! Template types for characters, cards and locations.

use serde::{Deserialize, Serialize};

/// Closed set of card type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Ally,
    Item,
    Condition,
    Effect,
    Hero,
    Guardian,
    Curse,
    Token,
}

/// Location affordances. Used only for display and availability hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAction {
    GainPower,
    PlayCard,
    Activate,
    Fate,
    MoveItemOrAlly,
    MoveHero,
    Vanquish,
    Discard,
}

/// Whether a character's hand is shown to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandVisibility {
    /// Hand is private and stays private.
    #[default]
    Hidden,
    /// Hand is public for the whole game.
    Revealed,
    /// The player may toggle visibility.
    Optional,
}

fn one() -> u32 {
    1
}

fn default_top_slots() -> usize {
    2
}

/// A printed card. Expands into `copies` independent instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Template identifier, unique within its deck.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Power cost to play.
    #[serde(default)]
    pub cost: i32,
    /// Printed strength, if any.
    #[serde(default)]
    pub strength: Option<i32>,
    /// Number of copies in the deck.
    #[serde(default = "one")]
    pub copies: u32,
    /// Rules text. Never interpreted by the engine.
    #[serde(default)]
    pub text: String,
}

/// One of the four board locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTemplate {
    /// Location identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Capacity of the public top row.
    #[serde(default = "default_top_slots")]
    pub top_slots: usize,
    /// Displayed affordances.
    #[serde(default)]
    pub actions: Vec<LocationAction>,
    /// Whether the location starts locked.
    #[serde(default)]
    pub locked: bool,
}

/// A playable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    /// Character identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Victory condition text.
    #[serde(default)]
    pub objective: String,
    /// Hand visibility policy.
    #[serde(default)]
    pub hand_visibility: HandVisibility,
    /// Board locations, in board order.
    pub locations: Vec<LocationTemplate>,
    /// Draw deck contents.
    pub deck: Vec<CardTemplate>,
    /// Fate deck contents.
    pub fate: Vec<CardTemplate>,
    /// Companion tokens this character can synthesize.
    #[serde(default)]
    pub tokens: Vec<CardTemplate>,
}

impl CharacterTemplate {
    /// Number of card instances in the draw deck.
    #[must_use]
    pub fn deck_size(&self) -> u32 {
        self.deck.iter().map(|c| c.copies).sum()
    }

    /// Number of card instances in the fate deck.
    #[must_use]
    pub fn fate_size(&self) -> u32 {
        self.fate.iter().map(|c| c.copies).sum()
    }

    /// Looks up a companion token template.
    #[must_use]
    pub fn token(&self, token_id: &str) -> Option<&CardTemplate> {
        self.tokens.iter().find(|t| t.id == token_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_YAML: &str = "id: cutlass\nname: Cutlass\ntype: item\ncost: 1\n";

    #[test]
    fn test_card_template_defaults_apply() {
        let card: CardTemplate = serde_yaml::from_str(CARD_YAML).unwrap();

        assert_eq!(card.card_type, CardType::Item);
        assert_eq!(card.copies, 1);
        assert_eq!(card.strength, None);
        assert!(card.text.is_empty());
    }

    #[test]
    fn test_location_template_defaults_to_two_top_slots() {
        let location: LocationTemplate =
            serde_yaml::from_str("id: dock\nname: The Dock\nactions: [gain_power, fate]\n")
                .unwrap();

        assert_eq!(location.top_slots, 2);
        assert!(!location.locked);
        assert_eq!(
            location.actions,
            vec![LocationAction::GainPower, LocationAction::Fate]
        );
    }

    #[test]
    fn test_deck_size_counts_copies() {
        let card = |copies| CardTemplate {
            id: "c".to_owned(),
            name: "C".to_owned(),
            card_type: CardType::Ally,
            cost: 0,
            strength: Some(1),
            copies,
            text: String::new(),
        };
        let character = CharacterTemplate {
            id: "x".to_owned(),
            name: "X".to_owned(),
            objective: String::new(),
            hand_visibility: HandVisibility::Hidden,
            locations: Vec::new(),
            deck: vec![card(3), card(2)],
            fate: vec![card(4)],
            tokens: Vec::new(),
        };

        assert_eq!(character.deck_size(), 5);
        assert_eq!(character.fate_size(), 4);
        assert!(character.token("c").is_none());
    }
}
