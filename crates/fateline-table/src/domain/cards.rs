//! Card instances.

use fateline_content::domain::templates::{CardTemplate, CardType};
use serde::Serialize;
use uuid::Uuid;

/// Identity of one card instance.
pub type CardId = Uuid;

/// Largest absolute strength modifier a card may carry.
pub const MAX_STRENGTH_MODIFIER: i32 = 20;

/// Largest strength change a single request may apply.
pub const STRENGTH_STEP_LIMIT: i32 = 5;

/// Face orientation. A visibility hint only; the server always knows contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Up,
    Down,
}

/// One physical card in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Instance identity, unique across the room.
    pub id: CardId,
    /// The template this card was expanded from.
    pub template_id: String,
    /// Display label.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Current orientation.
    pub face: Face,
    /// Whether the card is locked in place.
    pub locked: bool,
    /// Power cost to play.
    pub cost: i32,
    /// Printed base strength.
    pub strength: Option<i32>,
    /// Signed modifier added to the base strength.
    pub strength_modifier: i32,
    /// Rules text.
    pub text: String,
}

impl Card {
    /// Creates a fresh instance of a template.
    #[must_use]
    pub fn from_template(template: &CardTemplate, face: Face) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: template.id.clone(),
            name: template.name.clone(),
            card_type: template.card_type,
            face,
            locked: false,
            cost: template.cost,
            strength: template.strength,
            strength_modifier: 0,
            text: template.text.clone(),
        }
    }

    /// Expands every template into `copies` independent instances.
    #[must_use]
    pub fn expand(templates: &[CardTemplate], face: Face) -> Vec<Self> {
        templates
            .iter()
            .flat_map(|t| (0..t.copies).map(move |_| Self::from_template(t, face)))
            .collect()
    }

    /// Base strength plus modifier, for cards that print a strength.
    #[must_use]
    pub fn effective_strength(&self) -> Option<i32> {
        self.strength.map(|s| s + self.strength_modifier)
    }

    /// Returns the card turned to the given face.
    #[must_use]
    pub fn turned(mut self, face: Face) -> Self {
        self.face = face;
        self
    }
}

/// Position of a card id in a pile, searching from the top.
pub(crate) fn position(pile: &[Card], card_id: CardId) -> Option<usize> {
    pile.iter().position(|c| c.id == card_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(copies: u32) -> CardTemplate {
        CardTemplate {
            id: "runner".to_owned(),
            name: "Runner".to_owned(),
            card_type: CardType::Ally,
            cost: 1,
            strength: Some(2),
            copies,
            text: String::new(),
        }
    }

    #[test]
    fn test_expand_creates_distinct_instances() {
        // Arrange
        let templates = vec![template(3)];

        // Act
        let cards = Card::expand(&templates, Face::Down);

        // Assert
        assert_eq!(cards.len(), 3);
        assert_ne!(cards[0].id, cards[1].id);
        assert!(cards.iter().all(|c| c.face == Face::Down && !c.locked));
    }

    #[test]
    fn test_effective_strength_adds_modifier() {
        let mut card = Card::from_template(&template(1), Face::Up);
        card.strength_modifier = -3;

        assert_eq!(card.effective_strength(), Some(-1));
    }

    #[test]
    fn test_card_serializes_camel_case_with_type_tag() {
        let card = Card::from_template(&template(1), Face::Up);

        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["type"], "ally");
        assert_eq!(json["templateId"], "runner");
        assert_eq!(json["strengthModifier"], 0);
        assert_eq!(json["face"], "up");
    }
}
