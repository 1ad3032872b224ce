//! A player's five card piles.
//!
//! The end of `deck` and `fate_deck` is the draw point; the end of `discard`
//! and `fate_discard` is the most recently discarded card.

use fateline_core::error::DomainError;
use fateline_core::rng::{DeterministicRng, shuffle};
use serde::Serialize;

use super::cards::{Card, CardId, Face, position};

/// Pile sizes, published in place of hidden contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCounts {
    pub deck: usize,
    pub hand: usize,
    pub discard: usize,
    pub fate_deck: usize,
    pub fate_discard: usize,
}

/// Cards pulled off a draw pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawn<T> {
    /// What was drawn, in draw order.
    pub items: Vec<T>,
    /// Whether the discard was shuffled back in along the way.
    pub recycled: bool,
}

/// The five ordered piles a player owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zones {
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub discard: Vec<Card>,
    pub fate_deck: Vec<Card>,
    pub fate_discard: Vec<Card>,
}

impl Zones {
    /// Moves up to `count` cards from the deck into the hand, face up,
    /// shuffling the discard back in whenever the deck runs out.
    pub fn draw(&mut self, count: usize, rng: &mut dyn DeterministicRng) -> Drawn<CardId> {
        let drawn = draw_recycling(&mut self.deck, &mut self.discard, count, rng);
        let ids = drawn.items.iter().map(|c| c.id).collect();
        self.hand.extend(drawn.items);
        Drawn {
            items: ids,
            recycled: drawn.recycled,
        }
    }

    /// Pulls up to `count` fate cards, face up, recycling the fate discard.
    pub fn fate_draw(&mut self, count: usize, rng: &mut dyn DeterministicRng) -> Drawn<Card> {
        draw_recycling(&mut self.fate_deck, &mut self.fate_discard, count, rng)
    }

    /// Pulls up to `count` fate cards, face up, without recycling.
    pub fn fate_take(&mut self, count: usize) -> Vec<Card> {
        let mut taken = Vec::with_capacity(count.min(self.fate_deck.len()));
        while taken.len() < count {
            let Some(card) = self.fate_deck.pop() else {
                break;
            };
            taken.push(card.turned(Face::Up));
        }
        taken
    }

    /// Puts cards back on the fate deck so that `cards[0]` ends on top.
    pub fn fate_restore(&mut self, cards: Vec<Card>) {
        for card in cards.into_iter().rev() {
            self.fate_deck.push(card.turned(Face::Down));
        }
    }

    /// Shuffles the whole discard into the deck.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DiscardEmpty` if there is nothing to move.
    pub fn reshuffle_discard(&mut self, rng: &mut dyn DeterministicRng) -> Result<usize, DomainError> {
        if self.discard.is_empty() {
            return Err(DomainError::DiscardEmpty);
        }
        Ok(recycle(&mut self.deck, &mut self.discard, rng))
    }

    /// Shuffles the whole fate discard into the fate deck.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::FateDiscardEmpty` if there is nothing to move.
    pub fn reshuffle_fate_discard(
        &mut self,
        rng: &mut dyn DeterministicRng,
    ) -> Result<usize, DomainError> {
        if self.fate_discard.is_empty() {
            return Err(DomainError::FateDiscardEmpty);
        }
        Ok(recycle(&mut self.fate_deck, &mut self.fate_discard, rng))
    }

    /// Index of a card in the hand.
    #[must_use]
    pub fn hand_index(&self, card_id: CardId) -> Option<usize> {
        position(&self.hand, card_id)
    }

    /// Whether the top of the discard is exactly `ids`, oldest first.
    #[must_use]
    pub fn discard_ends_with(&self, ids: &[CardId]) -> bool {
        self.discard.len() >= ids.len()
            && self.discard[self.discard.len() - ids.len()..]
                .iter()
                .map(|c| c.id)
                .eq(ids.iter().copied())
    }

    /// Pile sizes.
    #[must_use]
    pub fn counts(&self) -> ZoneCounts {
        ZoneCounts {
            deck: self.deck.len(),
            hand: self.hand.len(),
            discard: self.discard.len(),
            fate_deck: self.fate_deck.len(),
            fate_discard: self.fate_discard.len(),
        }
    }

    /// Every card held in the five piles.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.deck
            .iter()
            .chain(&self.hand)
            .chain(&self.discard)
            .chain(&self.fate_deck)
            .chain(&self.fate_discard)
    }

    /// Mutable access to a card in any pile.
    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.deck
            .iter_mut()
            .chain(&mut self.hand)
            .chain(&mut self.discard)
            .chain(&mut self.fate_deck)
            .chain(&mut self.fate_discard)
            .find(|c| c.id == card_id)
    }
}

fn draw_recycling(
    pile: &mut Vec<Card>,
    spent: &mut Vec<Card>,
    count: usize,
    rng: &mut dyn DeterministicRng,
) -> Drawn<Card> {
    let mut items = Vec::with_capacity(count);
    let mut recycled = false;
    while items.len() < count {
        if pile.is_empty() {
            if spent.is_empty() {
                break;
            }
            recycle(pile, spent, rng);
            recycled = true;
        }
        let Some(card) = pile.pop() else {
            break;
        };
        items.push(card.turned(Face::Up));
    }
    Drawn { items, recycled }
}

/// Moves `spent` face down onto `pile` and shuffles the result.
fn recycle(pile: &mut Vec<Card>, spent: &mut Vec<Card>, rng: &mut dyn DeterministicRng) -> usize {
    let moved = spent.len();
    pile.extend(spent.drain(..).map(|c| c.turned(Face::Down)));
    shuffle(pile, rng);
    moved
}

#[cfg(test)]
mod tests {
    use fateline_content::domain::templates::{CardTemplate, CardType};
    use fateline_test_support::{MockRng, SequenceRng};

    use super::*;

    fn cards(n: u32) -> Vec<Card> {
        let template = CardTemplate {
            id: "c".to_owned(),
            name: "C".to_owned(),
            card_type: CardType::Ally,
            cost: 0,
            strength: None,
            copies: n,
            text: String::new(),
        };
        Card::expand(&[template], Face::Down)
    }

    #[test]
    fn test_draw_takes_from_top_face_up() {
        // Arrange
        let mut zones = Zones {
            deck: cards(3),
            ..Zones::default()
        };
        let top = zones.deck[2].id;

        // Act
        let drawn = zones.draw(1, &mut MockRng);

        // Assert
        assert_eq!(drawn.items, vec![top]);
        assert!(!drawn.recycled);
        assert_eq!(zones.hand[0].face, Face::Up);
        assert_eq!(zones.deck.len(), 2);
    }

    #[test]
    fn test_draw_recycles_discard_when_deck_runs_out() {
        // Arrange
        let mut zones = Zones {
            deck: cards(1),
            discard: cards(2),
            ..Zones::default()
        };

        // Act
        let drawn = zones.draw(2, &mut MockRng);

        // Assert
        assert_eq!(drawn.items.len(), 2);
        assert!(drawn.recycled);
        assert!(zones.discard.is_empty());
        assert_eq!(zones.deck.len(), 1);
        assert_eq!(zones.deck[0].face, Face::Down);
    }

    #[test]
    fn test_draw_stops_when_both_piles_are_empty() {
        let mut zones = Zones {
            deck: cards(1),
            ..Zones::default()
        };

        let drawn = zones.draw(3, &mut MockRng);

        assert_eq!(drawn.items.len(), 1);
        assert!(!drawn.recycled);
    }

    #[test]
    fn test_reshuffle_discard_moves_everything_face_down() {
        let mut zones = Zones {
            discard: cards(3).into_iter().map(|c| c.turned(Face::Up)).collect(),
            ..Zones::default()
        };

        let moved = zones.reshuffle_discard(&mut MockRng).unwrap();

        assert_eq!(moved, 3);
        assert!(zones.discard.is_empty());
        assert!(zones.deck.iter().all(|c| c.face == Face::Down));
    }

    #[test]
    fn test_reshuffle_empty_discard_fails() {
        let mut zones = Zones::default();

        assert_eq!(
            zones.reshuffle_discard(&mut MockRng),
            Err(DomainError::DiscardEmpty)
        );
        assert_eq!(
            zones.reshuffle_fate_discard(&mut MockRng),
            Err(DomainError::FateDiscardEmpty)
        );
    }

    #[test]
    fn test_fate_take_does_not_recycle() {
        let mut zones = Zones {
            fate_deck: cards(1),
            fate_discard: cards(2),
            ..Zones::default()
        };

        let taken = zones.fate_take(2);

        assert_eq!(taken.len(), 1);
        assert_eq!(zones.fate_discard.len(), 2);
        assert_eq!(taken[0].face, Face::Up);
    }

    #[test]
    fn test_fate_restore_puts_first_card_on_top() {
        let mut zones = Zones {
            fate_deck: cards(3),
            ..Zones::default()
        };
        let before = zones.fate_deck.clone();

        let taken = zones.fate_take(2);
        zones.fate_restore(taken);

        assert_eq!(zones.fate_deck, before);
    }

    #[test]
    fn test_discard_ends_with_checks_order() {
        let pile = cards(3);
        let ids: Vec<CardId> = pile.iter().map(|c| c.id).collect();
        let zones = Zones {
            discard: pile,
            ..Zones::default()
        };

        assert!(zones.discard_ends_with(&ids[1..]));
        assert!(!zones.discard_ends_with(&[ids[2], ids[1]]));
        assert!(zones.discard_ends_with(&[]));
    }

    #[test]
    fn test_recycled_discard_is_shuffled_face_down_before_drawing() {
        // Arrange
        let mut zones = Zones {
            discard: cards(3),
            ..Zones::default()
        };
        let ids: Vec<CardId> = zones.discard.iter().map(|c| c.id).collect();
        let mut rng = SequenceRng::new(vec![0, 1]);

        // Act
        let drawn = zones.draw(1, &mut rng);

        // Assert
        assert!(drawn.recycled);
        assert_eq!(drawn.items, vec![ids[0]]);
        assert!(zones.discard.is_empty());
        let deck: Vec<CardId> = zones.deck.iter().map(|c| c.id).collect();
        assert_eq!(deck, vec![ids[2], ids[1]]);
        assert!(zones.deck.iter().all(|c| c.face == Face::Down));
    }
}
