//! A player's four-location board.

use fateline_content::domain::templates::{LocationAction, LocationTemplate};
use fateline_core::error::DomainError;
use serde::Serialize;

use super::cards::{Card, CardId, position};

/// The two rows of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Row {
    /// Public row, capacity-limited.
    Top,
    /// The owner's own plays, uncapped.
    Bottom,
}

/// Where a card sits on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSlot {
    pub location: usize,
    pub row: Row,
    pub index: usize,
}

/// One board location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub locked: bool,
    pub top_slots: usize,
    pub top: Vec<Card>,
    pub bottom: Vec<Card>,
    pub actions: Vec<LocationAction>,
}

impl Location {
    fn from_template(template: &LocationTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            locked: template.locked,
            top_slots: template.top_slots,
            top: Vec::new(),
            bottom: Vec::new(),
            actions: template.actions.clone(),
        }
    }

    /// Whether the top row can take another card.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.top.len() < self.top_slots
    }

    /// Index of a card in the bottom row.
    #[must_use]
    pub fn bottom_index(&self, card_id: CardId) -> Option<usize> {
        position(&self.bottom, card_id)
    }
}

/// Four locations in fixed order plus the pawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub locations: Vec<Location>,
    /// Location index holding the player's pawn.
    pub mover_at: usize,
}

impl Board {
    /// Builds a fresh board with the pawn on the first location.
    #[must_use]
    pub fn from_templates(templates: &[LocationTemplate]) -> Self {
        Self {
            locations: templates.iter().map(Location::from_template).collect(),
            mover_at: 0,
        }
    }

    /// Looks up a location.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BadLocationIndex` if `index` is out of range.
    pub fn location(&self, index: usize) -> Result<&Location, DomainError> {
        self.locations
            .get(index)
            .ok_or(DomainError::BadLocationIndex(index))
    }

    /// Looks up a location mutably.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BadLocationIndex` if `index` is out of range.
    pub fn location_mut(&mut self, index: usize) -> Result<&mut Location, DomainError> {
        self.locations
            .get_mut(index)
            .ok_or(DomainError::BadLocationIndex(index))
    }

    /// Looks up a location that must accept new cards or the pawn.
    ///
    /// # Errors
    ///
    /// Returns `BadLocationIndex` or `LocationLocked`.
    pub fn open_location(&self, index: usize) -> Result<&Location, DomainError> {
        let location = self.location(index)?;
        if location.locked {
            return Err(DomainError::LocationLocked(index));
        }
        Ok(location)
    }

    /// Finds a card on either row of any location.
    #[must_use]
    pub fn find(&self, card_id: CardId) -> Option<BoardSlot> {
        self.locations.iter().enumerate().find_map(|(location, l)| {
            if let Some(index) = position(&l.top, card_id) {
                return Some(BoardSlot {
                    location,
                    row: Row::Top,
                    index,
                });
            }
            l.bottom_index(card_id).map(|index| BoardSlot {
                location,
                row: Row::Bottom,
                index,
            })
        })
    }

    /// The card at a slot.
    #[must_use]
    pub fn card_at(&self, slot: BoardSlot) -> Option<&Card> {
        let location = self.locations.get(slot.location)?;
        match slot.row {
            Row::Top => location.top.get(slot.index),
            Row::Bottom => location.bottom.get(slot.index),
        }
    }

    /// Removes and returns the card at a slot found with [`Board::find`].
    pub fn take(&mut self, slot: BoardSlot) -> Option<Card> {
        let location = self.locations.get_mut(slot.location)?;
        let row = match slot.row {
            Row::Top => &mut location.top,
            Row::Bottom => &mut location.bottom,
        };
        (slot.index < row.len()).then(|| row.remove(slot.index))
    }

    /// Every card on the board.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.locations
            .iter()
            .flat_map(|l| l.top.iter().chain(&l.bottom))
    }

    /// Mutable access to a card on either row.
    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.locations
            .iter_mut()
            .flat_map(|l| l.top.iter_mut().chain(&mut l.bottom))
            .find(|c| c.id == card_id)
    }
}

#[cfg(test)]
mod tests {
    use fateline_content::domain::templates::{CardTemplate, CardType};

    use super::*;
    use crate::domain::cards::Face;

    fn board() -> Board {
        let templates: Vec<LocationTemplate> = (0..4)
            .map(|i| LocationTemplate {
                id: format!("l{i}"),
                name: format!("Location {i}"),
                top_slots: 1,
                actions: Vec::new(),
                locked: i == 3,
            })
            .collect();
        Board::from_templates(&templates)
    }

    fn card() -> Card {
        let template = CardTemplate {
            id: "x".to_owned(),
            name: "X".to_owned(),
            card_type: CardType::Hero,
            cost: 0,
            strength: Some(3),
            copies: 1,
            text: String::new(),
        };
        Card::from_template(&template, Face::Up)
    }

    #[test]
    fn test_from_templates_places_pawn_on_first_location() {
        let board = board();

        assert_eq!(board.locations.len(), 4);
        assert_eq!(board.mover_at, 0);
        assert!(board.locations[3].locked);
    }

    #[test]
    fn test_open_location_rejects_bad_index_and_lock() {
        let board = board();

        assert_eq!(
            board.open_location(4).unwrap_err(),
            DomainError::BadLocationIndex(4)
        );
        assert_eq!(
            board.open_location(3).unwrap_err(),
            DomainError::LocationLocked(3)
        );
        assert!(board.open_location(0).is_ok());
    }

    #[test]
    fn test_find_and_take_across_rows() {
        // Arrange
        let mut board = board();
        let hero = card();
        let ally = card();
        let (hero_id, ally_id) = (hero.id, ally.id);
        board.locations[1].top.push(hero);
        board.locations[2].bottom.push(ally);

        // Act
        let hero_slot = board.find(hero_id).unwrap();
        let ally_slot = board.find(ally_id).unwrap();
        let taken = board.take(ally_slot).unwrap();

        // Assert
        assert_eq!(hero_slot.row, Row::Top);
        assert_eq!(hero_slot.location, 1);
        assert_eq!(ally_slot.row, Row::Bottom);
        assert_eq!(taken.id, ally_id);
        assert!(board.find(ally_id).is_none());
    }

    #[test]
    fn test_free_slot_tracks_capacity() {
        let mut board = board();
        assert!(board.locations[0].has_free_slot());

        board.locations[0].top.push(card());

        assert!(!board.locations[0].has_free_slot());
    }
}
