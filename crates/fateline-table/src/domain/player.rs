//! The player aggregate.

use fateline_content::domain::templates::{CharacterTemplate, HandVisibility};
use fateline_core::error::DomainError;
use fateline_core::rng::{DeterministicRng, shuffle};
use uuid::Uuid;

use super::board::Board;
use super::cards::{Card, CardId, Face};
use super::zones::Zones;

/// Identity of a seated player. One per connection.
pub type PlayerId = Uuid;

/// Upper bound of a player's power.
pub const MAX_POWER: i32 = 50;

/// Upper bound of a player's trust.
pub const MAX_TRUST: i32 = 50;

/// Largest power or trust change a single request may apply.
pub const COUNTER_STEP_LIMIT: i32 = 10;

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Lobby readiness.
    pub ready: bool,
    /// Chosen character id.
    pub character_id: Option<String>,
    /// Visibility policy of the chosen character.
    pub hand_policy: HandVisibility,
    pub zones: Zones,
    pub board: Board,
    pub power: i32,
    pub trust: i32,
    /// Set once the player declares victory.
    pub won: bool,
    /// Whether the hand is shown to the table.
    pub hand_visible: bool,
}

impl Player {
    /// Seats a new player.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the trimmed name is empty or too
    /// long.
    pub fn new(id: PlayerId, name: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "name must be 1 to {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self {
            id,
            name: name.to_owned(),
            ready: false,
            character_id: None,
            hand_policy: HandVisibility::Hidden,
            zones: Zones::default(),
            board: Board::default(),
            power: 0,
            trust: 0,
            won: false,
            hand_visible: false,
        })
    }

    /// Builds piles and board from the chosen character and deals the
    /// opening hand.
    pub(crate) fn deal(
        &mut self,
        character: &CharacterTemplate,
        starting_power: i32,
        hand_size: usize,
        rng: &mut dyn DeterministicRng,
    ) {
        let mut deck = Card::expand(&character.deck, Face::Down);
        let mut fate_deck = Card::expand(&character.fate, Face::Down);
        shuffle(&mut deck, rng);
        shuffle(&mut fate_deck, rng);
        self.zones = Zones {
            deck,
            fate_deck,
            ..Zones::default()
        };
        self.board = Board::from_templates(&character.locations);
        self.zones.draw(hand_size, rng);
        self.power = starting_power;
        self.trust = 0;
        self.won = false;
        self.hand_policy = character.hand_visibility;
        self.hand_visible = character.hand_visibility == HandVisibility::Revealed;
    }

    /// Every card the player holds, in piles or on the board.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.zones.cards().chain(self.board.cards())
    }

    /// Mutable access to a card anywhere the player holds it.
    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        if let Some(card) = self.board.card_mut(card_id) {
            return Some(card);
        }
        self.zones.card_mut(card_id)
    }
}

/// Applies a step-limited change to a counter clamped to `[0, max]`.
///
/// Returns `(prev, next)`.
///
/// # Errors
///
/// Returns `DomainError::NoChange` if the delta is zero or the counter is
/// already at the bound it pushes against.
pub(crate) fn step_counter(value: i32, delta: i32, max: i32) -> Result<(i32, i32), DomainError> {
    let step = delta.clamp(-COUNTER_STEP_LIMIT, COUNTER_STEP_LIMIT);
    let next = (value + step).clamp(0, max);
    if next == value {
        return Err(DomainError::NoChange);
    }
    Ok((value, next))
}

#[cfg(test)]
mod tests {
    use fateline_content::domain::catalog::CharacterCatalog;
    use fateline_test_support::{MockRng, test_catalog};

    use super::*;

    #[test]
    fn test_new_trims_and_validates_name() {
        let id = Uuid::new_v4();

        assert_eq!(Player::new(id, "  Ada ").unwrap().name, "Ada");
        assert!(matches!(
            Player::new(id, "   "),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Player::new(id, &"x".repeat(MAX_NAME_LEN + 1)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_deal_builds_piles_from_character() {
        // Arrange
        let catalog = test_catalog();
        let scout = catalog.character("scout").unwrap();
        let mut player = Player::new(Uuid::new_v4(), "Ada").unwrap();

        // Act
        player.deal(scout, 2, 4, &mut MockRng);

        // Assert
        assert_eq!(player.zones.hand.len(), 4);
        assert_eq!(player.zones.deck.len(), 4);
        assert_eq!(player.zones.fate_deck.len(), 6);
        assert_eq!(player.board.locations.len(), 4);
        assert_eq!(player.power, 2);
        assert!(!player.hand_visible);
        assert!(player.zones.hand.iter().all(|c| c.face == Face::Up));
    }

    #[test]
    fn test_deal_reveals_hand_for_revealed_characters() {
        let catalog = test_catalog();
        let mut player = Player::new(Uuid::new_v4(), "Ada").unwrap();

        player.deal(catalog.character("oracle").unwrap(), 0, 4, &mut MockRng);

        assert!(player.hand_visible);
        assert_eq!(player.hand_policy, HandVisibility::Revealed);
    }

    #[test]
    fn test_step_counter_clamps_step_and_total() {
        assert_eq!(step_counter(5, 25, MAX_POWER), Ok((5, 15)));
        assert_eq!(step_counter(45, 10, MAX_POWER), Ok((45, 50)));
        assert_eq!(step_counter(3, -10, MAX_POWER), Ok((3, 0)));
    }

    #[test]
    fn test_step_counter_rejects_no_change() {
        assert_eq!(step_counter(5, 0, MAX_POWER), Err(DomainError::NoChange));
        assert_eq!(step_counter(50, 4, MAX_POWER), Err(DomainError::NoChange));
        assert_eq!(step_counter(0, -1, MAX_TRUST), Err(DomainError::NoChange));
    }
}
