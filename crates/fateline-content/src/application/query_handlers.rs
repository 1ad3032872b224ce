//! Query handlers for the character catalog.
//!
//! Read-only views served to lobby clients before a game starts.

use serde::Serialize;

use crate::domain::catalog::CharacterCatalog;
use crate::domain::templates::{CharacterTemplate, HandVisibility};

/// Lobby-facing summary of one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPreview {
    /// The character identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Victory condition text.
    pub objective: String,
    /// Number of cards in the draw deck.
    pub deck_size: u32,
    /// Number of cards in the fate deck.
    pub fate_size: u32,
    /// Location names in board order.
    pub locations: Vec<String>,
    /// Hand visibility policy.
    pub hand_visibility: HandVisibility,
}

impl From<&CharacterTemplate> for CharacterPreview {
    fn from(character: &CharacterTemplate) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            objective: character.objective.clone(),
            deck_size: character.deck_size(),
            fate_size: character.fate_size(),
            locations: character.locations.iter().map(|l| l.name.clone()).collect(),
            hand_visibility: character.hand_visibility,
        }
    }
}

/// The whole catalog as served over HTTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    /// Content hash of the loaded catalog.
    pub version_hash: String,
    /// Every character, in catalog order.
    pub characters: Vec<CharacterPreview>,
}

/// Lists every character as a preview.
#[must_use]
pub fn list_characters(catalog: &dyn CharacterCatalog) -> Vec<CharacterPreview> {
    catalog
        .characters()
        .iter()
        .map(CharacterPreview::from)
        .collect()
}

/// Returns the catalog view including its version hash.
#[must_use]
pub fn get_catalog(catalog: &dyn CharacterCatalog) -> CatalogView {
    CatalogView {
        version_hash: catalog.version_hash().to_owned(),
        characters: list_characters(catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::StaticCatalog;

    #[test]
    fn test_list_characters_returns_previews_in_catalog_order() {
        // Arrange
        let catalog = StaticCatalog::builtin().unwrap();

        // Act
        let previews = list_characters(&catalog);

        // Assert
        let ids: Vec<&str> = catalog.characters().iter().map(|c| c.id.as_str()).collect();
        let preview_ids: Vec<&str> = previews.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, preview_ids);
        assert!(previews.iter().all(|p| p.locations.len() == 4));
    }

    #[test]
    fn test_preview_counts_copies() {
        // Arrange
        let catalog = StaticCatalog::builtin().unwrap();
        let character = &catalog.characters()[0];

        // Act
        let preview = CharacterPreview::from(character);

        // Assert
        assert_eq!(preview.deck_size, character.deck_size());
        assert_eq!(preview.fate_size, character.fate_size());
        assert_eq!(preview.locations[0], character.locations[0].name);
    }

    #[test]
    fn test_get_catalog_carries_version_hash() {
        // Arrange
        let catalog = StaticCatalog::builtin().unwrap();

        // Act
        let view = get_catalog(&catalog);

        // Assert
        assert_eq!(view.version_hash, catalog.version_hash());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["characters"][0]["deckSize"].is_u64());
        assert!(json["versionHash"].is_string());
    }
}
