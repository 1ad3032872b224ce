//! The read-only character catalog.

use std::collections::HashSet;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use super::templates::CharacterTemplate;

/// Every board has exactly this many locations.
pub const LOCATIONS_PER_BOARD: usize = 4;

/// The catalog bundled with the server.
pub const BUILTIN_CATALOG: &str = include_str!("../../data/characters.yaml");

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source is not valid YAML for the catalog schema.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog defines no characters.
    #[error("catalog defines no characters")]
    Empty,

    /// Two characters share an id.
    #[error("duplicate character id: {0}")]
    DuplicateCharacter(String),

    /// A character does not define exactly four locations.
    #[error(
        "character {character} defines {found} locations, expected {expected}",
        expected = LOCATIONS_PER_BOARD
    )]
    LocationCount {
        /// The offending character.
        character: String,
        /// How many locations it defines.
        found: usize,
    },

    /// A card template has zero copies.
    #[error("character {character} card {card} must have at least one copy")]
    ZeroCopies {
        /// The offending character.
        character: String,
        /// The offending card template.
        card: String,
    },
}

/// Read access to character content by id.
pub trait CharacterCatalog: Send + Sync {
    /// Looks up a character.
    fn character(&self, id: &str) -> Option<&CharacterTemplate>;

    /// All characters, in catalog order.
    fn characters(&self) -> &[CharacterTemplate];

    /// Content hash identifying this catalog revision.
    fn version_hash(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    characters: Vec<CharacterTemplate>,
}

/// A catalog loaded once and held in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    characters: Vec<CharacterTemplate>,
    version_hash: String,
}

impl StaticCatalog {
    /// Parses and validates a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the YAML is malformed or fails validation.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(source)?;
        validate(&file.characters)?;
        let version_hash = format!("{:x}", Sha256::digest(source.as_bytes()));
        debug!(
            characters = file.characters.len(),
            %version_hash,
            "loaded character catalog"
        );
        Ok(Self {
            characters: file.characters,
            version_hash,
        })
    }

    /// Loads the bundled catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }
}

impl CharacterCatalog for StaticCatalog {
    fn character(&self, id: &str) -> Option<&CharacterTemplate> {
        self.characters.iter().find(|c| c.id == id)
    }

    fn characters(&self) -> &[CharacterTemplate] {
        &self.characters
    }

    fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

fn validate(characters: &[CharacterTemplate]) -> Result<(), CatalogError> {
    if characters.is_empty() {
        return Err(CatalogError::Empty);
    }
    let mut seen = HashSet::new();
    for character in characters {
        if !seen.insert(character.id.as_str()) {
            return Err(CatalogError::DuplicateCharacter(character.id.clone()));
        }
        if character.locations.len() != LOCATIONS_PER_BOARD {
            return Err(CatalogError::LocationCount {
                character: character.id.clone(),
                found: character.locations.len(),
            });
        }
        let templates = character
            .deck
            .iter()
            .chain(&character.fate)
            .chain(&character.tokens);
        for card in templates {
            if card.copies == 0 {
                return Err(CatalogError::ZeroCopies {
                    character: character.id.clone(),
                    card: card.id.clone(),
                });
            }
        }
    }
    Ok(())
}
