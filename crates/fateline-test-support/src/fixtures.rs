//! Catalog fixtures.

use fateline_content::domain::catalog::StaticCatalog;

/// A small catalog with three characters, one per hand visibility policy.
///
/// `scout` has an eight-card deck and a six-card fate deck; `warden` starts
/// with its first location locked; `oracle` reveals its hand.
pub const TEST_CATALOG_YAML: &str = r"
characters:
  - id: scout
    name: The Scout
    objective: Reach the far tower.
    hand_visibility: hidden
    locations:
      - { id: camp, name: Camp, top_slots: 2, actions: [gain_power, play_card] }
      - { id: ford, name: Ford, top_slots: 2, actions: [fate, discard] }
      - { id: ridge, name: Ridge, top_slots: 1, actions: [gain_power, vanquish] }
      - { id: tower, name: Tower, top_slots: 2, actions: [play_card, activate] }
    deck:
      - { id: runner, name: Runner, type: ally, cost: 1, strength: 1, copies: 4 }
      - { id: lantern, name: Lantern, type: item, cost: 1, copies: 2 }
      - { id: dash, name: Dash, type: effect, cost: 0, copies: 2 }
    fate:
      - { id: sentry, name: Sentry, type: hero, strength: 3, copies: 4 }
      - { id: snare, name: Snare, type: curse, copies: 2 }
    tokens:
      - { id: hawk, name: Hawk, type: token, strength: 1 }
  - id: warden
    name: The Warden
    objective: Lock every gate.
    hand_visibility: optional
    locations:
      - { id: gate, name: Gate, top_slots: 2, locked: true, actions: [gain_power] }
      - { id: yard, name: Yard, top_slots: 2, actions: [play_card] }
      - { id: cells, name: Cells, top_slots: 2, actions: [fate] }
      - { id: keep, name: Keep, top_slots: 2, actions: [activate] }
    deck:
      - { id: guard, name: Guard, type: ally, cost: 2, strength: 2, copies: 6 }
    fate:
      - { id: rebel, name: Rebel, type: hero, strength: 2, copies: 6 }
  - id: oracle
    name: The Oracle
    objective: Foresee the end.
    hand_visibility: revealed
    locations:
      - { id: spring, name: Spring, actions: [fate] }
      - { id: grove, name: Grove, actions: [play_card] }
      - { id: altar, name: Altar, actions: [activate] }
      - { id: cave, name: Cave, actions: [discard] }
    deck:
      - { id: acolyte, name: Acolyte, type: ally, cost: 1, strength: 1, copies: 6 }
    fate:
      - { id: seeker, name: Seeker, type: hero, strength: 4, copies: 6 }
";

/// Loads [`TEST_CATALOG_YAML`].
///
/// # Panics
///
/// Panics if the fixture fails validation.
#[must_use]
pub fn test_catalog() -> StaticCatalog {
    StaticCatalog::from_yaml(TEST_CATALOG_YAML).expect("test catalog is valid")
}
