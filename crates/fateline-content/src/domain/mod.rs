//! Domain layer for the character catalog.

pub mod catalog;
pub mod templates;
