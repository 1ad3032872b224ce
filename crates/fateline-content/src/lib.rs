//! Fateline character catalog.
//!
//! Static, read-only content: each playable character's draw deck, fate
//! deck, board locations and companion tokens. The table engine consults
//! the catalog by character id and never hard-codes content.

pub mod application;
pub mod domain;
