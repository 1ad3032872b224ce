//! Domain layer for the card table.

pub mod actions;
pub mod board;
pub mod cards;
pub mod commands;
pub mod fate;
pub mod moves;
pub mod player;
pub mod room;
pub mod turn;
pub mod undo;
pub mod zones;
