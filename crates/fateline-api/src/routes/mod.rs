//! Route modules: the WebSocket transport plus read-only HTTP views.

pub mod characters;
pub mod health;
pub mod rooms;
pub mod ws;
