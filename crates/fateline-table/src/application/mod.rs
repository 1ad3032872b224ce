//! Application layer for the card table.

pub mod command_handlers;
pub mod dispatcher;
pub mod projection;
pub mod registry;
