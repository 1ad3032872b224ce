//! Application layer for the character catalog.

pub mod query_handlers;
