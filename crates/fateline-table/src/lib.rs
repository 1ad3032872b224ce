//! Fateline card table engine.
//!
//! This crate owns all game truth for a room: players, their card piles and
//! boards, the turn cycle, the reversible action log and the fate sessions.
//! Requests arrive as [`domain::commands::RoomRequest`] values and are run
//! to completion by the [`application::dispatcher::Dispatcher`], which
//! re-projects and publishes the room after every successful mutation.

pub mod application;
pub mod domain;
