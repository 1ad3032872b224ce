//! Fateline core: shared domain abstractions.
//!
//! This crate defines the traits and types every other crate depends on:
//! time and randomness seams, the command trait, and the error taxonomy
//! surfaced at the request boundary. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
