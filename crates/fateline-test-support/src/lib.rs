//! Shared test doubles and fixtures for the Fateline card table engine.

mod clock;
mod fixtures;
mod rng;

pub use clock::{FixedClock, fixed_time};
pub use fixtures::{TEST_CATALOG_YAML, test_catalog};
pub use rng::{MockRng, SequenceRng};
