//! Core primitives.
//!
//! Coordinates, the injectable random source, and wall-clock conversion.
//! Nothing in here touches the network or holds session state.

pub mod position;
pub mod rng;
pub mod clock;

// Re-export core types
pub use position::{Position, positions_near};
pub use rng::{DeterministicRng, RandomSource, ScriptedSource, derive_seed};
pub use clock::{Seconds, now_seconds};
