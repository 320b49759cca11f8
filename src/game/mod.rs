//! Game Logic Module
//!
//! Everything about a single bug hunt. No I/O happens here; time comes
//! in as `now` and randomness as a [`RandomSource`](crate::core::RandomSource).
//!
//! ## Module Structure
//!
//! - `config`: Tuning knobs (speeds, tolerances, decoy counts)
//! - `state`: Session lifecycle and the per-session state
//! - `scan`: The compiler scan cursor
//! - `decoy`: Fake error placement around the bug
//! - `detection`: Probe resolution
//! - `leaderboard`: Finished-session records and ranking
//! - `events`: Lifecycle events for clients
//! - `portal`: Exit portal hints
//! - `snippet`: Code listings

pub mod config;
pub mod state;
pub mod scan;
pub mod decoy;
pub mod detection;
pub mod leaderboard;
pub mod events;
pub mod portal;
pub mod snippet;

// Re-export key types
pub use config::{GameConfig, DecoyConfig, DetectionConfig};
pub use state::{GameSession, SessionId, SessionPhase, Difficulty, Outcome};
pub use scan::{ScanAdvance, ScanCursor, ScanEngine, ScanStatus};
pub use detection::{ProbeKind, ProbeResult};
pub use leaderboard::{Leaderboard, LeaderboardEntry, PlayerStatRecord};
pub use events::{GameEvent, GameEventData};
pub use portal::{ExitPortal, PlacedPortal, PortalCatalog};
pub use snippet::{Snippet, SnippetError, SnippetLibrary};
