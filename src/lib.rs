//! # Bug Hunt Game Server
//!
//! A player hides a bug in a code listing while a simulated compiler
//! scans the listing character by character. The player probes positions
//! to find the bug before the scan reaches it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BUG HUNT SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Primitives                              │
//! │  ├── position.rs   - Line/column coordinates                 │
//! │  ├── rng.rs        - Xorshift128+ PRNG, RandomSource         │
//! │  └── clock.rs      - Wall-clock seconds                      │
//! │                                                              │
//! │  game/             - Game logic (no I/O)                     │
//! │  ├── config.rs     - Tuning knobs                            │
//! │  ├── state.rs      - Session lifecycle                       │
//! │  ├── scan.rs       - Compiler scan cursor                    │
//! │  ├── decoy.rs      - Fake error placement                    │
//! │  ├── detection.rs  - Probe resolution                        │
//! │  ├── leaderboard.rs- Player stats and ranking                │
//! │  ├── events.rs     - Lifecycle events                        │
//! │  ├── portal.rs     - Exit portal hints                       │
//! │  └── snippet.rs    - Code listings                           │
//! │                                                              │
//! │  network/          - Networking                              │
//! │  ├── session.rs    - Single-session manager                  │
//! │  ├── server.rs     - WebSocket server and scan ticker        │
//! │  ├── protocol.rs   - Message types                           │
//! │  └── config.rs     - Server configuration                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! There is one game session at a time. The server keeps the
//! [`SessionManager`] behind a single mutex; request handlers and the
//! scan ticker lock it for each operation, so they never interleave.
//!
//! ## Randomness
//!
//! Game logic draws from a [`RandomSource`]. The server uses a seeded
//! [`DeterministicRng`]; tests substitute a scripted source.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::position::Position;
pub use core::rng::{DeterministicRng, RandomSource};
pub use game::config::GameConfig;
pub use game::state::{Difficulty, GameSession, Outcome, SessionId};
pub use network::session::SessionManager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
