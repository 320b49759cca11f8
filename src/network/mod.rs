//! Network Layer
//!
//! WebSocket server, wire protocol, and the session manager that owns
//! all game state. Wall-clock time enters the game here.

pub mod config;
pub mod protocol;
pub mod session;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use protocol::{
    ClientMessage, ServerMessage, ErrorCode, ProbeRequest, ProbeResponse, GameStartedInfo,
    ListingInfo,
};
pub use session::{GameStart, GameStats, ScanPoll, SessionError, SessionManager, StatSubmission};
pub use server::{GameServer, GameServerError, SharedSession};
