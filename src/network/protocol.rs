//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Messages are JSON text frames tagged by `type`. Probes, the one
//! message sent at high frequency, may also arrive as a bincode-encoded
//! binary frame.

use serde::{Serialize, Deserialize};

use crate::core::position::Position;
use crate::game::events::GameEvent;
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::portal::PlacedPortal;
use crate::game::snippet::Snippet;
use crate::game::state::SessionId;
use crate::network::session::{GameStats, ScanPoll, SessionError, StatSubmission};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a new game, discarding any running one.
    StartGame {
        player_name: String,
        /// "easy", "medium" or "hard". Anything else plays as medium.
        #[serde(default)]
        difficulty: Option<String>,
    },

    /// Poll the compiler scan.
    ScanStatus,

    /// Probe a position for the bug.
    Probe(ProbeRequest),

    /// Record a player's result.
    SubmitStats(StatSubmission),

    /// Request the top players.
    Leaderboard {
        #[serde(default)]
        limit: Option<usize>,
    },

    /// Halt the scan.
    StopGame,

    /// Hide the bug at a specific position.
    PlaceBug { line: i32, column: i32 },

    /// Request a random exit portal.
    ExitPortal,

    /// Request an overview of the current game.
    GameStats,

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

/// A probe at a listing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// 1-based line.
    pub line: i32,
    /// 1-based column.
    pub column: i32,
}

impl ProbeRequest {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A game started.
    GameStarted(GameStartedInfo),

    /// Scan poll result.
    ScanStatus(ScanPoll),

    /// Probe outcome.
    ProbeResult(ProbeResponse),

    /// Stats were recorded.
    StatsRecorded { player_name: String },

    /// Top players, best first.
    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// Scan halted.
    GameStopped {
        /// False if no scan was running.
        was_active: bool,
    },

    /// Bug moved and decoys regenerated.
    BugPlaced {
        bug_position: Position,
        fake_errors_count: usize,
    },

    /// A random exit portal.
    ExitPortal(PlacedPortal),

    /// Overview of the current game.
    GameStats(GameStats),

    /// Lifecycle notification, sent to every client.
    Event(GameEvent),

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Sent when a game starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStartedInfo {
    /// New session id.
    pub session_id: SessionId,
    /// Name the game was started for.
    pub player_name: String,
    /// Where the scan begins.
    pub compiler_scan_position: Position,
    /// Seconds between scan advances.
    pub scan_speed: f64,
    /// Listing the bug is hidden in.
    pub code_snippet: ListingInfo,
}

/// A listing as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInfo {
    /// Source lines.
    pub lines: Vec<String>,
    /// Language name.
    pub language: String,
    /// Display filename.
    pub filename: String,
    /// Number of lines.
    pub total_lines: i32,
}

impl From<&Snippet> for ListingInfo {
    fn from(snippet: &Snippet) -> Self {
        Self {
            lines: snippet.lines.clone(),
            language: snippet.language.clone(),
            filename: snippet.filename.clone(),
            total_lines: snippet.line_count(),
        }
    }
}

/// Probe outcome as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    /// Probed line (after clamping).
    pub line: i32,
    /// Probed column (after clamping).
    pub column: i32,
    /// Whether the player is told they hit.
    pub hit: bool,
    /// Message shown to the player.
    pub message: String,
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Create an error reply.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<SessionError> for ServerError {
    fn from(err: SessionError) -> Self {
        let code = match err {
            SessionError::NoActiveSession => ErrorCode::NoActiveSession,
        };
        Self::new(code, err.to_string())
    }
}

impl From<SessionError> for ServerMessage {
    fn from(err: SessionError) -> Self {
        ServerMessage::Error(err.into())
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed message.
    InvalidInput,
    /// No game has been started.
    NoActiveSession,
    /// Nothing to offer (e.g. empty portal catalog).
    NotFound,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Shorthand for an error reply.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError::new(code, message))
    }
}
