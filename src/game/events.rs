//! Game Events
//!
//! Session lifecycle events, recorded by the session manager and
//! fanned out to connected clients by the server.

use serde::{Serialize, Deserialize};

use crate::core::clock::Seconds;
use crate::core::position::Position;
use crate::game::state::{Difficulty, Outcome, SessionId};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEventData {
    /// A new session began scanning.
    SessionStarted {
        player_name: String,
        difficulty: Difficulty,
        listing_lines: i32,
        scan_speed: f64,
    },

    /// The session ended.
    SessionEnded {
        outcome: Outcome,
        cursor: Position,
        time_survived: f64,
    },

    /// The session was cleared without a new one starting.
    SessionReset,

    /// A player submitted stats.
    StatsRecorded {
        player_name: String,
        time_survived: f64,
        status: String,
    },
}

/// A game event with its wall-clock time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// When the event occurred.
    pub at: Seconds,

    /// Session involved, if any.
    pub session_id: Option<SessionId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(at: Seconds, session_id: Option<SessionId>, data: GameEventData) -> Self {
        Self { at, session_id, data }
    }

    /// Create session ended event.
    pub fn session_ended(
        at: Seconds,
        session_id: SessionId,
        outcome: Outcome,
        cursor: Position,
        time_survived: f64,
    ) -> Self {
        Self::new(
            at,
            Some(session_id),
            GameEventData::SessionEnded { outcome, cursor, time_survived },
        )
    }

    /// Whether this event closes a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self.data, GameEventData::SessionEnded { .. })
    }
}
