//! Leaderboard
//!
//! Append-only log of finished sessions, ranked on demand by time
//! survived. The log is bounded: once full, the oldest record is
//! evicted to make room.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::core::position::Position;

/// One finished session as reported by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatRecord {
    /// Player display name.
    pub player_name: String,
    /// Seconds survived.
    pub time_survived: f64,
    /// Free-form outcome tag, e.g. "escaped", "caught", "timeout".
    pub status: String,
    /// Where the bug was hidden.
    pub bug_location: Position,
    /// When the record was submitted.
    pub recorded_at: DateTime<Utc>,
}

/// A ranked leaderboard row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player display name.
    pub player_name: String,
    /// Seconds survived.
    pub time_survived: f64,
}

/// Bounded append-only record of player stats.
#[derive(Clone, Debug)]
pub struct Leaderboard {
    records: VecDeque<PlayerStatRecord>,
    capacity: usize,
}

impl Leaderboard {
    /// Create an empty leaderboard keeping at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a record. No validation, no dedup by name.
    ///
    /// Returns the evicted record if the log was full.
    pub fn record(&mut self, stat: PlayerStatRecord) -> Option<PlayerStatRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        if let Some(ref old) = evicted {
            warn!(
                "Leaderboard full ({} records), evicting oldest entry for {}",
                self.capacity, old.player_name
            );
        }
        self.records.push_back(stat);
        evicted
    }

    /// Top `limit` players by time survived, longest first.
    ///
    /// Equal times keep submission order.
    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&PlayerStatRecord> = self.records.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.time_survived.total_cmp(&a.time_survived));

        ranked
            .into_iter()
            .take(limit)
            .map(|r| LeaderboardEntry {
                player_name: r.player_name.clone(),
                time_survived: r.time_survived,
            })
            .collect()
    }

    /// All records in submission order.
    pub fn records(&self) -> impl Iterator<Item = &PlayerStatRecord> {
        self.records.iter()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum records held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
