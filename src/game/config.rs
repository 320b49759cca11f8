//! Game tuning knobs.

use serde::{Serialize, Deserialize};

use crate::game::state::Difficulty;

/// Tuning for a single game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of every listing line as seen by the scan cursor.
    pub max_columns_per_line: i32,
    /// Bugs are placed in columns `[1, bug_column_max]`.
    pub bug_column_max: i32,
    /// Seconds between scan advances on easy.
    pub easy_speed: f64,
    /// Seconds between scan advances on medium (and unknown difficulties).
    pub medium_speed: f64,
    /// Seconds between scan advances on hard.
    pub hard_speed: f64,
    /// Decoy generation tuning.
    pub decoys: DecoyConfig,
    /// Probe detection tuning.
    pub detection: DetectionConfig,
    /// Maximum player stat records kept before the oldest is evicted.
    pub leaderboard_capacity: usize,
    /// Leaderboard size when the caller does not ask for one.
    pub leaderboard_default_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_columns_per_line: 80,
            bug_column_max: 50,
            easy_speed: 3.0,
            medium_speed: 2.0,
            hard_speed: 1.0,
            decoys: DecoyConfig::default(),
            detection: DetectionConfig::default(),
            leaderboard_capacity: 10_000,
            leaderboard_default_limit: 5,
        }
    }
}

impl GameConfig {
    /// Seconds between scan advances for a difficulty.
    pub fn scan_speed(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy_speed,
            Difficulty::Medium => self.medium_speed,
            Difficulty::Hard => self.hard_speed,
        }
    }
}

/// Decoy ("fake error") placement around the bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoyConfig {
    /// Fewest decoys sampled per session.
    pub min_count: i32,
    /// Most decoys sampled per session.
    pub max_count: i32,
    /// Maximum line jitter from the bug, either direction.
    pub line_jitter: i32,
    /// Maximum column jitter from the bug, either direction.
    pub column_jitter: i32,
    /// Redraws allowed for a single decoy that lands on the bug.
    pub max_redraws: u32,
}

impl Default for DecoyConfig {
    fn default() -> Self {
        Self {
            min_count: 8,
            max_count: 15,
            line_jitter: 10,
            column_jitter: 20,
            max_redraws: 64,
        }
    }
}

/// Near-hit resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Line tolerance for a near hit.
    pub near_line_tolerance: i32,
    /// Column tolerance for a near hit.
    pub near_column_tolerance: i32,
    /// Decoys this close to the probe (lines and columns) interfere.
    pub interference_radius: i32,
    /// Detection chance with no interference.
    pub base_chance: f64,
    /// Chance lost per interfering decoy.
    pub interference_per_decoy: f64,
    /// Detection chance never drops below this.
    pub min_chance: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            near_line_tolerance: 2,
            near_column_tolerance: 5,
            interference_radius: 3,
            base_chance: 0.6,
            interference_per_decoy: 0.1,
            min_chance: 0.3,
        }
    }
}
