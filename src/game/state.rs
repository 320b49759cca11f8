//! Session State
//!
//! One play-through: the hidden bug, its decoys, and the scan racing
//! towards it. A session starts active and ends exactly once; the
//! first terminal outcome sticks.

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::info;

use crate::core::clock::Seconds;
use crate::core::position::Position;
use crate::core::rng::RandomSource;
use crate::game::config::GameConfig;
use crate::game::decoy::generate_decoys;
use crate::game::detection::{evaluate_probe, ProbeKind, ProbeResult};
use crate::game::scan::{ScanAdvance, ScanEngine, ScanStatus};

/// Unique session identifier.
pub type SessionId = uuid::Uuid;

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Scan difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Slow scan.
    Easy,
    /// Default scan.
    #[default]
    Medium,
    /// Fast scan.
    Hard,
}

impl Difficulty {
    /// Parse a difficulty name. Matching is exact; anything else
    /// (including "HARD" or " easy") plays as medium.
    pub fn from_name(name: &str) -> Self {
        match name {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Player probed the exact bug position.
    FoundByPlayer,
    /// Scan cursor reached the bug.
    CaughtByScan,
    /// Scan ran past the last line.
    ListingExhausted,
    /// Stopped from outside (player exit or portal).
    Stopped,
}

/// Session lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Scan running.
    Active,
    /// Session over.
    Terminated(Outcome),
}

// =============================================================================
// GAME SESSION
// =============================================================================

/// Complete state of one game session.
#[derive(Clone, Debug)]
pub struct GameSession {
    /// Session identifier.
    pub id: SessionId,
    /// Name given at start.
    pub player_name: String,
    /// When the session started.
    pub started_at: Seconds,
    /// Difficulty the scan speed came from.
    pub difficulty: Difficulty,
    bug: Option<Position>,
    decoys: Vec<Position>,
    scan: ScanEngine,
    phase: SessionPhase,
}

impl GameSession {
    /// Start a session over a listing of `listing_line_count` lines.
    ///
    /// The bug is placed uniformly in lines `[1, listing_line_count]` and
    /// columns `[1, bug_column_max]`. An empty listing gets no bug.
    pub fn start<R: RandomSource>(
        id: SessionId,
        player_name: impl Into<String>,
        listing_line_count: i32,
        difficulty: Difficulty,
        now: Seconds,
        config: &GameConfig,
        rng: &mut R,
    ) -> Self {
        let mut scan = ScanEngine::new(listing_line_count, config.max_columns_per_line);
        scan.start(config.scan_speed(difficulty), now);

        let mut session = Self {
            id,
            player_name: player_name.into(),
            started_at: now,
            difficulty,
            bug: None,
            decoys: Vec::new(),
            scan,
            phase: SessionPhase::Active,
        };

        if listing_line_count > 0 {
            let line = rng.next_int_range(1, listing_line_count);
            let column = rng.next_int_range(1, config.bug_column_max.max(1));
            session.place_bug(Position::new(line, column), config, rng);
        }

        session
    }

    /// Hide the bug at `position` and scatter fresh decoys around it.
    pub fn place_bug<R: RandomSource>(&mut self, position: Position, config: &GameConfig, rng: &mut R) {
        self.decoys = generate_decoys(position, &config.decoys, rng);
        self.bug = Some(position);
    }

    /// Poll the scan. Ends the session if the scan reached the bug or
    /// ran off the listing.
    pub fn advance_scan(&mut self, now: Seconds) -> ScanAdvance {
        let result = self.scan.advance_if_due(now, self.bug);
        match result {
            ScanAdvance::ReachedBug => self.terminate(Outcome::CaughtByScan),
            ScanAdvance::ListingExhausted => self.terminate(Outcome::ListingExhausted),
            ScanAdvance::Idle | ScanAdvance::Advanced => {}
        }
        result
    }

    /// Resolve a probe. A direct hit stops the scan.
    pub fn probe<R: RandomSource>(&mut self, probe: Position, config: &GameConfig, rng: &mut R) -> ProbeResult {
        let result = evaluate_probe(probe, self.bug, &self.decoys, &config.detection, rng);
        if result.kind == ProbeKind::DirectHit {
            self.scan.stop();
            self.terminate(Outcome::FoundByPlayer);
        }
        result
    }

    /// Stop the scan where it is.
    pub fn stop(&mut self) {
        self.scan.stop();
        self.terminate(Outcome::Stopped);
    }

    fn terminate(&mut self, outcome: Outcome) {
        if self.phase == SessionPhase::Active {
            info!("Session {} ended: {:?} at {:?}", short_id(&self.id), outcome, self.scan.cursor().position);
            self.phase = SessionPhase::Terminated(outcome);
        }
    }

    /// Seconds since the session started.
    pub fn time_survived(&self, now: Seconds) -> f64 {
        (now - self.started_at).max(0.0)
    }

    /// Snapshot of the scan.
    pub fn scan_status(&self) -> ScanStatus {
        self.scan.status()
    }

    /// The scan engine.
    pub fn scan(&self) -> &ScanEngine {
        &self.scan
    }

    /// Mutable scan engine, for placing the cursor directly.
    pub fn scan_mut(&mut self) -> &mut ScanEngine {
        &mut self.scan
    }

    /// Hidden bug, if the listing had any lines.
    pub fn bug(&self) -> Option<Position> {
        self.bug
    }

    /// Decoys around the bug.
    pub fn decoys(&self) -> &[Position] {
        &self.decoys
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// How the session ended, if it has.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            SessionPhase::Active => None,
            SessionPhase::Terminated(outcome) => Some(outcome),
        }
    }

    /// Lines in the listing.
    pub fn listing_line_count(&self) -> i32 {
        self.scan.listing_line_count()
    }
}

/// First four bytes of a session id as hex, for logs.
pub fn short_id(id: &SessionId) -> String {
    hex::encode(&id.as_bytes()[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{DeterministicRng, ScriptedSource};

    fn session(lines: i32, difficulty: Difficulty, rng: &mut impl RandomSource) -> GameSession {
        GameSession::start(uuid::Uuid::nil(), "ada", lines, difficulty, 1000.0, &GameConfig::default(), rng)
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::from_name("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_name("hard"), Difficulty::Hard);
        assert_eq!(Difficulty::from_name("medium"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name("HARD"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name(" easy"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name("Easy"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name("nightmare"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name(""), Difficulty::Medium);
    }

    #[test]
    fn test_start_places_bug_in_bounds() {
        let mut rng = DeterministicRng::new(1);
        for _ in 0..100 {
            let s = session(30, Difficulty::Medium, &mut rng);
            let bug = s.bug().unwrap();
            assert!(bug.line >= 1 && bug.line <= 30);
            assert!(bug.column >= 1 && bug.column <= 50);
            assert!(s.decoys().len() >= 8 && s.decoys().len() <= 15);
            assert!(s.decoys().iter().all(|d| *d != bug));
        }
    }

    #[test]
    fn test_start_activates_scan_at_origin() {
        let mut rng = DeterministicRng::new(2);
        let s = session(30, Difficulty::Hard, &mut rng);
        assert_eq!(s.phase(), SessionPhase::Active);
        assert!(s.scan().is_active());
        assert_eq!(s.scan().cursor().position, Position::ORIGIN);
        assert_eq!(s.scan().cursor().speed, 1.0);
        assert_eq!(s.scan().cursor().last_advance, 1000.0);
    }

    #[test]
    fn test_empty_listing_has_no_bug() {
        let mut rng = DeterministicRng::new(3);
        let mut s = session(0, Difficulty::Medium, &mut rng);
        assert!(s.bug().is_none());
        assert!(s.decoys().is_empty());

        assert_eq!(s.advance_scan(1002.0), ScanAdvance::ListingExhausted);
        assert_eq!(s.outcome(), Some(Outcome::ListingExhausted));
    }

    #[test]
    fn test_direct_hit_ends_session() {
        let mut rng = DeterministicRng::new(4);
        let config = GameConfig::default();
        let mut s = session(30, Difficulty::Medium, &mut rng);
        s.place_bug(Position::new(15, 23), &config, &mut rng);

        let result = s.probe(Position::new(15, 23), &config, &mut rng);
        assert!(result.hit());
        assert!(!s.scan().is_active());
        assert_eq!(s.outcome(), Some(Outcome::FoundByPlayer));
    }

    #[test]
    fn test_near_miss_keeps_scanning() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(5);
        let mut s = session(30, Difficulty::Medium, &mut rng);
        s.place_bug(Position::new(15, 23), &config, &mut rng);

        let mut roll = ScriptedSource::units(vec![0.99]);
        let result = s.probe(Position::new(15, 20), &config, &mut roll);
        assert_eq!(result.kind, ProbeKind::NearMissed);
        assert!(s.scan().is_active());
        assert_eq!(s.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_scan_catches_bug() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(6);
        let mut s = session(30, Difficulty::Medium, &mut rng);
        s.place_bug(Position::new(1, 3), &config, &mut rng);

        assert_eq!(s.advance_scan(1002.0), ScanAdvance::Advanced);
        assert_eq!(s.advance_scan(1004.0), ScanAdvance::ReachedBug);
        assert_eq!(s.outcome(), Some(Outcome::CaughtByScan));
    }

    #[test]
    fn test_first_outcome_sticks() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(7);
        let mut s = session(30, Difficulty::Medium, &mut rng);
        s.place_bug(Position::new(9, 9), &config, &mut rng);

        s.stop();
        assert_eq!(s.outcome(), Some(Outcome::Stopped));
        s.probe(Position::new(9, 9), &config, &mut rng);
        assert_eq!(s.outcome(), Some(Outcome::Stopped));
    }

    #[test]
    fn test_stop_keeps_cursor() {
        let mut rng = DeterministicRng::new(8);
        let mut s = session(30, Difficulty::Easy, &mut rng);
        s.scan_mut().place_cursor(Position::new(4, 7));
        s.stop();
        assert_eq!(s.scan().cursor().position, Position::new(4, 7));
        assert!(!s.scan().is_active());
    }

    #[test]
    fn test_place_bug_regenerates_decoys() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(9);
        let mut s = session(30, Difficulty::Medium, &mut rng);
        s.place_bug(Position::new(-3, 0), &config, &mut rng);
        assert_eq!(s.bug(), Some(Position::ORIGIN));
        assert!(s.decoys().iter().all(|d| *d != Position::ORIGIN));
    }

    #[test]
    fn test_time_survived() {
        let mut rng = DeterministicRng::new(10);
        let s = session(30, Difficulty::Medium, &mut rng);
        assert_eq!(s.time_survived(1012.5), 12.5);
        assert_eq!(s.time_survived(900.0), 0.0);
    }
}
