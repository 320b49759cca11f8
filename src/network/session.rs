//! Session Management
//!
//! The single owner of game state: at most one session exists at a
//! time, and starting a new one discards the previous one. Player stats
//! outlive sessions. The server wraps one `SessionManager` in a mutex so
//! the scan ticker and request handlers never interleave mutations.

use serde::{Serialize, Deserialize};
use tracing::{info, debug};

use crate::core::clock::Seconds;
use crate::core::position::Position;
use crate::core::rng::{DeterministicRng, RandomSource};
use crate::game::config::GameConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::leaderboard::{Leaderboard, LeaderboardEntry, PlayerStatRecord};
use crate::game::scan::{ScanAdvance, ScanStatus};
use crate::game::snippet::Snippet;
use crate::game::detection::ProbeResult;
use crate::game::state::{short_id, Difficulty, GameSession, Outcome, SessionId};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No game has been started (or it was reset).
    #[error("No active session")]
    NoActiveSession,
}

/// Returned when a game starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStart {
    /// New session id.
    pub session_id: SessionId,
    /// Where the scan begins.
    pub compiler_scan_position: Position,
    /// Seconds between scan advances.
    pub scan_speed: f64,
}

/// Result of polling the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPoll {
    /// Scan snapshot after the poll.
    pub scan_status: ScanStatus,
    /// Scan still running and not ended by this poll.
    pub game_active: bool,
    /// Seconds since the session started.
    pub time_elapsed: f64,
    /// This poll ended the session.
    pub game_over: bool,
}

/// Stats submitted by a player at the end of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSubmission {
    /// Player display name.
    pub player_name: String,
    /// Seconds survived.
    pub time_survived: f64,
    /// Outcome tag, e.g. "escaped", "caught", "timeout".
    pub status: String,
    /// Where the bug was.
    pub bug_location: Position,
}

/// Overview of the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Seconds since the session started.
    pub time_survived: f64,
    /// Hidden bug.
    pub bug_position: Option<Position>,
    /// Scan cursor.
    pub compiler_scan_position: Position,
    /// Scan running.
    pub game_active: bool,
    /// Number of decoys.
    pub fake_errors_count: usize,
}

/// Owns the one game session and the leaderboard.
pub struct SessionManager<R = DeterministicRng> {
    config: GameConfig,
    rng: R,
    session: Option<GameSession>,
    leaderboard: Leaderboard,
    events: Vec<GameEvent>,
}

impl<R: RandomSource> SessionManager<R> {
    /// Create a manager with no session.
    pub fn new(config: GameConfig, rng: R) -> Self {
        let leaderboard = Leaderboard::new(config.leaderboard_capacity);
        Self {
            config,
            rng,
            session: None,
            leaderboard,
            events: Vec::new(),
        }
    }

    /// Start a new game over `listing`, discarding any previous session.
    pub fn start_new_game(
        &mut self,
        player_name: &str,
        listing: &Snippet,
        difficulty: Difficulty,
        now: Seconds,
    ) -> GameStart {
        self.reset(now);

        let id = uuid::Uuid::new_v4();
        let session = GameSession::start(
            id,
            player_name,
            listing.line_count(),
            difficulty,
            now,
            &self.config,
            &mut self.rng,
        );

        let start = GameStart {
            session_id: id,
            compiler_scan_position: session.scan().cursor().position,
            scan_speed: session.scan().cursor().speed,
        };

        info!(
            "Session {} started for {} ({}, {} lines of {}, scan every {}s)",
            short_id(&id), player_name, difficulty, listing.line_count(), listing.filename, start.scan_speed
        );

        self.events.push(GameEvent::new(
            now,
            Some(id),
            GameEventData::SessionStarted {
                player_name: player_name.to_string(),
                difficulty,
                listing_lines: listing.line_count(),
                scan_speed: start.scan_speed,
            },
        ));
        self.session = Some(session);

        start
    }

    /// Drop the current session. Player stats are kept.
    pub fn reset(&mut self, now: Seconds) {
        if let Some(old) = self.session.take() {
            debug!("Session {} reset", short_id(&old.id));
            self.events.push(GameEvent::new(now, Some(old.id), GameEventData::SessionReset));
        }
    }

    /// Halt the scan without moving the cursor.
    ///
    /// Returns true if a running scan was stopped.
    pub fn stop(&mut self, now: Seconds) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let was_active = session.scan().is_active();
        let before = session.outcome();
        session.stop();
        self.note_transition(before, now);
        was_active
    }

    /// Advance the scan if it is due and report its state.
    pub fn poll_scan(&mut self, now: Seconds) -> Result<ScanPoll, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let before = session.outcome();
        let advance = session.advance_scan(now);
        if advance == ScanAdvance::Advanced {
            let pos = session.scan().cursor().position;
            debug!("Compiler scan moved to line {}, column {}", pos.line, pos.column);
        }

        let game_over = advance.is_terminal();
        let scan_status = session.scan_status();
        let poll = ScanPoll {
            game_active: scan_status.is_active && !game_over,
            time_elapsed: session.time_survived(now),
            scan_status,
            game_over,
        };
        self.note_transition(before, now);
        Ok(poll)
    }

    /// Resolve a probe at (`line`, `column`). Coordinates below 1 are clamped.
    pub fn probe(&mut self, line: i32, column: i32, now: Seconds) -> Result<ProbeResult, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let before = session.outcome();
        let result = session.probe(Position::new(line, column), &self.config, &mut self.rng);
        debug!("Probe at {:?}: {:?}", result.probe, result.kind);
        self.note_transition(before, now);
        Ok(result)
    }

    /// Hide the bug somewhere specific and regenerate decoys.
    ///
    /// Returns the number of decoys generated.
    pub fn place_bug(&mut self, position: Position) -> Result<usize, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.place_bug(position, &self.config, &mut self.rng);
        Ok(session.decoys().len())
    }

    /// Record a player's stats on the leaderboard.
    pub fn submit_stats(&mut self, submission: StatSubmission, now: Seconds) {
        info!(
            "Stats recorded for {}: {:.1}s ({})",
            submission.player_name, submission.time_survived, submission.status
        );
        self.events.push(GameEvent::new(
            now,
            self.session.as_ref().map(|s| s.id),
            GameEventData::StatsRecorded {
                player_name: submission.player_name.clone(),
                time_survived: submission.time_survived,
                status: submission.status.clone(),
            },
        ));
        self.leaderboard.record(PlayerStatRecord {
            player_name: submission.player_name,
            time_survived: submission.time_survived,
            status: submission.status,
            bug_location: submission.bug_location,
            recorded_at: chrono::Utc::now(),
        });
    }

    /// Top players by time survived. Uses the configured default when
    /// `limit` is `None`.
    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        self.leaderboard.top(limit.unwrap_or(self.config.leaderboard_default_limit))
    }

    /// Seconds since the current session started, or 0 with no session.
    pub fn time_survived(&self, now: Seconds) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.time_survived(now))
    }

    /// Overview of the current session.
    pub fn game_stats(&self, now: Seconds) -> Result<GameStats, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoActiveSession)?;
        Ok(GameStats {
            time_survived: session.time_survived(now),
            bug_position: session.bug(),
            compiler_scan_position: session.scan().cursor().position,
            game_active: session.scan().is_active(),
            fake_errors_count: session.decoys().len(),
        })
    }

    /// Whether a scan is currently running.
    pub fn is_scanning(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.scan().is_active())
    }

    fn note_transition(&mut self, before: Option<Outcome>, now: Seconds) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if before.is_some() {
            return;
        }
        if let Some(outcome) = session.outcome() {
            self.events.push(GameEvent::session_ended(
                now,
                session.id,
                outcome,
                session.scan().cursor().position,
                session.time_survived(now),
            ));
        }
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current session.
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Current session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    /// The leaderboard log.
    pub fn leaderboard_log(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Game tuning.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Random source shared with snippet and portal picks.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedSource;
    use crate::game::detection::ProbeKind;
    use crate::game::state::SessionPhase;

    fn listing(lines: usize) -> Snippet {
        Snippet {
            lines: vec!["x = 1".to_string(); lines],
            language: "python".to_string(),
            filename: "test.py".to_string(),
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(GameConfig::default(), DeterministicRng::new(42))
    }

    fn submission(name: &str, time: f64) -> StatSubmission {
        StatSubmission {
            player_name: name.to_string(),
            time_survived: time,
            status: "caught".to_string(),
            bug_location: Position::new(1, 1),
        }
    }

    #[test]
    fn test_no_session_is_explicit() {
        let mut m = manager();
        assert_eq!(m.poll_scan(10.0), Err(SessionError::NoActiveSession));
        assert_eq!(m.probe(1, 1, 10.0), Err(SessionError::NoActiveSession));
        assert_eq!(m.game_stats(10.0), Err(SessionError::NoActiveSession));
        assert_eq!(m.place_bug(Position::ORIGIN), Err(SessionError::NoActiveSession));
        assert_eq!(m.time_survived(10.0), 0.0);
        assert!(!m.stop(10.0));
        assert!(!m.is_scanning());
    }

    #[test]
    fn test_start_hard_game() {
        let mut m = manager();
        let start = m.start_new_game("ada", &listing(30), Difficulty::Hard, 100.0);
        assert_eq!(start.scan_speed, 1.0);
        assert_eq!(start.compiler_scan_position, Position::ORIGIN);
        assert!(m.is_scanning());
        assert_eq!(m.session().unwrap().id, start.session_id);
    }

    #[test]
    fn test_unknown_difficulty_plays_medium() {
        let mut m = manager();
        let start = m.start_new_game("ada", &listing(30), Difficulty::from_name("insane"), 100.0);
        assert_eq!(start.scan_speed, 2.0);
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut m = manager();
        let first = m.start_new_game("ada", &listing(30), Difficulty::Easy, 100.0);
        m.submit_stats(submission("ada", 5.0), 105.0);
        let second = m.start_new_game("bob", &listing(10), Difficulty::Medium, 200.0);

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(m.session().unwrap().player_name, "bob");
        assert_eq!(m.session().unwrap().listing_line_count(), 10);
        // Stats survive the reset
        assert_eq!(m.leaderboard(None).len(), 1);
    }

    #[test]
    fn test_reset_clears_session_but_not_stats() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Easy, 100.0);
        m.submit_stats(submission("ada", 5.0), 105.0);
        m.reset(110.0);

        assert!(m.session().is_none());
        assert_eq!(m.time_survived(120.0), 0.0);
        assert_eq!(m.leaderboard(None).len(), 1);

        // Resetting twice is fine
        m.reset(111.0);
    }

    #[test]
    fn test_direct_hit_stops_scan() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Medium, 100.0);
        m.place_bug(Position::new(15, 23)).unwrap();

        let result = m.probe(15, 23, 101.0).unwrap();
        assert!(result.hit());
        assert_eq!(result.message(), "Direct hit! Bug found! You escaped the compiler!");
        assert!(!m.is_scanning());
        assert_eq!(
            m.session().unwrap().phase(),
            SessionPhase::Terminated(Outcome::FoundByPlayer)
        );
    }

    #[test]
    fn test_near_hit_chance_without_decoys() {
        // Every int draw is 15: jitter clamps to (+10, +15)
        let mut m = SessionManager::new(GameConfig::default(), ScriptedSource::new(vec![15], vec![0.7]));
        m.start_new_game("ada", &listing(30), Difficulty::Medium, 100.0);
        m.place_bug(Position::new(15, 23)).unwrap();
        let decoys = m.session().unwrap().decoys();
        assert_eq!(decoys.len(), 15);
        assert!(decoys.iter().all(|d| *d == Position::new(25, 38)));

        let result = m.probe(15, 20, 101.0).unwrap();
        assert_eq!(result.detection_chance, Some(0.6));
        assert_eq!(result.kind, ProbeKind::NearMissed);
        assert!(m.is_scanning());
    }

    #[test]
    fn test_probe_coordinates_clamped() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Medium, 100.0);
        m.place_bug(Position::ORIGIN).unwrap();
        let result = m.probe(-4, 0, 101.0).unwrap();
        assert_eq!(result.probe, Position::ORIGIN);
        assert_eq!(result.kind, ProbeKind::DirectHit);
    }

    #[test]
    fn test_poll_reports_game_over_once() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Hard, 100.0);
        m.place_bug(Position::new(1, 2)).unwrap();

        let early = m.poll_scan(100.5).unwrap();
        assert!(early.game_active);
        assert!(!early.game_over);
        assert_eq!(early.time_elapsed, 0.5);

        let caught = m.poll_scan(101.0).unwrap();
        assert!(caught.game_over);
        assert!(!caught.game_active);
        assert_eq!(caught.scan_status.progress_percentage, 100.0);
        assert_eq!(caught.scan_status.estimated_time_remaining, 0.0);

        let after = m.poll_scan(102.0).unwrap();
        assert!(!after.game_over);
        assert!(!after.game_active);
    }

    #[test]
    fn test_empty_listing_exhausts() {
        let mut m = manager();
        m.start_new_game("ada", &listing(0), Difficulty::Medium, 100.0);
        assert!(m.session().unwrap().bug().is_none());

        let poll = m.poll_scan(102.0).unwrap();
        assert!(poll.game_over);
        assert_eq!(m.session().unwrap().outcome(), Some(Outcome::ListingExhausted));
    }

    #[test]
    fn test_stop_keeps_position() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Medium, 100.0);
        m.place_bug(Position::new(20, 20)).unwrap();
        m.poll_scan(102.0).unwrap();

        assert!(m.stop(103.0));
        assert!(!m.stop(104.0));
        let stats = m.game_stats(105.0).unwrap();
        assert_eq!(stats.compiler_scan_position, Position::new(1, 2));
        assert!(!stats.game_active);
        assert_eq!(stats.time_survived, 5.0);
    }

    #[test]
    fn test_events_lifecycle() {
        let mut m = manager();
        m.start_new_game("ada", &listing(30), Difficulty::Medium, 100.0);
        m.stop(101.0);
        m.submit_stats(submission("ada", 1.0), 102.0);
        m.reset(103.0);

        let events = m.take_events();
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e.data {
                GameEventData::SessionStarted { .. } => "started",
                GameEventData::SessionEnded { .. } => "ended",
                GameEventData::SessionReset => "reset",
                GameEventData::StatsRecorded { .. } => "stats",
            })
            .collect();
        assert_eq!(kinds, vec!["started", "ended", "stats", "reset"]);
        assert!(m.take_events().is_empty());
    }

    #[test]
    fn test_leaderboard_default_limit() {
        let mut m = manager();
        for i in 0..8 {
            m.submit_stats(submission(&format!("p{}", i), i as f64), 0.0);
        }
        let top = m.leaderboard(None);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].player_name, "p7");
        assert!(m.leaderboard(Some(0)).is_empty());
        assert_eq!(m.leaderboard(Some(100)).len(), 8);
    }
}
