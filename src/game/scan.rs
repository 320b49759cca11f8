//! Compiler Scan
//!
//! The scan cursor sweeps the listing one column at a time, wrapping to
//! the next line after `max_columns_per_line`. It advances only when
//! polled and only when at least `speed` seconds have passed since the
//! previous advance, so polling early or often is harmless.

use serde::{Serialize, Deserialize};

use crate::core::clock::Seconds;
use crate::core::position::Position;

/// The scan cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanCursor {
    /// Current sweep position.
    pub position: Position,
    /// Whether the scan is still running.
    pub active: bool,
    /// Seconds between advances.
    pub speed: f64,
    /// When the cursor last advanced (or was started).
    pub last_advance: Seconds,
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self {
            position: Position::ORIGIN,
            active: false,
            speed: 2.0,
            last_advance: 0.0,
        }
    }
}

/// Outcome of a single poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanAdvance {
    /// Not active, or not due yet.
    Idle,
    /// Cursor moved one step and the scan continues.
    Advanced,
    /// Cursor reached or passed the bug. Scan stopped.
    ReachedBug,
    /// Cursor ran off the end of the listing. Scan stopped.
    ListingExhausted,
}

impl ScanAdvance {
    /// Did this poll end the scan?
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanAdvance::ReachedBug | ScanAdvance::ListingExhausted)
    }
}

/// Point-in-time view of the scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Cursor line.
    pub current_line: i32,
    /// Cursor column.
    pub current_column: i32,
    /// Whether the scan is running.
    pub is_active: bool,
    /// Seconds between advances.
    pub scan_speed: f64,
    /// Share of the listing swept, 0-100.
    pub progress_percentage: f64,
    /// Seconds until the scan sweeps the whole listing.
    pub estimated_time_remaining: f64,
}

/// Check whether the cursor has reached the bug.
///
/// Any line past the bug's line counts as reached regardless of column;
/// on the bug's own line the cursor must be at or past its column.
#[inline]
pub fn reached(cursor: Position, bug: Position) -> bool {
    cursor.line > bug.line || (cursor.line == bug.line && cursor.column >= bug.column)
}

/// Owns the scan cursor for one listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanEngine {
    cursor: ScanCursor,
    listing_line_count: i32,
    max_columns_per_line: i32,
}

impl ScanEngine {
    /// Create an inactive engine for a listing.
    pub fn new(listing_line_count: i32, max_columns_per_line: i32) -> Self {
        Self {
            cursor: ScanCursor::default(),
            listing_line_count: listing_line_count.max(0),
            max_columns_per_line: max_columns_per_line.max(1),
        }
    }

    /// Activate the scan at the top of the listing.
    pub fn start(&mut self, speed: f64, now: Seconds) {
        self.cursor = ScanCursor {
            position: Position::ORIGIN,
            active: true,
            speed: speed.max(0.0),
            last_advance: now,
        };
    }

    /// Halt the scan, leaving the cursor where it is.
    pub fn stop(&mut self) {
        self.cursor.active = false;
    }

    /// Move the cursor, keeping the column on the listing.
    pub fn place_cursor(&mut self, position: Position) {
        self.cursor.position = Position::new(
            position.line,
            position.column.min(self.max_columns_per_line),
        );
    }

    /// Advance one step if the scan is active and due, then check
    /// whether it reached `bug` or ran past the last line.
    pub fn advance_if_due(&mut self, now: Seconds, bug: Option<Position>) -> ScanAdvance {
        if !self.cursor.active {
            return ScanAdvance::Idle;
        }
        if now - self.cursor.last_advance < self.cursor.speed {
            return ScanAdvance::Idle;
        }

        self.step();
        self.cursor.last_advance = now;

        if bug.is_some_and(|b| reached(self.cursor.position, b)) {
            self.cursor.active = false;
            return ScanAdvance::ReachedBug;
        }

        if self.cursor.position.line > self.listing_line_count {
            self.cursor.active = false;
            return ScanAdvance::ListingExhausted;
        }

        ScanAdvance::Advanced
    }

    fn step(&mut self) {
        let mut next = self.cursor.position;
        next.column += 1;
        if next.column > self.max_columns_per_line {
            next.column = 1;
            next.line += 1;
        }
        self.cursor.position = next;
    }

    /// Snapshot the scan. An inactive scan always reports 100% progress
    /// and no time remaining.
    pub fn status(&self) -> ScanStatus {
        let cursor = &self.cursor;
        let (progress, remaining) = if cursor.active {
            let total = self.listing_line_count as i64 * self.max_columns_per_line as i64;
            if total <= 0 {
                (100.0, 0.0)
            } else {
                let current = cursor.position.linear_index(self.max_columns_per_line);
                let progress = (current as f64 / total as f64 * 100.0).min(100.0);
                let left = (total - current).max(0);
                (progress, left as f64 * cursor.speed)
            }
        } else {
            (100.0, 0.0)
        };

        ScanStatus {
            current_line: cursor.position.line,
            current_column: cursor.position.column,
            is_active: cursor.active,
            scan_speed: cursor.speed,
            progress_percentage: progress,
            estimated_time_remaining: remaining,
        }
    }

    /// The cursor.
    pub fn cursor(&self) -> &ScanCursor {
        &self.cursor
    }

    /// Whether the scan is running.
    pub fn is_active(&self) -> bool {
        self.cursor.active
    }

    /// Lines in the listing being scanned.
    pub fn listing_line_count(&self) -> i32 {
        self.listing_line_count
    }

    /// Line width seen by the cursor.
    pub fn max_columns_per_line(&self) -> i32 {
        self.max_columns_per_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(lines: i32, speed: f64) -> ScanEngine {
        let mut engine = ScanEngine::new(lines, 80);
        engine.start(speed, 100.0);
        engine
    }

    #[test]
    fn test_not_due_is_idle() {
        let mut engine = running(20, 2.0);
        assert_eq!(engine.advance_if_due(101.9, None), ScanAdvance::Idle);
        assert_eq!(engine.cursor().position, Position::ORIGIN);
        assert_eq!(engine.cursor().last_advance, 100.0);
    }

    #[test]
    fn test_due_advances_one_column() {
        let mut engine = running(20, 2.0);
        assert_eq!(engine.advance_if_due(102.0, None), ScanAdvance::Advanced);
        assert_eq!(engine.cursor().position, Position::new(1, 2));
        assert_eq!(engine.cursor().last_advance, 102.0);

        // A late poll still only moves one step
        assert_eq!(engine.advance_if_due(150.0, None), ScanAdvance::Advanced);
        assert_eq!(engine.cursor().position, Position::new(1, 3));
    }

    #[test]
    fn test_inactive_never_moves() {
        let mut engine = ScanEngine::new(20, 80);
        assert_eq!(engine.advance_if_due(1e9, None), ScanAdvance::Idle);
        assert_eq!(engine.cursor().position, Position::ORIGIN);
    }

    #[test]
    fn test_wraps_at_line_end() {
        let mut engine = running(20, 1.0);
        engine.place_cursor(Position::new(10, 80));
        assert_eq!(engine.advance_if_due(101.0, None), ScanAdvance::Advanced);
        assert_eq!(engine.cursor().position, Position::new(11, 1));
    }

    #[test]
    fn test_place_cursor_clamps_column() {
        let mut engine = running(20, 1.0);
        engine.place_cursor(Position::new(3, 500));
        assert_eq!(engine.cursor().position, Position::new(3, 80));
    }

    #[test]
    fn test_reaches_bug_on_same_line() {
        let mut engine = running(20, 1.0);
        engine.place_cursor(Position::new(15, 22));
        let bug = Some(Position::new(15, 23));
        assert_eq!(engine.advance_if_due(101.0, bug), ScanAdvance::ReachedBug);
        assert!(!engine.is_active());
        assert_eq!(engine.cursor().position, bug.unwrap());
    }

    #[test]
    fn test_next_line_counts_as_reached() {
        assert!(reached(Position::new(6, 1), Position::new(5, 50)));
        assert!(!reached(Position::new(5, 49), Position::new(5, 50)));
        assert!(reached(Position::new(5, 50), Position::new(5, 50)));

        // Bug column beyond the scanned width: only the wrap catches it
        let mut engine = running(20, 1.0);
        engine.place_cursor(Position::new(5, 80));
        let bug = Some(Position::new(5, 95));
        assert_eq!(engine.advance_if_due(101.0, bug), ScanAdvance::ReachedBug);
        assert_eq!(engine.cursor().position, Position::new(6, 1));
    }

    #[test]
    fn test_exhausts_listing() {
        let mut engine = running(2, 1.0);
        engine.place_cursor(Position::new(2, 80));
        assert_eq!(engine.advance_if_due(101.0, None), ScanAdvance::ListingExhausted);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_empty_listing_exhausts_on_first_advance() {
        let mut engine = running(0, 1.0);
        let result = engine.advance_if_due(101.0, None);
        assert_eq!(result, ScanAdvance::ListingExhausted);
        assert!(result.is_terminal());
    }

    #[test]
    fn test_status_progress() {
        let mut engine = running(10, 2.0);
        engine.place_cursor(Position::new(2, 40));
        let status = engine.status();
        // (1 * 80 + 40) / 800
        assert!((status.progress_percentage - 15.0).abs() < 1e-9);
        assert!((status.estimated_time_remaining - 680.0 * 2.0).abs() < 1e-9);
        assert_eq!(status.current_line, 2);
        assert_eq!(status.current_column, 40);
        assert!(status.is_active);
    }

    #[test]
    fn test_status_inactive_reports_complete() {
        let mut engine = running(10, 2.0);
        engine.place_cursor(Position::new(2, 40));
        engine.stop();
        let status = engine.status();
        assert_eq!(status.progress_percentage, 100.0);
        assert_eq!(status.estimated_time_remaining, 0.0);
        assert_eq!((status.current_line, status.current_column), (2, 40));
    }

    #[test]
    fn test_status_empty_listing() {
        let engine = running(0, 2.0);
        let status = engine.status();
        assert_eq!(status.progress_percentage, 100.0);
        assert_eq!(status.estimated_time_remaining, 0.0);
    }

    proptest! {
        #[test]
        fn prop_column_stays_on_line(lines in 1i32..30, width in 1i32..100, polls in 0usize..400) {
            let mut engine = ScanEngine::new(lines, width);
            engine.start(1.0, 0.0);
            let mut previous = engine.cursor().position;
            for i in 0..polls {
                engine.advance_if_due((i + 1) as f64, None);
                let pos = engine.cursor().position;
                prop_assert!(pos.column >= 1 && pos.column <= width);
                if pos.line != previous.line {
                    prop_assert_eq!(pos.line, previous.line + 1);
                    prop_assert_eq!(pos.column, 1);
                }
                previous = pos;
            }
        }

        #[test]
        fn prop_last_advance_is_monotone(gaps in proptest::collection::vec(0.0f64..3.0, 0..50)) {
            let mut engine = ScanEngine::new(50, 80);
            engine.start(1.0, 0.0);
            let mut now = 0.0;
            let mut last = engine.cursor().last_advance;
            for gap in gaps {
                now += gap;
                engine.advance_if_due(now, None);
                prop_assert!(engine.cursor().last_advance >= last);
                last = engine.cursor().last_advance;
            }
        }
    }
}
