//! Listing Coordinates
//!
//! Integer (line, column) positions inside a code listing, plus the
//! containment checks used by the scan and the detection evaluator.
//! Lines and columns are 1-based; anything below 1 is clamped up.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A 1-based (line, column) coordinate in a listing.
///
/// Deserialization goes through [`Position::new`], so decoded positions
/// are clamped like constructed ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPosition")]
pub struct Position {
    /// Line number (>= 1)
    pub line: i32,
    /// Column number (>= 1)
    pub column: i32,
}

impl Position {
    /// Top-left corner of every listing.
    pub const ORIGIN: Self = Self { line: 1, column: 1 };

    /// Create a position, flooring both coordinates at 1.
    #[inline]
    pub fn new(line: i32, column: i32) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
        }
    }

    /// Shift by a (line, column) offset, flooring the result at 1.
    #[inline]
    pub fn offset(self, d_line: i32, d_column: i32) -> Self {
        Self::new(
            self.line.saturating_add(d_line),
            self.column.saturating_add(d_column),
        )
    }

    /// Absolute line distance.
    #[inline]
    pub fn line_distance(self, other: Self) -> i32 {
        (self.line - other.line).abs()
    }

    /// Absolute column distance.
    #[inline]
    pub fn column_distance(self, other: Self) -> i32 {
        (self.column - other.column).abs()
    }

    /// Check if `other` lies inside the box of half-extents
    /// `line_tol` x `column_tol` centred on `self` (inclusive).
    #[inline]
    pub fn within(self, other: Self, line_tol: i32, column_tol: i32) -> bool {
        self.line_distance(other) <= line_tol && self.column_distance(other) <= column_tol
    }

    /// Zero-based index of this position in row-major order for a
    /// listing `columns_per_line` wide, plus one.
    #[inline]
    pub fn linear_index(self, columns_per_line: i32) -> i64 {
        (self.line as i64 - 1) * columns_per_line as i64 + self.column as i64
    }
}

/// Unchecked wire form of [`Position`].
#[derive(Deserialize)]
struct RawPosition {
    line: i32,
    column: i32,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        Position::new(raw.line, raw.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Collect all positions in `candidates` within `radius` lines and
/// columns of `center`.
pub fn positions_near(center: Position, candidates: &[Position], radius: i32) -> Vec<Position> {
    candidates
        .iter()
        .copied()
        .filter(|p| center.within(*p, radius, radius))
        .collect()
}
