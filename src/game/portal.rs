//! Exit Portals
//!
//! Line-number hints shown to the player. Portals are unrelated to the
//! hidden bug; they only point somewhere in the listing.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;

/// A portal: a line and a clue about it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPortal {
    /// Listing line the portal sits on.
    pub line: i32,
    /// Hint text.
    pub clue: String,
}

impl ExitPortal {
    /// Create a portal.
    pub fn new(line: i32, clue: impl Into<String>) -> Self {
        Self { line, clue: clue.into() }
    }
}

/// A portal placed for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPortal {
    /// Listing line.
    pub line: i32,
    /// Hint text.
    pub clue: String,
    /// Visual x coordinate.
    pub x: i32,
    /// Visual y coordinate.
    pub y: i32,
    /// Human-readable summary.
    pub description: String,
}

const DEFAULT_PORTALS: &[(i32, &str)] = &[
    (5, "Look where functions begin their journey"),
    (12, "The middle ground holds secrets"),
    (18, "Where loops end, freedom starts"),
    (25, "The final return statement awaits"),
    (8, "Between the imports and the logic"),
    (33, "Deep in the nested conditions"),
    (41, "Where exceptions are handled with care"),
    (15, "The heart of the algorithm beats here"),
    (28, "Where variables get their final values"),
    (37, "In the shadow of the closing brace"),
    (3, "Near the top, before the real work begins"),
    (44, "At the end of all things"),
    (21, "Where the main logic branches"),
    (11, "Just after the setup, before the action"),
    (39, "In the cleanup section of the code"),
    (7, "Where constants are defined"),
    (30, "In the depths of the processing loop"),
    (16, "Where the critical calculation happens"),
    (23, "At the decision point of the algorithm"),
    (35, "Where error handling meets success"),
];

/// Visual placement bounds.
const X_RANGE: (i32, i32) = (50, 500);
const Y_RANGE: (i32, i32) = (50, 400);

/// The set of portals a player can be offered.
#[derive(Clone, Debug)]
pub struct PortalCatalog {
    portals: Vec<ExitPortal>,
}

impl Default for PortalCatalog {
    fn default() -> Self {
        Self {
            portals: DEFAULT_PORTALS
                .iter()
                .map(|(line, clue)| ExitPortal::new(*line, *clue))
                .collect(),
        }
    }
}

impl PortalCatalog {
    /// Catalog with no portals.
    pub fn empty() -> Self {
        Self { portals: Vec::new() }
    }

    /// Pick a portal uniformly at random.
    pub fn random<R: RandomSource>(&self, rng: &mut R) -> Option<&ExitPortal> {
        if self.portals.is_empty() {
            return None;
        }
        self.portals.get(rng.next_index(self.portals.len()))
    }

    /// Pick a portal and give it a random on-screen spot.
    pub fn random_placed<R: RandomSource>(&self, rng: &mut R) -> Option<PlacedPortal> {
        let portal = self.random(rng)?.clone();
        let x = rng.next_int_range(X_RANGE.0, X_RANGE.1);
        let y = rng.next_int_range(Y_RANGE.0, Y_RANGE.1);
        Some(PlacedPortal {
            description: format!("Exit Portal at line {}: {}", portal.line, portal.clue),
            line: portal.line,
            clue: portal.clue,
            x,
            y,
        })
    }

    /// First portal on `line`.
    pub fn by_line(&self, line: i32) -> Option<&ExitPortal> {
        self.portals.iter().find(|p| p.line == line)
    }

    /// Portals with `start <= line <= end`, in catalog order.
    pub fn in_range(&self, start: i32, end: i32) -> Vec<&ExitPortal> {
        self.portals
            .iter()
            .filter(|p| p.line >= start && p.line <= end)
            .collect()
    }

    /// Add a portal.
    pub fn add(&mut self, line: i32, clue: impl Into<String>) {
        self.portals.push(ExitPortal::new(line, clue));
    }

    /// All portals.
    pub fn all(&self) -> &[ExitPortal] {
        &self.portals
    }
}
