//! Probe Detection
//!
//! Resolves a player's probe against the hidden bug. An exact match
//! always hits. A probe close to the bug hits only with some chance,
//! and every decoy near the probe lowers that chance.

use serde::{Serialize, Deserialize};

use crate::core::position::{Position, positions_near};
use crate::core::rng::RandomSource;
use crate::game::config::DetectionConfig;

/// Message for an exact hit.
pub const MSG_DIRECT_HIT: &str = "Direct hit! Bug found! You escaped the compiler!";
/// Message for a near hit that was detected.
pub const MSG_NEAR_DETECTED: &str = "Bug detected nearby! Keep searching...";
/// Message for a near hit lost to interference.
pub const MSG_NEAR_MISSED: &str = "Something's not right here...";
/// Message for a probe nowhere near the bug.
pub const MSG_MISS: &str = "No bug detected at this location";

/// How a probe resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Probe is exactly on the bug.
    DirectHit,
    /// Near the bug and the detection roll succeeded.
    NearDetected,
    /// Near the bug but the detection roll failed.
    NearMissed,
    /// Not near the bug.
    Miss,
}

impl ProbeKind {
    /// Whether the player is told they hit.
    pub fn is_hit(self) -> bool {
        matches!(self, ProbeKind::DirectHit | ProbeKind::NearDetected)
    }

    /// Message shown to the player.
    pub fn message(self) -> &'static str {
        match self {
            ProbeKind::DirectHit => MSG_DIRECT_HIT,
            ProbeKind::NearDetected => MSG_NEAR_DETECTED,
            ProbeKind::NearMissed => MSG_NEAR_MISSED,
            ProbeKind::Miss => MSG_MISS,
        }
    }
}

/// Full result of resolving a probe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The (clamped) probed position.
    pub probe: Position,
    /// Resolution.
    pub kind: ProbeKind,
    /// Chance used for the detection roll (near hits only).
    pub detection_chance: Option<f64>,
    /// Decoys that interfered with the roll.
    pub nearby_decoys: usize,
}

impl ProbeResult {
    /// Whether the player is told they hit.
    pub fn hit(&self) -> bool {
        self.kind.is_hit()
    }

    /// Message shown to the player.
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Detection chance given the number of interfering decoys.
pub fn detection_chance(nearby_decoys: usize, config: &DetectionConfig) -> f64 {
    let interference = config.interference_per_decoy * nearby_decoys as f64;
    (config.base_chance - interference).max(config.min_chance)
}

/// Resolve `probe` against `bug`.
///
/// Only near hits consume randomness: exactly one unit draw each.
pub fn evaluate_probe<R: RandomSource>(
    probe: Position,
    bug: Option<Position>,
    decoys: &[Position],
    config: &DetectionConfig,
    rng: &mut R,
) -> ProbeResult {
    let miss = ProbeResult {
        probe,
        kind: ProbeKind::Miss,
        detection_chance: None,
        nearby_decoys: 0,
    };

    let Some(bug) = bug else {
        return miss;
    };

    if probe == bug {
        return ProbeResult { kind: ProbeKind::DirectHit, ..miss };
    }

    if !bug.within(probe, config.near_line_tolerance, config.near_column_tolerance) {
        return miss;
    }

    let nearby = positions_near(probe, decoys, config.interference_radius).len();
    let chance = detection_chance(nearby, config);
    let kind = if rng.next_unit() < chance {
        ProbeKind::NearDetected
    } else {
        ProbeKind::NearMissed
    };

    ProbeResult {
        probe,
        kind,
        detection_chance: Some(chance),
        nearby_decoys: nearby,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{DeterministicRng, ScriptedSource};
    use proptest::prelude::*;

    const BUG: Position = Position { line: 15, column: 23 };

    fn eval(probe: Position, decoys: &[Position], roll: f64) -> ProbeResult {
        let mut src = ScriptedSource::units(vec![roll]);
        evaluate_probe(probe, Some(BUG), decoys, &DetectionConfig::default(), &mut src)
    }

    #[test]
    fn test_direct_hit() {
        let result = eval(BUG, &[], 0.99);
        assert_eq!(result.kind, ProbeKind::DirectHit);
        assert!(result.hit());
        assert_eq!(result.message(), MSG_DIRECT_HIT);
        assert_eq!(result.detection_chance, None);
    }

    #[test]
    fn test_near_hit_without_decoys() {
        let result = eval(Position::new(15, 20), &[], 0.59);
        assert_eq!(result.detection_chance, Some(0.6));
        assert_eq!(result.kind, ProbeKind::NearDetected);
        assert_eq!(result.message(), MSG_NEAR_DETECTED);

        let result = eval(Position::new(15, 20), &[], 0.6);
        assert_eq!(result.kind, ProbeKind::NearMissed);
        assert!(!result.hit());
        assert_eq!(result.message(), MSG_NEAR_MISSED);
    }

    #[test]
    fn test_interference_lowers_chance() {
        let decoys = [Position::new(14, 19), Position::new(16, 22)];
        let result = eval(Position::new(15, 20), &decoys, 0.45);
        assert_eq!(result.nearby_decoys, 2);
        let chance = result.detection_chance.unwrap();
        assert!((chance - 0.4).abs() < 1e-9);
        assert_eq!(result.kind, ProbeKind::NearMissed);
    }

    #[test]
    fn test_chance_floor() {
        let config = DetectionConfig::default();
        assert_eq!(detection_chance(0, &config), 0.6);
        assert_eq!(detection_chance(3, &config), 0.3);
        assert_eq!(detection_chance(12, &config), 0.3);
    }

    #[test]
    fn test_far_decoys_do_not_interfere() {
        let decoys = [Position::new(20, 20), Position::new(15, 30)];
        let result = eval(Position::new(15, 20), &decoys, 0.0);
        assert_eq!(result.nearby_decoys, 0);
    }

    #[test]
    fn test_far_miss() {
        let result = eval(Position::new(18, 23), &[], 0.0);
        assert_eq!(result.kind, ProbeKind::Miss);
        assert_eq!(result.message(), MSG_MISS);
        let result = eval(Position::new(15, 29), &[], 0.0);
        assert_eq!(result.kind, ProbeKind::Miss);
    }

    #[test]
    fn test_no_bug_is_miss() {
        let mut src = ScriptedSource::units(vec![0.0]);
        let result = evaluate_probe(BUG, None, &[], &DetectionConfig::default(), &mut src);
        assert_eq!(result.kind, ProbeKind::Miss);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let decoys = [Position::new(14, 21)];
        let config = DetectionConfig::default();
        let mut a = DeterministicRng::new(77);
        let mut b = DeterministicRng::new(77);
        for _ in 0..50 {
            let ra = evaluate_probe(Position::new(16, 21), Some(BUG), &decoys, &config, &mut a);
            let rb = evaluate_probe(Position::new(16, 21), Some(BUG), &decoys, &config, &mut b);
            assert_eq!(ra, rb);
        }
    }

    proptest! {
        #[test]
        fn prop_direct_hit_iff_equal(
            bl in 1i32..100, bc in 1i32..80,
            pl in 1i32..100, pc in 1i32..80,
            seed in any::<u64>(),
        ) {
            let bug = Position::new(bl, bc);
            let probe = Position::new(pl, pc);
            let mut rng = DeterministicRng::new(seed);
            let result = evaluate_probe(probe, Some(bug), &[], &DetectionConfig::default(), &mut rng);
            prop_assert_eq!(result.kind == ProbeKind::DirectHit, probe == bug);
        }
    }
}
