//! Decoy Placement
//!
//! Scatters "fake error" positions around the bug so that probes near
//! it are harder to resolve. Decoys are jittered independently, so two
//! decoys may share a position. No decoy ever sits on the bug itself.

use tracing::debug;

use crate::core::position::Position;
use crate::core::rng::RandomSource;
use crate::game::config::DecoyConfig;

/// Generate decoys around `bug`, sampling the count from the configured range.
pub fn generate_decoys<R: RandomSource>(
    bug: Position,
    config: &DecoyConfig,
    rng: &mut R,
) -> Vec<Position> {
    let count = rng.next_int_range(config.min_count, config.max_count).max(0) as usize;
    generate_decoys_with_count(bug, count, config, rng)
}

/// Generate up to `count` decoys around `bug`.
///
/// A draw that lands exactly on the bug is redrawn, at most
/// `max_redraws` times, and dropped if it still hits the bug.
pub fn generate_decoys_with_count<R: RandomSource>(
    bug: Position,
    count: usize,
    config: &DecoyConfig,
    rng: &mut R,
) -> Vec<Position> {
    let mut decoys = Vec::with_capacity(count);

    for _ in 0..count {
        let mut attempts = 0;
        loop {
            let d_line = rng.next_int_range(-config.line_jitter, config.line_jitter);
            let d_column = rng.next_int_range(-config.column_jitter, config.column_jitter);
            let candidate = bug.offset(d_line, d_column);

            if candidate != bug {
                decoys.push(candidate);
                break;
            }

            attempts += 1;
            if attempts > config.max_redraws {
                debug!("Dropping decoy after {} draws onto the bug at {:?}", attempts, bug);
                break;
            }
        }
    }

    decoys
}
