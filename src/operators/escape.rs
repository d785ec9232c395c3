//! Large perturbations used when the search stagnates.

use crate::evaluation::is_feasible;
use crate::solution::{encode, Solution};
use rand::Rng;

use super::reinsert::relocate_random;
use super::{MoveOutcome, OperatorContext};

/// Chain between one and `escape_moves` random reinsertions.
///
/// Unlike the regular operators an escape only ever commits a feasible
/// solution: the chain is retried up to `escape_attempts` times and the
/// solution is left untouched if none of the chains ends feasible.
pub fn escape<R: Rng>(
    solution: &mut Solution,
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> MoveOutcome {
    let settings = ctx.settings;
    let mut candidate = solution.clone();

    for _ in 0..settings.escape_attempts {
        let mut groups = solution.groups();
        let moves = rng.gen_range(1..=settings.escape_moves);
        let mut changed = false;
        for _ in 0..moves {
            changed |= relocate_random(&mut groups, rng, ctx);
        }
        if !changed {
            continue;
        }

        candidate.sequence = encode(&groups);
        if candidate.sequence != solution.sequence && is_feasible(ctx.problem, &candidate) {
            solution.copy_from(&candidate);
            return MoveOutcome::Changed;
        }
    }

    MoveOutcome::Unchanged
}
