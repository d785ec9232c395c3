//! Intra-vessel exchange neighborhoods.

use crate::evaluation::route_feasible;
use crate::solution::Solution;
use rand::seq::index;
use rand::Rng;
use std::ops::Range;

use super::{MoveOutcome, OperatorContext};

/// Swap two calls of one randomly chosen vessel route.
///
/// Only feasible results are kept, so a feasible solution stays feasible.
pub fn two_exchange<R: Rng>(
    solution: &mut Solution,
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> MoveOutcome {
    let (vessel, range) = match pick_route(solution, ctx, 2, rng) {
        Some(picked) => picked,
        None => return MoveOutcome::Unchanged,
    };

    let n = range.len();
    let budget = attempt_budget(n * (n - 1) / 2, ctx.settings.exchange_attempts);

    for _ in 0..budget {
        let picked = index::sample(rng, n, 2);
        let (a, b) = (range.start + picked.index(0), range.start + picked.index(1));
        if solution.sequence[a] == solution.sequence[b] {
            continue;
        }

        solution.sequence.swap(a, b);
        if route_feasible(ctx.problem, vessel, &solution.sequence[range.clone()]) {
            return MoveOutcome::Changed;
        }
        solution.sequence.swap(a, b);
    }

    MoveOutcome::Unchanged
}

/// Rotate three calls of one randomly chosen vessel route: the values at
/// positions `(a, b, c)` become `(c, a, b)`.
///
/// Only feasible results are kept, so a feasible solution stays feasible.
pub fn three_exchange<R: Rng>(
    solution: &mut Solution,
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> MoveOutcome {
    let (vessel, range) = match pick_route(solution, ctx, 3, rng) {
        Some(picked) => picked,
        None => return MoveOutcome::Unchanged,
    };

    let n = range.len();
    let budget = attempt_budget(n * (n - 1) * (n - 2) / 6, ctx.settings.exchange_attempts);

    for _ in 0..budget {
        let picked = index::sample(rng, n, 3);
        let a = range.start + picked.index(0);
        let b = range.start + picked.index(1);
        let c = range.start + picked.index(2);

        let seq = &mut solution.sequence;
        let (va, vb, vc) = (seq[a], seq[b], seq[c]);
        if va == vb && vb == vc {
            continue;
        }

        seq[a] = vc;
        seq[b] = va;
        seq[c] = vb;
        if route_feasible(ctx.problem, vessel, &seq[range.clone()]) {
            return MoveOutcome::Changed;
        }
        seq[a] = va;
        seq[b] = vb;
        seq[c] = vc;
    }

    MoveOutcome::Unchanged
}

/// Pick a vessel route with at least `min_len` calls uniformly at random.
fn pick_route<R: Rng>(
    solution: &Solution,
    ctx: &OperatorContext<'_>,
    min_len: usize,
    rng: &mut R,
) -> Option<(usize, Range<usize>)> {
    let candidates: Vec<(usize, Range<usize>)> = solution
        .group_ranges()
        .into_iter()
        .take(ctx.problem.vessel_count())
        .enumerate()
        .filter(|(_, range)| range.len() >= min_len)
        .collect();

    if candidates.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..candidates.len());
    candidates.into_iter().nth(pick)
}

/// Small routes get one attempt per distinct position set, larger ones a fixed cap.
fn attempt_budget(combinations: usize, cap: usize) -> usize {
    combinations.min(cap)
}
