//! Similarity-guided diversification.
//!
//! Two cargoes are similar for a vessel when their ports are close in sailing
//! time and their time windows overlap. A route whose cargoes are mutually
//! dissimilar is likely to waste sailing time, so its worst fitting cargo is
//! moved to a vessel where it fits better.

use crate::evaluation::route_feasible;
use crate::problem::Problem;
use crate::solution::Solution;
use itertools::Itertools;

use super::insertion::{insert_cargo, remove_cargo};
use super::{MoveOutcome, OperatorContext};

/// Dissimilarity assumed between a cargo and an idle vessel.
const IDLE_VESSEL_FIT: f64 = 0.5;

/// Per-vessel pairwise dissimilarity of compatible cargoes, normalized to `[0, 1]`.
pub struct SimilarityTable {
    cargo_count: usize,
    /// Indexed by `(vessel * cargoes + a) * cargoes + b` with zero-based cargo indices
    values: Vec<Option<f64>>,
}

impl SimilarityTable {
    pub fn new(problem: &Problem) -> Self {
        let n = problem.cargo_count();
        let mut values = vec![None; problem.vessel_count() * n * n];

        for vessel in 0..problem.vessel_count() {
            let compatible = &problem.vessels[vessel].compatible;
            let mut raw = Vec::new();
            let (mut time_max, mut window_max) = (0.0f64, 0.0f64);

            for (&a, &b) in compatible.iter().tuple_combinations() {
                let (time, window) = raw_distance(problem, vessel, a, b);
                time_max = time_max.max(time);
                window_max = window_max.max(window);
                raw.push((a, b, time, window));
            }

            for (a, b, time, window) in raw {
                let time = if time_max > 0.0 { time / time_max } else { 0.0 };
                let window = if window_max > 0.0 { window / window_max } else { 0.0 };
                let value = 0.5 * time + 0.5 * window;
                values[(vessel * n + a - 1) * n + b - 1] = Some(value);
                values[(vessel * n + b - 1) * n + a - 1] = Some(value);
            }
            for &a in compatible {
                values[(vessel * n + a - 1) * n + a - 1] = Some(0.0);
            }
        }

        SimilarityTable {
            cargo_count: n,
            values,
        }
    }

    /// Dissimilarity of two cargoes (one-based ids) on `vessel`, if both are compatible.
    pub fn dissimilarity(&self, vessel: usize, a: usize, b: usize) -> Option<f64> {
        let n = self.cargo_count;
        self.values[(vessel * n + a - 1) * n + b - 1]
    }

    /// Mean dissimilarity of `cargo` to the distinct cargoes of `calls`, excluding itself.
    pub fn fit(&self, vessel: usize, cargo: usize, calls: &[usize]) -> Option<f64> {
        let others: Vec<f64> = calls
            .iter()
            .copied()
            .unique()
            .filter(|&other| other != cargo)
            .map(|other| self.dissimilarity(vessel, cargo, other).unwrap_or(1.0))
            .collect();

        if others.is_empty() {
            None
        } else {
            Some(others.iter().sum::<f64>() / others.len() as f64)
        }
    }
}

/// Summed sailing time between the two origins and the two destinations, and
/// summed distance between the window bounds.
fn raw_distance(problem: &Problem, vessel: usize, a: usize, b: usize) -> (f64, f64) {
    let (ca, cb) = (problem.cargo(a), problem.cargo(b));
    let time = problem.arc(vessel, ca.origin, cb.origin).time
        + problem.arc(vessel, cb.origin, ca.origin).time
        + problem.arc(vessel, ca.destination, cb.destination).time
        + problem.arc(vessel, cb.destination, ca.destination).time;
    let window = (ca.pickup_window.lower - cb.pickup_window.lower).abs()
        + (ca.pickup_window.upper - cb.pickup_window.upper).abs()
        + (ca.delivery_window.lower - cb.delivery_window.lower).abs()
        + (ca.delivery_window.upper - cb.delivery_window.upper).abs();
    (time as f64 / 2.0, window as f64)
}

/// Move the least fitting cargo of the least coherent vessel route to the
/// vessel it fits best, if that vessel can take it feasibly.
///
/// Skipped when the worst dissimilarity is below `similarity_threshold`.
pub fn similarity_move(solution: &mut Solution, ctx: &OperatorContext<'_>) -> MoveOutcome {
    let problem = ctx.problem;
    let table = &ctx.similarity;
    let mut groups = solution.groups();

    // (vessel, route dissimilarity, worst cargo, its dissimilarity)
    let mut worst: Option<(usize, f64, usize, f64)> = None;
    for vessel in 0..problem.vessel_count() {
        let route = &groups[vessel];
        let scores: Vec<(usize, f64)> = route
            .iter()
            .copied()
            .unique()
            .filter_map(|cargo| table.fit(vessel, cargo, route).map(|fit| (cargo, fit)))
            .collect();
        if scores.is_empty() {
            continue;
        }

        let mean = scores.iter().map(|&(_, fit)| fit).sum::<f64>() / scores.len() as f64;
        let (cargo, fit) = scores
            .iter()
            .copied()
            .fold((0, f64::MIN), |best, s| if s.1 > best.1 { s } else { best });

        if worst.map_or(true, |(_, m, _, _)| mean > m) {
            worst = Some((vessel, mean, cargo, fit));
        }
    }

    let (origin, _, cargo, current_fit) = match worst {
        Some(found) => found,
        None => return MoveOutcome::Unchanged,
    };
    if current_fit < ctx.settings.similarity_threshold {
        return MoveOutcome::Unchanged;
    }

    let mut candidates: Vec<(usize, f64)> = (0..problem.vessel_count())
        .filter(|&v| v != origin && problem.is_compatible(v, cargo))
        .map(|v| (v, table.fit(v, cargo, &groups[v]).unwrap_or(IDLE_VESSEL_FIT)))
        .filter(|&(_, fit)| fit < current_fit)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut shortened = groups[origin].clone();
    remove_cargo(&mut shortened, cargo);
    if !route_feasible(problem, origin, &shortened) {
        return MoveOutcome::Unchanged;
    }

    for (destination, fit) in candidates {
        let mut route = groups[destination].clone();
        if insert_cargo(ctx, destination, &mut route, cargo) {
            log::trace!(
                "similarity move of cargo {} from vessel {} ({:.3}) to vessel {} ({:.3})",
                cargo,
                origin,
                current_fit,
                destination,
                fit
            );
            groups[origin] = shortened;
            groups[destination] = route;
            solution.set_groups(&groups);
            return MoveOutcome::Changed;
        }
    }

    MoveOutcome::Unchanged
}
