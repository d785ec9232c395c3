//! Insertion of a cargo into a vessel route.

use crate::evaluation::{route_cost, route_feasible};
use crate::problem::Problem;

use super::permutations::DistinctPermutations;
use super::OperatorContext;

/// Append both calls of `cargo` to the route of `vessel`.
///
/// Routes up to the brute-force threshold are reordered to their cheapest
/// feasible ordering; longer routes keep the appended order. Returns whether
/// the resulting route is feasible.
pub fn insert_cargo(
    ctx: &OperatorContext<'_>,
    vessel: usize,
    route: &mut Vec<usize>,
    cargo: usize,
) -> bool {
    route.push(cargo);
    route.push(cargo);

    if route.len() <= ctx.settings.brute_force_threshold {
        if let Some(best) = best_ordering(ctx.problem, vessel, route) {
            *route = best;
            return true;
        }
        return false;
    }

    route_feasible(ctx.problem, vessel, route)
}

/// Cheapest feasible ordering of `calls` for `vessel`, trying every distinct ordering.
pub fn best_ordering(problem: &Problem, vessel: usize, calls: &[usize]) -> Option<Vec<usize>> {
    DistinctPermutations::new(calls)
        .filter(|candidate| route_feasible(problem, vessel, candidate))
        .min_by_key(|candidate| route_cost(problem, vessel, candidate))
}

/// Remove both calls of `cargo` from `route`.
pub fn remove_cargo(route: &mut Vec<usize>, cargo: usize) {
    route.retain(|&c| c != cargo);
}
