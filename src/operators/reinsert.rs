//! Cross-vessel reinsertion neighborhood.

use crate::solution::Solution;
use itertools::Itertools;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::insertion::{insert_cargo, remove_cargo};
use super::{MoveOutcome, OperatorContext};

/// Move one random cargo from one group to another.
///
/// The destination is drawn with the unserved group weighted by
/// `unserved_weight` relative to a vessel. Moves onto incompatible vessels
/// are skipped. The result may be infeasible.
pub fn reinsert_once<R: Rng>(
    solution: &mut Solution,
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> MoveOutcome {
    let mut groups = solution.groups();
    if !relocate_random(&mut groups, rng, ctx) {
        return MoveOutcome::Unchanged;
    }
    solution.set_groups(&groups);
    MoveOutcome::Changed
}

/// Relocate one random cargo between decoded groups. Returns whether anything moved.
pub(crate) fn relocate_random<R: Rng>(
    groups: &mut [Vec<usize>],
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> bool {
    let unserved = ctx.problem.vessel_count();

    let origins: Vec<usize> = (0..groups.len()).filter(|&g| !groups[g].is_empty()).collect();
    let origin = match origins.choose(rng) {
        Some(&origin) => origin,
        None => return false,
    };

    let weights: Vec<f64> = (0..groups.len())
        .map(|g| {
            if g == origin {
                0.0
            } else if g == unserved {
                ctx.settings.unserved_weight
            } else {
                1.0
            }
        })
        .collect();
    let destination = match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => return false,
    };

    let cargoes: Vec<usize> = groups[origin].iter().copied().unique().collect();
    let cargo = match cargoes.choose(rng) {
        Some(&cargo) => cargo,
        None => return false,
    };

    if destination != unserved && !ctx.problem.is_compatible(destination, cargo) {
        return false;
    }

    remove_cargo(&mut groups[origin], cargo);
    if destination == unserved {
        groups[unserved].push(cargo);
        groups[unserved].push(cargo);
    } else {
        insert_cargo(ctx, destination, &mut groups[destination], cargo);
    }

    log::trace!(
        "reinsert cargo {} from group {} to group {}",
        cargo,
        origin,
        destination
    );
    true
}
