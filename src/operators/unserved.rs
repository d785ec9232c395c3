//! Moves between the vessels and the unserved group.

use crate::evaluation::{route_feasible, route_load};
use crate::solution::Solution;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use super::insertion::{insert_cargo, remove_cargo};
use super::{MoveOutcome, OperatorContext};

/// Drop a random cargo from a random vessel into the unserved group.
pub fn move_to_unserved<R: Rng>(
    solution: &mut Solution,
    rng: &mut R,
    ctx: &OperatorContext<'_>,
) -> MoveOutcome {
    let unserved = ctx.problem.vessel_count();
    let mut groups = solution.groups();

    let loaded: Vec<usize> = (0..unserved).filter(|&v| !groups[v].is_empty()).collect();
    let vessel = match loaded.choose(rng) {
        Some(&vessel) => vessel,
        None => return MoveOutcome::Unchanged,
    };
    let cargoes: Vec<usize> = groups[vessel].iter().copied().unique().collect();
    let cargo = match cargoes.choose(rng) {
        Some(&cargo) => cargo,
        None => return MoveOutcome::Unchanged,
    };

    remove_cargo(&mut groups[vessel], cargo);
    if !route_feasible(ctx.problem, vessel, &groups[vessel]) {
        return MoveOutcome::Unchanged;
    }
    groups[unserved].push(cargo);
    groups[unserved].push(cargo);

    solution.set_groups(&groups);
    MoveOutcome::Changed
}

/// Assign unserved cargoes to vessels.
///
/// Cargoes are taken in order of decreasing penalty; each one is offered to
/// its compatible vessels in order of increasing load and kept on the first
/// vessel whose route stays feasible.
pub fn minimize_unserved(solution: &mut Solution, ctx: &OperatorContext<'_>) -> MoveOutcome {
    let problem = ctx.problem;
    let unserved = problem.vessel_count();
    let mut groups = solution.groups();

    let mut pending: Vec<usize> = groups[unserved].iter().copied().unique().collect();
    pending.sort_by_key(|&cargo| std::cmp::Reverse(problem.cargo(cargo).penalty));

    let mut moved = 0;
    for cargo in pending {
        let mut vessels: Vec<usize> = (0..unserved)
            .filter(|&v| problem.is_compatible(v, cargo))
            .collect();
        vessels.sort_by_key(|&v| route_load(problem, &groups[v]));

        for vessel in vessels {
            let mut route = groups[vessel].clone();
            if insert_cargo(ctx, vessel, &mut route, cargo) {
                groups[vessel] = route;
                remove_cargo(&mut groups[unserved], cargo);
                moved += 1;
                break;
            }
        }
    }

    if moved == 0 {
        return MoveOutcome::Unchanged;
    }
    log::trace!("assigned {} unserved cargoes", moved);
    solution.set_groups(&groups);
    MoveOutcome::Changed
}
