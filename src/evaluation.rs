//! Feasibility checks and cost evaluation.
//!
//! Feasibility and cost are computed by two separate walks over a vessel's
//! calls. Neither walk allocates beyond a small list of cargoes on board.

use crate::problem::{Cost, Problem};
use crate::solution::Solution;

/// Check every vessel route of `solution`. The unserved group is always feasible.
pub fn is_feasible(problem: &Problem, solution: &Solution) -> bool {
    solution
        .decode()
        .iter()
        .take(problem.vessel_count())
        .enumerate()
        .all(|(vessel, calls)| route_feasible(problem, vessel, calls))
}

/// Total cost of `solution`: sailing and port costs of every vessel plus the
/// penalty of every unserved cargo.
pub fn objective_value(problem: &Problem, solution: &Solution) -> Cost {
    let groups = solution.decode();
    let (unserved, routes) = match groups.split_last() {
        Some(split) => split,
        None => return 0,
    };

    let sailing: Cost = routes
        .iter()
        .take(problem.vessel_count())
        .enumerate()
        .map(|(vessel, calls)| route_cost(problem, vessel, calls))
        .sum();

    sailing + unserved_cost(problem, unserved)
}

/// Simulate the voyage of `vessel` through `calls`.
///
/// The first occurrence of a cargo is its pickup, the second its delivery.
/// Service starts no earlier than the window's lower bound and must be
/// completed by its upper bound. The load may never exceed the capacity.
pub fn route_feasible(problem: &Problem, vessel: usize, calls: &[usize]) -> bool {
    let ship = &problem.vessels[vessel];
    let mut time = ship.start_time;
    let mut port = ship.home_port;
    let mut load = 0;
    let mut on_board: Vec<usize> = Vec::with_capacity(calls.len() / 2);

    for &id in calls {
        let cargo = problem.cargo(id);
        let terms = match problem.terms(vessel, id) {
            Some(terms) => terms,
            None => return false,
        };

        let (next_port, window, service) = match on_board.iter().position(|&c| c == id) {
            Some(pos) => {
                on_board.swap_remove(pos);
                load -= cargo.size;
                (cargo.destination, cargo.delivery_window, terms.delivery_time)
            }
            None => {
                on_board.push(id);
                load += cargo.size;
                (cargo.origin, cargo.pickup_window, terms.pickup_time)
            }
        };

        time += problem.arc(vessel, port, next_port).time;
        time = time.max(window.lower) + service;
        if time > window.upper || load > ship.capacity {
            return false;
        }
        port = next_port;
    }

    true
}

/// Sailing plus port cost of `vessel` serving `calls`, regardless of feasibility.
///
/// Port costs of incompatible cargoes are not defined and contribute nothing.
pub fn route_cost(problem: &Problem, vessel: usize, calls: &[usize]) -> Cost {
    let mut port = problem.vessels[vessel].home_port;
    let mut cost = 0;
    let mut on_board: Vec<usize> = Vec::with_capacity(calls.len() / 2);

    for &id in calls {
        let cargo = problem.cargo(id);
        let terms = problem.terms(vessel, id);

        let next_port = match on_board.iter().position(|&c| c == id) {
            Some(pos) => {
                on_board.swap_remove(pos);
                cost += terms.map_or(0, |t| t.delivery_cost);
                cargo.destination
            }
            None => {
                on_board.push(id);
                cost += terms.map_or(0, |t| t.pickup_cost);
                cargo.origin
            }
        };

        cost += problem.arc(vessel, port, next_port).cost;
        port = next_port;
    }

    cost
}

/// Penalty of leaving `calls` unserved, charged once per distinct cargo.
pub fn unserved_cost(problem: &Problem, calls: &[usize]) -> Cost {
    use itertools::Itertools;

    calls.iter().unique().map(|&id| problem.cargo(id).penalty).sum()
}

/// Sum of the sizes of the cargoes in `calls`.
pub fn route_load(problem: &Problem, calls: &[usize]) -> i64 {
    calls.iter().map(|&id| problem.cargo(id).size).sum::<i64>() / 2
}
