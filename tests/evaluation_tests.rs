//! Tests for feasibility and cost evaluation on hand-checked solutions.

mod common;

use common::{small_problem, SMALL_OPTIMUM};
use vessel_pdp::evaluation::{route_cost, route_feasible, route_load, unserved_cost};
use vessel_pdp::problem::Problem;
use vessel_pdp::solution::Solution;

fn solution(problem: &Problem, sequence: &[usize]) -> Solution {
    Solution::new(problem, sequence.to_vec()).unwrap()
}

#[test]
fn test_standard_solution_pays_every_penalty() {
    let problem = small_problem();
    let standard = Solution::standard(&problem);

    assert!(standard.is_feasible(&problem));
    assert_eq!(standard.objective_value(&problem), 60000);
}

#[test]
fn test_single_vessel_route() {
    let problem = small_problem();
    let s = solution(&problem, &[1, 1, 2, 2, 0, 0, 3, 3]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 30390);
}

#[test]
fn test_optimal_solution() {
    let problem = small_problem();
    let s = solution(&problem, &[1, 1, 2, 2, 3, 3, 0, 0]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), SMALL_OPTIMUM);
}

#[test]
fn test_load_reaching_capacity_exactly_is_feasible() {
    let problem = small_problem();
    // Cargoes 3 and 1 are on board together: 60 + 40 = 100
    let s = solution(&problem, &[3, 1, 3, 1, 0, 0, 2, 2]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 20750);
}

#[test]
fn test_service_ending_at_upper_bound_is_feasible() {
    let problem = small_problem();
    // Pickup of cargo 1 finishes at exactly t = 50
    let s = solution(&problem, &[3, 3, 1, 1, 0, 0, 2, 2]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 20750);
}

#[test]
fn test_capacity_violation() {
    let problem = small_problem();
    // Cargo 3 (size 60) on vessel 2 (capacity 50)
    let s = solution(&problem, &[0, 3, 3, 0, 1, 1, 2, 2]);

    assert!(!s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 30630);
}

#[test]
fn test_incompatible_cargo() {
    let problem = small_problem();
    let s = solution(&problem, &[0, 2, 2, 0, 1, 1, 3, 3]);

    assert!(!s.is_feasible(&problem));
    // Port costs of the incompatible pair count as zero
    assert_eq!(s.objective_value(&problem), 40150);
}

#[test]
fn test_time_window_violation() {
    let problem = small_problem();
    // Pickup of cargo 2 would end at t = 62, after its upper bound 60
    let s = solution(&problem, &[3, 1, 3, 2, 1, 2, 0, 0]);

    assert!(!s.is_feasible(&problem));
    assert!(!route_feasible(&problem, 0, &[3, 1, 3, 2, 1, 2]));
}

#[test]
fn test_waiting_for_window_opening() {
    let problem = small_problem();
    // Vessel 2 starts at t = 5 and waits at no port
    let s = solution(&problem, &[0, 1, 1, 0, 2, 2, 3, 3]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 50460);
}

#[test]
fn test_route_helpers() {
    let problem = small_problem();

    assert_eq!(route_cost(&problem, 0, &[]), 0);
    assert!(route_feasible(&problem, 1, &[]));
    assert_eq!(route_cost(&problem, 0, &[1, 1, 2, 2]), 390);
    assert_eq!(route_load(&problem, &[1, 1, 3, 3]), 100);
    assert_eq!(unserved_cost(&problem, &[2, 2, 3, 3]), 50000);
    assert_eq!(unserved_cost(&problem, &[]), 0);
}

#[test]
fn test_feasibility_ignores_unserved_group() {
    let problem = small_problem();
    let s = solution(&problem, &[0, 0, 3, 1, 2, 2, 1, 3]);

    assert!(s.is_feasible(&problem));
    assert_eq!(s.objective_value(&problem), 60000);
}
