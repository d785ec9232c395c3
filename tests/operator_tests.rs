//! Tests for the neighborhood operators.

mod common;

use common::{random_problem, small_problem, SMALL_OPTIMUM};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vessel_pdp::config::OperatorSettings;
use vessel_pdp::operators::insertion::{best_ordering, insert_cargo};
use vessel_pdp::operators::{MoveOutcome, Operator, OperatorContext};
use vessel_pdp::solution::Solution;

/// Operators that never turn a feasible solution into an infeasible one.
const FEASIBILITY_PRESERVING: [Operator; 6] = [
    Operator::TwoExchange,
    Operator::ThreeExchange,
    Operator::Similarity,
    Operator::MoveToUnserved,
    Operator::MinimizeUnserved,
    Operator::Escape,
];

#[test]
fn test_operators_keep_solutions_valid() {
    let settings = OperatorSettings::default();

    for seed in 0..10 {
        let problem = random_problem(3, 10, 6, seed);
        let ctx = OperatorContext::new(&problem, &settings);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for operator in Operator::ALL {
            let mut solution = Solution::generate(&problem, &mut rng);
            for _ in 0..50 {
                let before = solution.clone();
                let outcome = operator.apply(&mut solution, &mut rng, &ctx);

                assert!(
                    solution.is_valid(&problem),
                    "{} produced {:?}",
                    operator.name(),
                    solution
                );
                if outcome == MoveOutcome::Unchanged {
                    assert_eq!(solution, before, "{} reported no change", operator.name());
                }
                if !solution.is_feasible(&problem) {
                    solution = before;
                }
            }
        }
    }
}

#[test]
fn test_feasibility_preserving_operators() {
    let settings = OperatorSettings::default();

    for seed in 0..10 {
        let problem = random_problem(3, 10, 6, 100 + seed);
        let ctx = OperatorContext::new(&problem, &settings);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for operator in FEASIBILITY_PRESERVING {
            let mut solution = Solution::generate(&problem, &mut rng);
            for _ in 0..50 {
                operator.apply(&mut solution, &mut rng, &ctx);
                assert!(
                    solution.is_feasible(&problem),
                    "{} broke feasibility: {:?}",
                    operator.name(),
                    solution
                );
            }
        }
    }
}

#[test]
fn test_exchange_on_idle_fleet_is_unchanged() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for operator in [Operator::TwoExchange, Operator::ThreeExchange, Operator::MoveToUnserved] {
        let mut solution = Solution::standard(&problem);
        assert_eq!(
            operator.apply(&mut solution, &mut rng, &ctx),
            MoveOutcome::Unchanged
        );
        assert_eq!(solution, Solution::standard(&problem));
    }
}

#[test]
fn test_minimize_unserved_assigns_by_penalty() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let mut solution = Solution::standard(&problem);
    let outcome = Operator::MinimizeUnserved.apply(&mut solution, &mut rng, &ctx);

    assert_eq!(outcome, MoveOutcome::Changed);
    assert!(solution.is_feasible(&problem));
    assert!(solution.unserved().is_empty());
    assert!(solution.objective_value(&problem) < 60000);
}

#[test]
fn test_move_to_unserved_drops_one_cargo() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut solution = Solution::new(&problem, vec![1, 1, 2, 2, 3, 3, 0, 0]).unwrap();
    let outcome = Operator::MoveToUnserved.apply(&mut solution, &mut rng, &ctx);

    assert_eq!(outcome, MoveOutcome::Changed);
    assert_eq!(solution.served_count(), 2);
    assert_eq!(solution.unserved().len(), 2);
    assert!(solution.is_feasible(&problem));
}

#[test]
fn test_escape_changes_solution_feasibly() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let start = Solution::new(&problem, vec![1, 1, 2, 2, 3, 3, 0, 0]).unwrap();
    let mut solution = start.clone();
    if Operator::Escape.apply(&mut solution, &mut rng, &ctx) == MoveOutcome::Changed {
        assert_ne!(solution, start);
    } else {
        assert_eq!(solution, start);
    }
    assert!(solution.is_feasible(&problem));
}

#[test]
fn test_best_ordering_finds_cheapest_route() {
    let problem = small_problem();

    let best = best_ordering(&problem, 0, &[3, 3, 2, 2, 1, 1]).unwrap();
    assert_eq!(best, vec![1, 1, 2, 2, 3, 3]);

    // Cargo 2 is incompatible with vessel 2
    assert!(best_ordering(&problem, 1, &[2, 2]).is_none());
}

#[test]
fn test_insert_cargo_reorders_short_routes() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);

    let mut route = vec![3, 3, 2, 2];
    assert!(insert_cargo(&ctx, 0, &mut route, 1));
    assert_eq!(route, vec![1, 1, 2, 2, 3, 3]);

    let mut route = Vec::new();
    assert!(!insert_cargo(&ctx, 1, &mut route, 3));
}

#[test]
fn test_reinsert_can_complete_optimal_route() {
    let problem = small_problem();
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    // Starting with cargoes 2 and 3 on vessel 1, moving cargo 1 there is optimal
    let optimum = Solution::new(&problem, vec![1, 1, 2, 2, 3, 3, 0, 0]).unwrap();
    let solution = Solution::new(&problem, vec![2, 2, 3, 3, 0, 0, 1, 1]).unwrap();
    let mut found = false;
    for _ in 0..200 {
        let mut candidate = solution.clone();
        Operator::ReinsertOnce.apply(&mut candidate, &mut rng, &ctx);
        if candidate.is_feasible(&problem) && candidate.objective_value(&problem) == SMALL_OPTIMUM {
            assert_eq!(candidate, optimum);
            found = true;
            break;
        }
    }
    assert!(found);
}
