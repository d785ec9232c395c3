//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vessel_pdp::problem::{Arc, Cargo, CargoTerms, Problem, TimeWindow, Vessel};

/// Two vessels, three cargoes, three ports on a line.
///
/// Vessel 1 sails 10 time units / 100 cost per hop, vessel 2 12 / 150.
/// Vessel 2 cannot carry cargo 2 and is too small for cargo 3.
pub const SMALL_INSTANCE: &str = "\
% number of nodes
3
% number of vessels
2
% vessel: index, home node, starting time, capacity
1,1,0,100
2,2,5,50
% number of cargoes
3
% vessel, compatible cargoes
1,1,2,3
2,1,3
% cargo: index, origin, destination, size, cost of not transporting, pickup window, delivery window
1,1,2,40,10000,0,50,0,100
2,2,3,30,20000,10,60,20,200
3,3,1,60,30000,0,200,0,300
% vessel, origin, destination, travel time, travel cost
1,1,1,0,0
1,1,2,10,100
1,1,3,20,200
1,2,1,10,100
1,2,2,0,0
1,2,3,10,100
1,3,1,20,200
1,3,2,10,100
1,3,3,0,0
2,1,1,0,0
2,1,2,12,150
2,1,3,24,300
2,2,1,12,150
2,2,2,0,0
2,2,3,12,150
2,3,1,24,300
2,3,2,12,150
2,3,3,0,0
% vessel, cargo, origin port time, origin port cost, destination port time, destination port cost
1,1,2,50,3,60
1,2,2,40,2,40
1,3,4,70,4,70
2,1,3,80,3,80
2,2,-1,-1,-1,-1
2,3,5,90,5,90
";

/// Cost of the optimal solution `[1,1,2,2,3,3,0,0]` of [`SMALL_INSTANCE`].
pub const SMALL_OPTIMUM: i64 = 730;

pub fn small_problem() -> Problem {
    Problem::parse("small", SMALL_INSTANCE).expect("fixture instance parses")
}

/// A random instance with ports scattered on a 100 x 100 grid.
pub fn random_problem(vessels: usize, cargoes: usize, ports: usize, seed: u64) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let positions: Vec<(f64, f64)> = (0..ports)
        .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect();

    let compatibility: Vec<Vec<bool>> = (0..vessels)
        .map(|_| (0..cargoes).map(|_| rng.gen_bool(0.7)).collect())
        .collect();

    let fleet: Vec<Vessel> = compatibility
        .iter()
        .map(|row| {
            let compatible = row
                .iter()
                .enumerate()
                .filter(|&(_, &ok)| ok)
                .map(|(c, _)| c + 1)
                .collect();
            Vessel::new(
                rng.gen_range(0..ports),
                rng.gen_range(0..20),
                rng.gen_range(50..150),
                compatible,
            )
        })
        .collect();

    let cargo_list: Vec<Cargo> = (0..cargoes)
        .map(|_| {
            let origin = rng.gen_range(0..ports);
            let destination = (origin + rng.gen_range(1..ports)) % ports;
            let pickup_lower = rng.gen_range(0..100);
            let pickup_upper = pickup_lower + rng.gen_range(50..200);
            let delivery_lower = pickup_lower + rng.gen_range(10..60);
            let delivery_upper = pickup_upper + rng.gen_range(100..300);
            Cargo::new(
                origin,
                destination,
                rng.gen_range(10..60),
                rng.gen_range(1000..5000),
                TimeWindow::new(pickup_lower, pickup_upper),
                TimeWindow::new(delivery_lower, delivery_upper),
            )
        })
        .collect();

    let mut arcs = Vec::with_capacity(vessels * ports * ports);
    for v in 0..vessels {
        for a in 0..ports {
            for b in 0..ports {
                let (dx, dy) = (positions[a].0 - positions[b].0, positions[a].1 - positions[b].1);
                let distance = (dx * dx + dy * dy).sqrt();
                arcs.push(Arc {
                    time: (distance / (1.0 + v as f64 * 0.2)).round() as i64,
                    cost: (distance * (10.0 + v as f64)).round() as i64,
                });
            }
        }
    }

    let mut terms = Vec::with_capacity(vessels * cargoes);
    for row in &compatibility {
        for &ok in row {
            terms.push(if ok {
                Some(CargoTerms {
                    pickup_time: rng.gen_range(1..6),
                    pickup_cost: rng.gen_range(10..100),
                    delivery_time: rng.gen_range(1..6),
                    delivery_cost: rng.gen_range(10..100),
                })
            } else {
                None
            });
        }
    }

    Problem::new(format!("random-{seed}"), ports, fleet, cargo_list, arcs, terms)
        .expect("generated instance is consistent")
}
