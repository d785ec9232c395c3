//! Benchmarks for evaluation, operators, and the annealing search.

#[cfg(feature = "bench")]
extern crate criterion;

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use vessel_pdp::config::{Config, OperatorSettings};
use vessel_pdp::operators::{Operator, OperatorContext};
use vessel_pdp::problem::{Arc, Cargo, CargoTerms, Problem, TimeWindow, Vessel};
use vessel_pdp::solution::Solution;

/// Create a benchmark problem with `cargoes` cargoes and one vessel per five cargoes.
fn create_benchmark_problem(cargoes: usize) -> Problem {
    let vessels = (cargoes / 5).max(1);
    let ports = (cargoes / 2).max(3);
    let grid = (ports as f64).sqrt().ceil() as usize;
    let position = |p: usize| ((p % grid) as f64 * 10.0, (p / grid) as f64 * 10.0);

    let fleet: Vec<Vessel> = (0..vessels)
        .map(|v| Vessel::new(v % ports, 0, 100, (1..=cargoes).collect()))
        .collect();

    let cargo_list: Vec<Cargo> = (0..cargoes)
        .map(|c| {
            let origin = (c * 7) % ports;
            let destination = (origin + 1 + c % (ports - 1)) % ports;
            let start = (c as i64 % 10) * 20;
            Cargo::new(
                origin,
                destination,
                10 + (c as i64 % 5) * 10,
                5000 + (c as i64 % 7) * 1000,
                TimeWindow::new(start, start + 300),
                TimeWindow::new(start + 20, start + 600),
            )
        })
        .collect();

    let mut arcs = Vec::with_capacity(vessels * ports * ports);
    for _ in 0..vessels {
        for a in 0..ports {
            for b in 0..ports {
                let ((ax, ay), (bx, by)) = (position(a), position(b));
                let distance = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
                arcs.push(Arc {
                    time: distance.round() as i64,
                    cost: (distance * 10.0).round() as i64,
                });
            }
        }
    }

    let terms = vec![
        Some(CargoTerms {
            pickup_time: 2,
            pickup_cost: 50,
            delivery_time: 2,
            delivery_cost: 50,
        });
        vessels * cargoes
    ];

    Problem::new(format!("BenchProblem_{}", cargoes), ports, fleet, cargo_list, arcs, terms)
        .expect("benchmark instance is consistent")
}

#[cfg(feature = "bench")]
fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for size in [20, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let solution = Solution::generate(&problem, &mut ChaCha8Rng::seed_from_u64(0));

            b.iter(|| (solution.is_feasible(&problem), solution.objective_value(&problem)));
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");
    let problem = create_benchmark_problem(50);
    let settings = OperatorSettings::default();
    let ctx = OperatorContext::new(&problem, &settings);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let solution = Solution::generate(&problem, &mut rng);

    for operator in Operator::ALL {
        group.bench_function(operator.name(), |b| {
            b.iter(|| {
                let mut candidate = solution.clone();
                operator.apply(&mut candidate, &mut rng, &ctx)
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.measurement_time(Duration::from_secs(30));

    for size in [20, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);

            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(7);
                vessel_pdp::search(
                    &problem,
                    Solution::standard(&problem),
                    2000,
                    Config::default(),
                    &mut rng,
                )
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(
    benches,
    benchmark_evaluation,
    benchmark_operators,
    benchmark_search
);

#[cfg(feature = "bench")]
criterion_main!(benches);
