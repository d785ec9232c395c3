//! # Vessel PDP
//!
//! Simulated annealing for the capacitated pickup-and-delivery problem with
//! time windows of a heterogeneous vessel fleet. Cargoes a vessel does not
//! carry are left to the spot market at a penalty.
//!
//! Solutions are flat integer sequences (see [`solution`]). The search draws
//! neighborhood operators by adaptively learned weights, accepts worse
//! candidates with a Boltzmann criterion, avoids recently visited solutions
//! with a recency cache, and perturbs the incumbent when it stagnates.
//! All randomness comes from the generator passed in, so a run is fully
//! reproducible from its seed.

pub mod adaptive;
pub mod annealing;
pub mod config;
pub mod evaluation;
pub mod operators;
pub mod problem;
pub mod solution;
pub mod tabu;
pub mod utils;

use crate::adaptive::{MoveReport, OperatorBook, SegmentClock};
use crate::annealing::Schedule;
use crate::config::Config;
use crate::operators::{MoveOutcome, Operator, OperatorContext};
use crate::problem::{Cost, Problem};
use crate::solution::Solution;
use crate::tabu::TabuCache;
use crate::utils::SearchStatistics;

use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Best solution of a search run together with its statistics.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Solution,
    pub best_cost: Cost,
    pub statistics: SearchStatistics,
}

/// Result of the warm-up phase.
struct Calibration {
    incumbent: Solution,
    incumbent_cost: Cost,
    best: Solution,
    best_cost: Cost,
    average_delta: f64,
}

/// The simulated annealing search.
pub struct Search<'a> {
    pub problem: &'a Problem,
    pub config: Config,
    pub book: OperatorBook,
    pub tabu: TabuCache,
}

impl<'a> Search<'a> {
    /// Create a new search for the given problem and configuration.
    pub fn new(problem: &'a Problem, config: Config) -> Result<Self> {
        config.validate()?;
        let book = OperatorBook::new(&config.operators, config.adaptive);

        Ok(Search {
            problem,
            config,
            book,
            tabu: TabuCache::new(1, 1),
        })
    }

    /// Run `iterations` annealing steps starting from `initial`.
    ///
    /// A warm-up of `trial_iterations` moves precedes the budget and calibrates
    /// the temperature schedule. The returned best solution is always feasible.
    pub fn run<R: Rng>(
        &mut self,
        initial: Solution,
        iterations: usize,
        rng: &mut R,
    ) -> Result<SearchOutcome> {
        let problem = self.problem;
        if iterations == 0 {
            bail!("iteration budget must be positive");
        }
        if !initial.is_valid(problem) {
            bail!("initial solution {:?} is not a valid encoding", initial);
        }
        if !initial.is_feasible(problem) {
            bail!("initial solution {:?} is not feasible", initial);
        }

        let start_time = Instant::now();
        let ctx = OperatorContext::new(problem, &self.config.operator_settings);
        self.book.reset();
        self.tabu = TabuCache::for_budget(
            iterations,
            self.config.tabu_min_fraction,
            self.config.tabu_max_fraction,
        );

        let initial_cost = initial.objective_value(problem);
        log::info!(
            "starting search on {}: {} iterations, initial cost {}",
            problem.name,
            iterations,
            initial_cost
        );

        let Calibration {
            mut incumbent,
            mut incumbent_cost,
            mut best,
            mut best_cost,
            average_delta,
        } = self.calibrate(&initial, initial_cost, &ctx, rng);

        let mut schedule = Schedule::new(average_delta, self.config.p_max, self.config.p_min, iterations);
        log::debug!(
            "calibrated: average delta {:.2}, T0 {:.2}, cooling factor {:.6}",
            average_delta,
            schedule.initial_temperature,
            schedule.cooling_factor
        );

        let mut stats = SearchStatistics {
            iterations,
            trial_iterations: self.config.trial_iterations,
            initial_cost,
            initial_temperature: schedule.initial_temperature,
            cooling_factor: schedule.cooling_factor,
            ..SearchStatistics::default()
        };

        let escape_after = ((iterations as f64 * self.config.escape_fraction).ceil() as usize).max(1);
        let mut segments = SegmentClock::new(iterations, self.config.segments);
        let mut stagnation = 0;
        let mut since_improving = 0;
        let mut working = incumbent.clone();
        self.tabu.push(incumbent.fingerprint());

        for iteration in 0..iterations {
            working.copy_from(&incumbent);

            if stagnation > escape_after {
                stats.escapes += 1;
                if Operator::Escape.apply(&mut working, rng, &ctx) == MoveOutcome::Changed {
                    std::mem::swap(&mut incumbent, &mut working);
                    incumbent_cost = incumbent.objective_value(problem);
                    self.tabu.push(incumbent.fingerprint());
                    stats.accepted_moves += 1;
                    if incumbent_cost < best_cost {
                        best.copy_from(&incumbent);
                        best_cost = incumbent_cost;
                        stats.new_bests += 1;
                    }
                }
                log::debug!(
                    "iteration {}: escape after {} stagnant iterations, incumbent cost {}",
                    iteration,
                    stagnation,
                    incumbent_cost
                );
                stagnation = 0;
            } else {
                let index = self.book.select(rng);
                let operator = self.book.operator(index);
                let mut report = MoveReport::default();

                if operator.apply(&mut working, rng, &ctx) == MoveOutcome::Unchanged {
                    report.unchanged = true;
                    report.feasible = true;
                } else if !working.is_feasible(problem) {
                    stats.infeasible_moves += 1;
                } else {
                    report.feasible = true;
                    let fingerprint = working.fingerprint();
                    let cost = working.objective_value(problem);
                    let delta = cost - incumbent_cost;
                    report.tabu = self.tabu.contains(fingerprint);
                    report.new_best = cost < best_cost;
                    report.improving = delta < 0;
                    report.worse = delta > 0;

                    let accept = if report.tabu && !report.new_best {
                        stats.tabu_rejections += 1;
                        false
                    } else {
                        schedule.accepts(delta as f64, rng)
                    };

                    if accept {
                        std::mem::swap(&mut incumbent, &mut working);
                        incumbent_cost = cost;
                        self.tabu.push(fingerprint);
                        stats.accepted_moves += 1;
                        log::trace!(
                            "iteration {}: {} accepted, cost {} (delta {})",
                            iteration,
                            operator.name(),
                            cost,
                            delta
                        );
                    }
                    if report.new_best {
                        best.copy_from(&incumbent);
                        best_cost = cost;
                        stats.new_bests += 1;
                        log::debug!("iteration {}: new best {} by {}", iteration, cost, operator.name());
                    }
                }

                self.book.record(index, &report);

                if report.new_best {
                    stagnation = 0;
                } else {
                    stagnation += 1;
                }

                if report.improving {
                    since_improving = 0;
                    self.tabu.grow();
                } else {
                    since_improving += 1;
                    if since_improving >= self.config.tabu_patience {
                        self.tabu.shrink();
                        since_improving = 0;
                    }
                }
            }

            schedule.cool();
            if segments.tick(iteration + 1) {
                self.book.end_segment((iteration + 1) as f64 / iterations as f64);
                stats.weight_updates += 1;
            }
        }

        stats.runtime = start_time.elapsed();
        stats.best_cost = best_cost;
        stats.final_temperature = schedule.temperature();
        stats.final_tabu_capacity = self.tabu.capacity();
        stats.operator_weights = self.book.probabilities();
        stats.operator_invocations = self
            .book
            .records()
            .iter()
            .map(|r| (r.operator, r.total_invocations))
            .collect();

        log::info!(
            "search finished after {}: best cost {} ({:.2}% improvement)",
            utils::format_duration(stats.runtime),
            best_cost,
            stats.improvement()
        );

        Ok(SearchOutcome {
            best,
            best_cost,
            statistics: stats,
        })
    }

    /// Sample cost increases of random moves from `initial`.
    ///
    /// Improving moves are always taken and worsening ones with probability
    /// `p_max`, so the warm-up already explores and may improve the best.
    fn calibrate<R: Rng>(
        &self,
        initial: &Solution,
        initial_cost: Cost,
        ctx: &OperatorContext<'_>,
        rng: &mut R,
    ) -> Calibration {
        let problem = self.problem;
        let mut incumbent = initial.clone();
        let mut incumbent_cost = initial_cost;
        let mut best = initial.clone();
        let mut best_cost = initial_cost;
        let mut working = initial.clone();
        let mut deltas: Vec<Cost> = Vec::new();

        for _ in 0..self.config.trial_iterations {
            working.copy_from(&incumbent);
            let operator = self.book.operator(self.book.select(rng));
            if operator.apply(&mut working, rng, ctx) == MoveOutcome::Unchanged {
                continue;
            }
            if !working.is_feasible(problem) {
                continue;
            }

            let cost = working.objective_value(problem);
            let delta = cost - incumbent_cost;
            let accept = if delta < 0 {
                true
            } else {
                if delta > 0 {
                    deltas.push(delta);
                }
                rng.gen::<f64>() < self.config.p_max
            };

            if accept {
                std::mem::swap(&mut incumbent, &mut working);
                incumbent_cost = cost;
                if cost < best_cost {
                    best.copy_from(&incumbent);
                    best_cost = cost;
                }
            }
        }

        let average_delta = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().sum::<Cost>() as f64 / deltas.len() as f64
        };

        Calibration {
            incumbent,
            incumbent_cost,
            best,
            best_cost,
            average_delta,
        }
    }
}

/// Search from `initial` for `iterations` steps and return the best solution found.
pub fn search<R: Rng>(
    problem: &Problem,
    initial: Solution,
    iterations: usize,
    config: Config,
    rng: &mut R,
) -> Result<Solution> {
    let mut search = Search::new(problem, config)?;
    Ok(search.run(initial, iterations, rng)?.best)
}

/// Summary of several independent runs.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub best: SearchOutcome,
    pub average_cost: f64,
    pub standard_cost: Cost,
    pub average_runtime: Duration,
    pub costs: Vec<Cost>,
}

impl RunSummary {
    /// Improvement of the best run over the standard solution, in percent.
    pub fn improvement(&self) -> f64 {
        if self.standard_cost == 0 {
            0.0
        } else {
            100.0 * (self.standard_cost - self.best.best_cost) as f64 / self.standard_cost as f64
        }
    }
}

/// Run `runs` independent searches from the standard solution.
///
/// Run `i` uses a generator seeded with `seed + i`.
pub fn run_many(
    problem: &Problem,
    config: &Config,
    iterations: usize,
    runs: usize,
    seed: u64,
) -> Result<RunSummary> {
    if runs == 0 {
        bail!("number of runs must be positive");
    }

    let standard = Solution::standard(problem);
    let standard_cost = standard.objective_value(problem);
    let mut search = Search::new(problem, config.clone())?;
    let mut best: Option<SearchOutcome> = None;
    let mut costs = Vec::with_capacity(runs);
    let mut total_runtime = Duration::ZERO;

    for run in 0..runs {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(run as u64));
        let outcome = search.run(standard.clone(), iterations, &mut rng)?;
        log::info!("run {}/{}: best cost {}", run + 1, runs, outcome.best_cost);

        costs.push(outcome.best_cost);
        total_runtime += outcome.statistics.runtime;
        if best.as_ref().map_or(true, |b| outcome.best_cost < b.best_cost) {
            best = Some(outcome);
        }
    }

    let best = match best {
        Some(best) => best,
        None => bail!("no run completed"),
    };

    Ok(RunSummary {
        best,
        average_cost: costs.iter().sum::<Cost>() as f64 / runs as f64,
        standard_cost,
        average_runtime: total_runtime / runs as u32,
        costs,
    })
}
