//! Utility functions and structures for reporting search results.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::evaluation::{route_cost, route_load, unserved_cost};
use crate::operators::Operator;
use crate::problem::{Cost, Problem};
use crate::solution::Solution;
use serde::Serialize;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    format!("{}h {:02}m {:02}.{:03}s", hours, minutes, seconds, millis)
}

/// Save a solution report to a file.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    write_solution(&mut file, solution, problem)
}

/// Write a human readable solution report.
pub fn write_solution<W: Write>(
    out: &mut W,
    solution: &Solution,
    problem: &Problem,
) -> std::io::Result<()> {
    writeln!(out, "Solution for instance: {}", problem.name)?;
    writeln!(out, "Objective: {}", solution.objective_value(problem))?;
    writeln!(out, "Is Feasible: {}", solution.is_feasible(problem))?;
    writeln!(out, "Sequence: {:?}", solution.sequence)?;
    writeln!(out)?;

    let groups = solution.decode();
    let (unserved, routes) = match groups.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };

    for (vessel, calls) in routes.iter().enumerate() {
        write!(out, "Vessel #{}: ", vessel + 1)?;
        if calls.is_empty() {
            writeln!(out, "Idle")?;
            continue;
        }
        writeln!(out, "{:?}", calls)?;
        writeln!(out, "  Cost: {}", route_cost(problem, vessel, calls))?;
        writeln!(
            out,
            "  Cargo volume: {} (capacity {})",
            route_load(problem, calls),
            problem.vessels[vessel].capacity
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Unserved: {:?}", unserved)?;
    writeln!(out, "  Penalty: {}", unserved_cost(problem, unserved))?;

    Ok(())
}

/// Statistics about one search run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatistics {
    pub iterations: usize,
    pub trial_iterations: usize,
    pub runtime: Duration,
    pub initial_cost: Cost,
    pub best_cost: Cost,
    pub accepted_moves: usize,
    pub new_bests: usize,
    pub infeasible_moves: usize,
    pub tabu_rejections: usize,
    pub escapes: usize,
    /// Segment boundaries at which the operator weights were updated
    pub weight_updates: usize,
    pub initial_temperature: f64,
    pub final_temperature: f64,
    pub cooling_factor: f64,
    pub final_tabu_capacity: usize,
    pub operator_weights: Vec<(Operator, f64)>,
    pub operator_invocations: Vec<(Operator, u64)>,
}

impl SearchStatistics {
    /// Improvement of the best cost over the initial cost, in percent.
    pub fn improvement(&self) -> f64 {
        if self.initial_cost == 0 {
            0.0
        } else {
            100.0 * (self.initial_cost - self.best_cost) as f64 / self.initial_cost as f64
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let weights = self
            .operator_weights
            .iter()
            .zip(&self.operator_invocations)
            .map(|((op, w), (_, calls))| format!("    {:<18} p={:.3} calls={}", op.name(), w, calls))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Search Statistics:
- Iterations: {} (+{} warm-up)
- Runtime: {}
- Initial Cost: {}
- Best Cost: {} ({:.2}% improvement)
- Accepted Moves: {}
- New Best Solutions: {}
- Infeasible Candidates: {}
- Tabu Rejections: {}
- Escapes: {}
- Weight Updates: {}
- Temperature: {:.2} -> {:.4} (cooling factor {:.6})
- Final Tabu Capacity: {}
- Operators:
{}",
            self.iterations,
            self.trial_iterations,
            format_duration(self.runtime),
            self.initial_cost,
            self.best_cost,
            self.improvement(),
            self.accepted_moves,
            self.new_bests,
            self.infeasible_moves,
            self.tabu_rejections,
            self.escapes,
            self.weight_updates,
            self.initial_temperature,
            self.final_temperature,
            self.cooling_factor,
            self.final_tabu_capacity,
            weights
        )
    }
}
