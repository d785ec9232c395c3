//! Configuration parameters for the search.

use crate::adaptive::Characteristic;
use crate::operators::Operator;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Largest route length whose orderings may be enumerated on insertion.
///
/// A route of `n` calls has `n! / 2^(n/2)` distinct orderings: 113 400 for 10 calls.
pub const MAX_BRUTE_FORCE_THRESHOLD: usize = 10;

/// Tuning knobs of the neighborhood operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorSettings {
    /// Maximum number of attempts of an intra-vessel exchange
    pub exchange_attempts: usize,
    /// Largest route length whose call order is optimized exhaustively on insertion
    pub brute_force_threshold: usize,
    /// Weight of the unserved group as reinsertion destination (a vessel weighs 1.0)
    pub unserved_weight: f64,
    /// Dissimilarity below which the similarity move is skipped
    pub similarity_threshold: f64,
    /// Maximum number of reinsertions chained by one escape move
    pub escape_moves: usize,
    /// Attempts of an escape move to reach a feasible solution
    pub escape_attempts: usize,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        OperatorSettings {
            exchange_attempts: 20,
            brute_force_threshold: 6,
            unserved_weight: 0.5,
            similarity_threshold: 0.05,
            escape_moves: 10,
            escape_attempts: 10,
        }
    }
}

/// One operator of the mix, with its draw probability and progress profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorEntry {
    pub operator: Operator,
    pub probability: f64,
    pub characteristic: Characteristic,
}

impl OperatorEntry {
    pub fn new(operator: Operator, probability: f64, characteristic: Characteristic) -> Self {
        OperatorEntry {
            operator,
            probability,
            characteristic,
        }
    }
}

/// Configuration settings for the simulated annealing search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operators drawn by the search and their initial probabilities
    pub operators: Vec<OperatorEntry>,
    /// Re-weight operators by their performance instead of using fixed probabilities
    pub adaptive: bool,
    /// Number of warm-up moves used to calibrate the temperature
    pub trial_iterations: usize,
    /// Acceptance probability of an average worsening move at the start
    pub p_max: f64,
    /// Acceptance probability of an average worsening move at the end
    pub p_min: f64,
    /// Fraction of the budget without improvement after which an escape move is made
    pub escape_fraction: f64,
    /// Lower bound of the recency cache size as a fraction of the budget
    pub tabu_min_fraction: f64,
    /// Upper bound of the recency cache size as a fraction of the budget
    pub tabu_max_fraction: f64,
    /// Iterations without an improving move before the recency cache shrinks
    pub tabu_patience: usize,
    /// Number of scoring segments of the adaptive operator weighting
    pub segments: usize,
    pub operator_settings: OperatorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            operators: vec![
                OperatorEntry::new(Operator::TwoExchange, 0.15, Characteristic::Neutral),
                OperatorEntry::new(Operator::ThreeExchange, 0.10, Characteristic::Neutral),
                OperatorEntry::new(Operator::ReinsertOnce, 0.35, Characteristic::EarlyStrength),
                OperatorEntry::new(Operator::Similarity, 0.10, Characteristic::LateStrength),
                OperatorEntry::new(Operator::MoveToUnserved, 0.10, Characteristic::EarlyStrength),
                OperatorEntry::new(Operator::MinimizeUnserved, 0.20, Characteristic::LateStrength),
            ],
            adaptive: true,
            trial_iterations: 100,
            p_max: 0.8,
            p_min: 0.01,
            escape_fraction: 0.02,
            tabu_min_fraction: 0.00001,
            tabu_max_fraction: 0.0001,
            tabu_patience: 100,
            segments: 100,
            operator_settings: OperatorSettings::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the operator mix.
    pub fn with_operators(mut self, operators: Vec<OperatorEntry>) -> Self {
        self.operators = operators;
        self
    }

    /// Enable or disable adaptive operator weighting.
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Set the number of warm-up moves.
    pub fn with_trial_iterations(mut self, trials: usize) -> Self {
        self.trial_iterations = trials;
        self
    }

    /// Set the start and end acceptance probabilities.
    pub fn with_acceptance(mut self, p_max: f64, p_min: f64) -> Self {
        self.p_max = p_max;
        self.p_min = p_min;
        self
    }

    /// Set the stagnation fraction that triggers an escape move.
    pub fn with_escape_fraction(mut self, fraction: f64) -> Self {
        self.escape_fraction = fraction;
        self
    }

    /// Set the recency cache bounds as fractions of the budget.
    pub fn with_tabu_fractions(mut self, min: f64, max: f64) -> Self {
        self.tabu_min_fraction = min;
        self.tabu_max_fraction = max;
        self
    }

    /// Set the shrink patience of the recency cache.
    pub fn with_tabu_patience(mut self, patience: usize) -> Self {
        self.tabu_patience = patience;
        self
    }

    /// Set the number of scoring segments.
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Set the operator settings.
    pub fn with_operator_settings(mut self, settings: OperatorSettings) -> Self {
        self.operator_settings = settings;
        self
    }

    /// Reject configurations the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.p_max > 0.0 && self.p_max < 1.0) {
            bail!("p_max must lie in (0, 1), got {}", self.p_max);
        }
        if !(self.p_min > 0.0 && self.p_min < self.p_max) {
            bail!("p_min must lie in (0, p_max), got {}", self.p_min);
        }
        if self.trial_iterations == 0 {
            bail!("trial_iterations must be positive");
        }
        if self.segments == 0 {
            bail!("segments must be positive");
        }
        if self.tabu_patience == 0 {
            bail!("tabu_patience must be positive");
        }
        if !(self.escape_fraction > 0.0 && self.escape_fraction <= 1.0) {
            bail!("escape_fraction must lie in (0, 1], got {}", self.escape_fraction);
        }
        if !(self.tabu_min_fraction >= 0.0 && self.tabu_min_fraction <= self.tabu_max_fraction) {
            bail!(
                "tabu fractions must satisfy 0 <= min <= max, got {} and {}",
                self.tabu_min_fraction,
                self.tabu_max_fraction
            );
        }

        if self.operators.is_empty() {
            bail!("operator mix is empty");
        }
        let mut threshold = 0.0;
        for entry in &self.operators {
            if !(0.0..=1.0).contains(&entry.probability) {
                bail!(
                    "probability of {} must lie in [0, 1], got {}",
                    entry.operator.name(),
                    entry.probability
                );
            }
            threshold += entry.probability;
        }
        if (threshold - 1.0).abs() > 1e-9 {
            bail!("operator probabilities must sum to 1, got {}", threshold);
        }

        let settings = &self.operator_settings;
        if settings.exchange_attempts == 0 || settings.escape_attempts == 0 || settings.escape_moves == 0 {
            bail!("operator attempt budgets must be positive");
        }
        if settings.brute_force_threshold > MAX_BRUTE_FORCE_THRESHOLD {
            bail!(
                "brute_force_threshold must not exceed {}, got {}",
                MAX_BRUTE_FORCE_THRESHOLD,
                settings.brute_force_threshold
            );
        }
        if !(settings.unserved_weight >= 0.0) {
            bail!("unserved_weight must not be negative, got {}", settings.unserved_weight);
        }

        Ok(())
    }
}
