//! Performance-weighted operator selection.
//!
//! The run is divided into segments. Within a segment every invocation of an
//! operator is scored; at the segment boundary the average score, shaped by
//! the operator's progress profile, becomes part of its next weight.

use crate::config::OperatorEntry;
use crate::operators::Operator;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SCORE_NEW_BEST: f64 = 1.0;
pub const SCORE_IMPROVING: f64 = 0.5;
pub const SCORE_UNCHANGED: f64 = 0.5;
pub const SCORE_FEASIBLE: f64 = 0.5;
pub const SCORE_INFEASIBLE: f64 = -0.5;
pub const SCORE_TABU: f64 = -0.25;
pub const SCORE_WORSE: f64 = -0.25;

/// How an operator's usefulness is expected to change over the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Characteristic {
    /// Same modifier throughout
    Neutral,
    /// Full strength for the first quarter, then decaying
    EarlyStrength,
    /// Damped for the first half, then ramping up
    LateStrength,
}

impl Characteristic {
    /// Multiplier applied to an operator's segment score at `progress` in `[0, 1]`.
    pub fn modifier(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        match self {
            Characteristic::Neutral => 1.0,
            Characteristic::EarlyStrength => 1.0 - (progress - 0.25).max(0.0),
            Characteristic::LateStrength => 0.5 + 2.0 * (progress - 0.5).max(0.0),
        }
    }
}

/// What happened when an operator was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub new_best: bool,
    pub improving: bool,
    pub unchanged: bool,
    pub feasible: bool,
    pub tabu: bool,
    pub worse: bool,
}

impl MoveReport {
    /// Additive score of the invocation.
    pub fn score(&self) -> f64 {
        let mut score = 0.0;
        if self.new_best {
            score += SCORE_NEW_BEST;
        }
        if self.improving {
            score += SCORE_IMPROVING;
        }
        if self.unchanged && self.feasible {
            score += SCORE_UNCHANGED;
        }
        if self.feasible {
            score += SCORE_FEASIBLE;
        } else {
            score += SCORE_INFEASIBLE;
        }
        if self.tabu {
            score += SCORE_TABU;
        }
        if self.worse && self.feasible {
            score += SCORE_WORSE;
        }
        score
    }
}

/// Segment boundaries of a run: segment `k` ends after `floor(k * iterations / segments)`
/// iterations, so a run is split into at most `segments` segments whatever its length.
#[derive(Debug, Clone)]
pub struct SegmentClock {
    iterations: usize,
    segments: usize,
    next: usize,
}

impl SegmentClock {
    pub fn new(iterations: usize, segments: usize) -> Self {
        let mut clock = SegmentClock {
            iterations,
            segments: segments.max(1),
            next: 1,
        };
        clock.skip_to(0);
        clock
    }

    fn boundary(&self, k: usize) -> usize {
        ((k as u128 * self.iterations as u128) / self.segments as u128) as usize
    }

    fn skip_to(&mut self, done: usize) {
        while self.next <= self.segments && self.boundary(self.next) <= done {
            self.next += 1;
        }
    }

    /// Report that `done` iterations have completed. Returns whether a segment ended.
    pub fn tick(&mut self, done: usize) -> bool {
        if self.next > self.segments || self.boundary(self.next) > done {
            return false;
        }
        self.skip_to(done);
        true
    }
}

/// Per-run state of one operator.
#[derive(Debug, Clone)]
pub struct OperatorRecord {
    pub operator: Operator,
    pub characteristic: Characteristic,
    /// Relative selection weight carried from segment to segment
    pub weight: f64,
    pub segment_score: f64,
    pub segment_invocations: u64,
    pub total_invocations: u64,
}

/// Operator records of one search run.
#[derive(Debug, Clone)]
pub struct OperatorBook {
    records: Vec<OperatorRecord>,
    initial: Vec<f64>,
    adaptive: bool,
}

impl OperatorBook {
    pub fn new(entries: &[OperatorEntry], adaptive: bool) -> Self {
        let records = entries
            .iter()
            .map(|entry| OperatorRecord {
                operator: entry.operator,
                characteristic: entry.characteristic,
                weight: entry.probability,
                segment_score: 0.0,
                segment_invocations: 0,
                total_invocations: 0,
            })
            .collect();

        OperatorBook {
            records,
            initial: entries.iter().map(|entry| entry.probability).collect(),
            adaptive,
        }
    }

    /// Draw an operator index proportionally to the current weights.
    pub fn select<R: Rng>(&self, rng: &mut R) -> usize {
        match WeightedIndex::new(self.records.iter().map(|r| r.weight)) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..self.records.len()),
        }
    }

    pub fn operator(&self, index: usize) -> Operator {
        self.records[index].operator
    }

    /// Score one invocation of the operator at `index`.
    pub fn record(&mut self, index: usize, report: &MoveReport) {
        let record = &mut self.records[index];
        record.segment_score += report.score();
        record.segment_invocations += 1;
        record.total_invocations += 1;
    }

    /// Fold the segment scores into the weights and start a new segment.
    ///
    /// `weight = (weight / 2 + max(0, score / invocations) * modifier(progress)) / operators`.
    /// With fixed probabilities only the counters are reset.
    pub fn end_segment(&mut self, progress: f64) {
        let count = self.records.len() as f64;
        for record in &mut self.records {
            if self.adaptive {
                let average = if record.segment_invocations > 0 {
                    record.segment_score / record.segment_invocations as f64
                } else {
                    0.0
                };
                record.weight = (record.weight / 2.0
                    + average.max(0.0) * record.characteristic.modifier(progress))
                    / count;
            }
            record.segment_score = 0.0;
            record.segment_invocations = 0;
        }

        if self.adaptive {
            log::debug!(
                "operator weights at {:.0}%: {}",
                progress * 100.0,
                self.records
                    .iter()
                    .map(|r| format!("{}={:.4}", r.operator.name(), r.weight))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    /// Restore the initial weights and clear all counters.
    pub fn reset(&mut self) {
        for (record, &weight) in self.records.iter_mut().zip(&self.initial) {
            record.weight = weight;
            record.segment_score = 0.0;
            record.segment_invocations = 0;
            record.total_invocations = 0;
        }
    }

    pub fn records(&self) -> &[OperatorRecord] {
        &self.records
    }

    /// Current weights normalized to sum to one.
    pub fn probabilities(&self) -> Vec<(Operator, f64)> {
        let total: f64 = self.records.iter().map(|r| r.weight).sum();
        self.records
            .iter()
            .map(|r| {
                let p = if total > 0.0 { r.weight / total } else { 0.0 };
                (r.operator, p)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_follow_progress_profile() {
        assert_eq!(Characteristic::Neutral.modifier(0.9), 1.0);
        assert_eq!(Characteristic::EarlyStrength.modifier(0.1), 1.0);
        assert!(Characteristic::EarlyStrength.modifier(0.8) < 1.0);
        assert_eq!(Characteristic::LateStrength.modifier(0.3), 0.5);
        assert!(Characteristic::LateStrength.modifier(0.9) > 1.0);
    }

    #[test]
    fn test_scores_combine_additively() {
        let best = MoveReport {
            new_best: true,
            improving: true,
            feasible: true,
            ..MoveReport::default()
        };
        assert_eq!(best.score(), 2.0);

        let infeasible = MoveReport::default();
        assert_eq!(infeasible.score(), -0.5);

        let worse_tabu = MoveReport {
            feasible: true,
            worse: true,
            tabu: true,
            ..MoveReport::default()
        };
        assert_eq!(worse_tabu.score(), 0.0);
    }

    #[test]
    fn test_segment_update_rewards_scoring_operator() {
        let entries = [
            OperatorEntry::new(Operator::TwoExchange, 0.5, Characteristic::Neutral),
            OperatorEntry::new(Operator::ReinsertOnce, 0.5, Characteristic::Neutral),
        ];
        let mut book = OperatorBook::new(&entries, true);
        let good = MoveReport {
            improving: true,
            feasible: true,
            ..MoveReport::default()
        };
        book.record(0, &good);
        book.record(1, &MoveReport::default());
        book.end_segment(0.5);

        let records = book.records();
        assert!((records[0].weight - (0.25 + 1.0) / 2.0).abs() < 1e-12);
        assert!((records[1].weight - 0.125).abs() < 1e-12);
        assert_eq!(records[0].segment_invocations, 0);
    }

    fn count_segments(iterations: usize, segments: usize) -> usize {
        let mut clock = SegmentClock::new(iterations, segments);
        (1..=iterations).filter(|&done| clock.tick(done)).count()
    }

    #[test]
    fn test_segment_clock_never_exceeds_segment_count() {
        assert_eq!(count_segments(199, 100), 100);
        assert_eq!(count_segments(1000, 100), 100);
        assert_eq!(count_segments(10_001, 100), 100);
        // Shorter runs than segments end one segment per iteration
        assert_eq!(count_segments(50, 100), 50);
        assert_eq!(count_segments(1, 100), 1);
    }

    #[test]
    fn test_segment_clock_boundaries() {
        let mut clock = SegmentClock::new(10, 4);
        let ends: Vec<usize> = (1..=10).filter(|&done| clock.tick(done)).collect();
        assert_eq!(ends, vec![2, 5, 7, 10]);
    }
}
