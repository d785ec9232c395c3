//! Solution representation for the vessel pickup-and-delivery problem.
//!
//! A solution is a flat sequence of one-based cargo ids. Each vessel's calls
//! are terminated by a [`BARRIER`]; the calls after the last barrier form the
//! unserved group. The first occurrence of a cargo id within a group is its
//! pickup, the second one its delivery.

use crate::evaluation;
use crate::problem::{Cost, Problem};
use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Separator between two vessel groups in the encoded sequence.
pub const BARRIER: usize = 0;

/// Represents a complete, encoded solution.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    /// Calls of every vessel separated by barriers, unserved calls last
    pub sequence: Vec<usize>,
}

impl Solution {
    /// Create a solution from an encoded sequence, checking its length and value range.
    ///
    /// Structure beyond that (barrier count, pairs) is left to [`Solution::is_valid`].
    pub fn new(problem: &Problem, sequence: Vec<usize>) -> Result<Self> {
        if sequence.len() != problem.solution_len() {
            bail!(
                "solution has length {}, expected {} (2 x {} cargoes + {} vessels)",
                sequence.len(),
                problem.solution_len(),
                problem.cargo_count(),
                problem.vessel_count()
            );
        }
        if let Some((position, &id)) = sequence
            .iter()
            .enumerate()
            .find(|&(_, &id)| id > problem.cargo_count())
        {
            bail!(
                "solution holds cargo id {} at position {}, expected ids in 1..={}",
                id,
                position,
                problem.cargo_count()
            );
        }
        Ok(Solution { sequence })
    }

    /// The canonical solution: every vessel idle, every cargo unserved.
    pub fn standard(problem: &Problem) -> Self {
        let mut sequence = Vec::with_capacity(problem.solution_len());
        sequence.extend(std::iter::repeat(BARRIER).take(problem.vessel_count()));
        for id in 1..=problem.cargo_count() {
            sequence.push(id);
            sequence.push(id);
        }
        Solution { sequence }
    }

    /// Build a feasible solution greedily in random order.
    ///
    /// Each cargo is tried on one randomly chosen compatible vessel and stays
    /// unserved when appending it would break that vessel's route.
    pub fn generate<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); problem.vessel_count() + 1];
        let mut order: Vec<usize> = (1..=problem.cargo_count()).collect();
        order.shuffle(rng);

        for cargo in order {
            let candidates: Vec<usize> = (0..problem.vessel_count())
                .filter(|&v| problem.is_compatible(v, cargo))
                .collect();

            let placed = match candidates.choose(rng) {
                Some(&vessel) => {
                    let route = &mut groups[vessel];
                    route.push(cargo);
                    route.push(cargo);
                    if evaluation::route_feasible(problem, vessel, route) {
                        true
                    } else {
                        route.truncate(route.len() - 2);
                        false
                    }
                }
                None => false,
            };

            if !placed {
                let unserved = problem.vessel_count();
                groups[unserved].push(cargo);
                groups[unserved].push(cargo);
            }
        }

        Solution {
            sequence: encode(&groups),
        }
    }

    /// Split the sequence into per-vessel groups; the last group is unserved.
    pub fn decode(&self) -> Vec<&[usize]> {
        self.sequence.split(|&x| x == BARRIER).collect()
    }

    /// Owned copy of [`Solution::decode`], for operators that restructure groups.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        self.decode().into_iter().map(<[usize]>::to_vec).collect()
    }

    /// Replace the sequence by the encoding of `groups`, reusing the allocation.
    pub fn set_groups(&mut self, groups: &[Vec<usize>]) {
        self.sequence.clear();
        encode_into(groups, &mut self.sequence);
    }

    /// Position ranges of every group within the sequence.
    pub fn group_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for (i, &x) in self.sequence.iter().enumerate() {
            if x == BARRIER {
                ranges.push(start..i);
                start = i + 1;
            }
        }
        ranges.push(start..self.sequence.len());
        ranges
    }

    /// The unserved group.
    pub fn unserved(&self) -> &[usize] {
        let start = self
            .sequence
            .iter()
            .rposition(|&x| x == BARRIER)
            .map_or(0, |i| i + 1);
        &self.sequence[start..]
    }

    /// Overwrite this solution with `other` without reallocating.
    pub fn copy_from(&mut self, other: &Solution) {
        self.sequence.clone_from(&other.sequence);
    }

    /// Check the structure of the solution against the problem.
    ///
    /// The sequence must contain exactly one barrier per vessel, every cargo id
    /// exactly twice, and both occurrences of a cargo in the same group.
    pub fn is_valid(&self, problem: &Problem) -> bool {
        if self.sequence.len() != problem.solution_len() {
            return false;
        }

        let groups = self.decode();
        if groups.len() != problem.vessel_count() + 1 {
            return false;
        }

        let mut seen_in = vec![usize::MAX; problem.cargo_count() + 1];
        let mut counts = vec![0usize; problem.cargo_count() + 1];

        for (g, group) in groups.iter().enumerate() {
            if group.len() % 2 != 0 {
                return false;
            }
            for &cargo in group.iter() {
                if cargo > problem.cargo_count() {
                    return false;
                }
                if counts[cargo] > 0 && seen_in[cargo] != g {
                    return false;
                }
                counts[cargo] += 1;
                seen_in[cargo] = g;
            }
        }

        counts[1..].iter().all(|&count| count == 2)
    }

    /// Check capacity, compatibility and time windows of every vessel.
    pub fn is_feasible(&self, problem: &Problem) -> bool {
        evaluation::is_feasible(problem, self)
    }

    /// Total sailing, port and penalty cost.
    pub fn objective_value(&self, problem: &Problem) -> Cost {
        evaluation::objective_value(problem, self)
    }

    /// Content hash used by the recency cache.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.sequence.hash(&mut hasher);
        hasher.finish()
    }

    /// Number of cargoes carried by vessels.
    pub fn served_count(&self) -> usize {
        (self.sequence.len() - self.sequence.iter().filter(|&&x| x == BARRIER).count()
            - self.unserved().len())
            / 2
    }
}

/// Concatenate groups back into one sequence, inserting barriers.
///
/// Inverse of [`Solution::decode`]: every group but the last is followed by a barrier.
pub fn encode<G: AsRef<[usize]>>(groups: &[G]) -> Vec<usize> {
    let mut sequence = Vec::with_capacity(groups.iter().map(|g| g.as_ref().len() + 1).sum());
    encode_into(groups, &mut sequence);
    sequence
}

fn encode_into<G: AsRef<[usize]>>(groups: &[G], sequence: &mut Vec<usize>) {
    for (i, group) in groups.iter().enumerate() {
        sequence.extend_from_slice(group.as_ref());
        if i + 1 < groups.len() {
            sequence.push(BARRIER);
        }
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.sequence)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = self.decode();
        let last = groups.len() - 1;
        for (i, group) in groups.iter().enumerate() {
            if i == last {
                write!(f, "Unserved: {:?}", group)?;
            } else {
                writeln!(f, "Vessel {}: {:?}", i + 1, group)?;
            }
        }
        Ok(())
    }
}
