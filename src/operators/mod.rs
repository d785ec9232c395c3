//! Neighborhood operators.
//!
//! Every operator takes a feasible solution and leaves it structurally valid.
//! Operators that cannot find a move within their attempt budget leave the
//! solution untouched and report [`MoveOutcome::Unchanged`]. Feasibility of a
//! changed solution is up to the caller unless the operator says otherwise.

pub mod escape;
pub mod exchange;
pub mod insertion;
pub mod permutations;
pub mod reinsert;
pub mod similarity;
pub mod unserved;

use crate::config::OperatorSettings;
use crate::problem::Problem;
use crate::solution::Solution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use self::similarity::SimilarityTable;

/// Result of applying an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Changed,
    Unchanged,
}

/// The closed set of neighborhood moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Swap two calls within one vessel route (feasibility preserving)
    TwoExchange,
    /// Rotate three calls within one vessel route (feasibility preserving)
    ThreeExchange,
    /// Move one cargo to another group
    ReinsertOnce,
    /// Move the least fitting cargo of the least coherent route to a better fitting vessel
    Similarity,
    /// Drop one cargo from a vessel into the unserved group
    MoveToUnserved,
    /// Assign unserved cargoes to vessels, most expensive first (feasibility preserving)
    MinimizeUnserved,
    /// Chain several reinsertions until a feasible solution is reached
    Escape,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::TwoExchange,
        Operator::ThreeExchange,
        Operator::ReinsertOnce,
        Operator::Similarity,
        Operator::MoveToUnserved,
        Operator::MinimizeUnserved,
        Operator::Escape,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::TwoExchange => "two-exchange",
            Operator::ThreeExchange => "three-exchange",
            Operator::ReinsertOnce => "reinsert-once",
            Operator::Similarity => "similarity",
            Operator::MoveToUnserved => "move-to-unserved",
            Operator::MinimizeUnserved => "minimize-unserved",
            Operator::Escape => "escape",
        }
    }

    /// Apply the operator to `solution` in place.
    pub fn apply<R: Rng>(
        &self,
        solution: &mut Solution,
        rng: &mut R,
        ctx: &OperatorContext<'_>,
    ) -> MoveOutcome {
        match self {
            Operator::TwoExchange => exchange::two_exchange(solution, rng, ctx),
            Operator::ThreeExchange => exchange::three_exchange(solution, rng, ctx),
            Operator::ReinsertOnce => reinsert::reinsert_once(solution, rng, ctx),
            Operator::Similarity => similarity::similarity_move(solution, ctx),
            Operator::MoveToUnserved => unserved::move_to_unserved(solution, rng, ctx),
            Operator::MinimizeUnserved => unserved::minimize_unserved(solution, ctx),
            Operator::Escape => escape::escape(solution, rng, ctx),
        }
    }
}

/// Per-run state shared by all operators.
pub struct OperatorContext<'a> {
    pub problem: &'a Problem,
    pub settings: &'a OperatorSettings,
    pub similarity: SimilarityTable,
}

impl<'a> OperatorContext<'a> {
    pub fn new(problem: &'a Problem, settings: &'a OperatorSettings) -> Self {
        OperatorContext {
            problem,
            settings,
            similarity: SimilarityTable::new(problem),
        }
    }
}
