//! The Solver Adapter contract: a solver-agnostic, sparse linear-program
//! shape that the Program Builder emits and any external solver consumes.
//!
//! The LP problem itself stays generic here (no Clarabel/good_lp types
//! leak into `luto-core`) so that an in-process solver and a subprocess
//! solver can both implement [`SolverAdapter`] against the same contract.

use crate::error::LutoResult;
use crate::types::SolveStatus;
use serde::{Deserialize, Serialize};

/// One decision variable, with its box bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

/// A sparse linear expression: `constant + sum(coeff * var[index])`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinExpr {
    pub constant: f64,
    pub terms: Vec<(usize, f64)>,
}

impl LinExpr {
    pub fn constant(c: f64) -> Self {
        Self {
            constant: c,
            terms: Vec::new(),
        }
    }

    pub fn term(mut self, var_index: usize, coeff: f64) -> Self {
        self.terms.push((var_index, coeff));
        self
    }

    pub fn add_term(&mut self, var_index: usize, coeff: f64) {
        self.terms.push((var_index, coeff));
    }
}

/// The comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    Le,
    Ge,
    Eq,
}

/// One linear constraint: `expr <sense> rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub expr: LinExpr,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

/// Whether the objective is minimised or maximised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    Minimise,
    Maximise,
}

/// A complete, solver-agnostic linear program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpProblem {
    pub variables: Vec<Variable>,
    pub objective: LinExpr,
    pub objective_sense: ObjectiveSense,
    pub constraints: Vec<Constraint>,
}

/// Options for one solve call.
#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    pub optimality_tolerance: f64,
    pub time_limit_secs: Option<u64>,
    pub threads: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            optimality_tolerance: 1e-6,
            time_limit_secs: None,
            threads: 1,
        }
    }
}

/// The outcome of a solve: status plus, if meaningful, the variable values.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: SolveStatus,
    /// Parallel to [`LpProblem::variables`]; empty if `status` rules out a
    /// usable solution.
    pub values: Vec<f64>,
    pub objective_value: f64,
}

impl LpSolution {
    pub fn value(&self, var_index: usize) -> f64 {
        self.values.get(var_index).copied().unwrap_or(0.0)
    }
}

/// Submits a model to an external (or in-process) LP solver and returns
/// optimal decision-variable values.
///
/// The LP handle is acquired and released inside one year's solve; there is
/// no cross-year reuse (design note: "solver model lifecycle is scoped").
pub trait SolverAdapter: Send + Sync {
    /// An opaque, solver-specific handle produced by [`Self::build_model`].
    type Handle: Send;

    /// Build (but do not yet solve) a model from the given problem.
    fn build_model(&self, problem: LpProblem) -> LutoResult<Self::Handle>;

    /// Run the solver on a built model. This is a blocking synchronous
    /// boundary from the run loop's perspective; the adapter may use
    /// multiple threads internally, bounded by `options.threads`.
    fn solve(&self, handle: Self::Handle, options: &SolveOptions) -> LutoResult<LpSolution>;

    /// Request cancellation of an in-flight solve. Implementations for
    /// which cancellation is not meaningful (an already-synchronous
    /// in-process solve) may no-op.
    fn stop(&self, handle: &Self::Handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_expr_builder_accumulates_terms() {
        let expr = LinExpr::constant(1.0).term(0, 2.0).term(1, -3.0);
        assert_eq!(expr.constant, 1.0);
        assert_eq!(expr.terms, vec![(0, 2.0), (1, -3.0)]);
    }

    #[test]
    fn solution_value_defaults_to_zero_out_of_range() {
        let solution = LpSolution {
            status: SolveStatus::Optimal,
            values: vec![1.0],
            objective_value: 0.0,
        };
        assert_eq!(solution.value(0), 1.0);
        assert_eq!(solution.value(5), 0.0);
    }
}
