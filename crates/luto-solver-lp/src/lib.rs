//! The default [`SolverAdapter`] implementation: an in-process solve using
//! `good_lp`'s Clarabel backend, a pure-Rust interior-point solver that
//! needs no external binary.
//!
//! Translation happens entirely inside [`ClarabelAdapter::solve`] — the
//! `good_lp` model is built fresh from the validated [`LpProblem`] every
//! solve, matching the contract's "no cross-year model reuse" design note.

use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};
use luto_core::error::{LutoError, LutoResult};
use luto_core::solver::{
    ConstraintSense, LpProblem, LpSolution, ObjectiveSense, SolveOptions, SolverAdapter,
};
use luto_core::types::SolveStatus;
use tracing::{instrument, warn};

/// Always-available in-process solver: Clarabel ships as a pure-Rust crate,
/// so there's no binary discovery or subprocess lifecycle to manage.
pub struct ClarabelAdapter;

impl ClarabelAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClarabelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn build_expression(expr: &luto_core::solver::LinExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(idx, coeff) in &expr.terms {
        out += coeff * vars[idx];
    }
    out
}

impl SolverAdapter for ClarabelAdapter {
    type Handle = LpProblem;

    fn build_model(&self, problem: LpProblem) -> LutoResult<Self::Handle> {
        let n = problem.variables.len();
        if problem.objective.terms.iter().any(|&(idx, _)| idx >= n) {
            return Err(LutoError::Data(
                "objective references a variable index out of range".into(),
            ));
        }
        for c in &problem.constraints {
            if c.expr.terms.iter().any(|&(idx, _)| idx >= n) {
                return Err(LutoError::Data(format!(
                    "constraint '{}' references a variable index out of range",
                    c.name
                )));
            }
        }
        Ok(problem)
    }

    #[instrument(skip(self, handle, options), fields(n_vars = handle.variables.len(), n_constraints = handle.constraints.len()))]
    fn solve(&self, handle: Self::Handle, options: &SolveOptions) -> LutoResult<LpSolution> {
        let problem = handle;
        let mut vars = variables!();
        let good_lp_vars: Vec<Variable> = problem
            .variables
            .iter()
            .map(|v| vars.add(variable().min(v.lower).max(v.upper)))
            .collect();

        let objective_expr = build_expression(&problem.objective, &good_lp_vars);

        let mut model = match problem.objective_sense {
            ObjectiveSense::Minimise => vars.minimise(objective_expr).using(clarabel),
            ObjectiveSense::Maximise => vars.maximise(objective_expr).using(clarabel),
        };

        for c in &problem.constraints {
            let expr = build_expression(&c.expr, &good_lp_vars);
            let rhs = c.rhs;
            model = match c.sense {
                ConstraintSense::Le => model.with(constraint!(expr <= rhs)),
                ConstraintSense::Ge => model.with(constraint!(expr >= rhs)),
                ConstraintSense::Eq => model.with(constraint!(expr == rhs)),
            };
        }

        let _ = options.optimality_tolerance; // Clarabel's own defaults are used; not independently tunable through good_lp's generic interface.
        let _ = options.time_limit_secs;
        let _ = options.threads;

        match model.solve() {
            Ok(solution) => {
                let values = good_lp_vars.iter().map(|&v| solution.value(v)).collect::<Vec<_>>();
                let objective_value = problem.objective.constant
                    + problem
                        .objective
                        .terms
                        .iter()
                        .map(|&(idx, coeff)| coeff * values[idx])
                        .sum::<f64>();
                Ok(LpSolution {
                    status: SolveStatus::Optimal,
                    values,
                    objective_value,
                })
            }
            Err(err) => {
                warn!(error = %err, "Clarabel solve did not reach an optimal solution");
                Ok(LpSolution {
                    status: SolveStatus::Infeasible,
                    values: Vec::new(),
                    objective_value: 0.0,
                })
            }
        }
    }

    fn stop(&self, _handle: &Self::Handle) {
        // The in-process solve is synchronous; there is nothing in flight
        // to cancel once `solve` has been called.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luto_core::solver::{Constraint, LinExpr, Variable as LutoVariable};

    #[test]
    fn build_model_rejects_out_of_range_objective_term() {
        let adapter = ClarabelAdapter::new();
        let problem = LpProblem {
            variables: vec![LutoVariable {
                name: "x0".into(),
                lower: 0.0,
                upper: 1.0,
            }],
            objective: LinExpr::constant(0.0).term(5, 1.0),
            objective_sense: ObjectiveSense::Minimise,
            constraints: vec![],
        };
        assert!(adapter.build_model(problem).is_err());
    }

    #[test]
    fn solves_a_trivial_minimisation() {
        let adapter = ClarabelAdapter::new();
        let problem = LpProblem {
            variables: vec![LutoVariable {
                name: "x0".into(),
                lower: 0.0,
                upper: 10.0,
            }],
            objective: LinExpr::constant(0.0).term(0, 1.0),
            objective_sense: ObjectiveSense::Minimise,
            constraints: vec![Constraint {
                name: "floor".into(),
                expr: LinExpr::constant(0.0).term(0, 1.0),
                sense: ConstraintSense::Ge,
                rhs: 2.0,
            }],
        };
        let handle = adapter.build_model(problem).unwrap();
        let solution = adapter.solve(handle, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.value(0) - 2.0).abs() < 1e-4);
    }
}
