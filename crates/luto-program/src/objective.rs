//! Objective assembly: net cost or net profit over every decision variable,
//! plus the soft demand-constraint penalty.

use crate::layout::VariableLayout;
use luto_core::solver::LinExpr;
use luto_core::types::Objective;
use ndarray::{Array2, Array3};

/// Build the objective expression. `MinimiseCost` minimises `cost -
/// revenue`; `MaximiseProfit` is its mirror, `revenue - cost`, solved as a
/// maximisation — callers choose [`luto_core::solver::ObjectiveSense`]
/// accordingly so both land on the same optimum.
/// Per-management `(cost_delta, revenue_delta)` tensors, `(M, R, J)` each,
/// in the same order as [`IndexModel::ag_managements`] — pass the full,
/// unfiltered list; disabled managements simply have no slots in the
/// layout, so their entries here are never read.
pub type AmDeltaTensors<'a> = &'a [(Array3<f64>, Array3<f64>)];

#[allow(clippy::too_many_arguments)]
pub fn build_objective(
    layout: &VariableLayout,
    objective: Objective,
    cost_ag: &Array3<f64>,
    revenue_ag: &Array3<f64>,
    transition_ag: &Array3<f64>,
    cost_non_ag: &Array2<f64>,
    revenue_non_ag: &Array2<f64>,
    transition_non_ag: &Array2<f64>,
    am_deltas: AmDeltaTensors,
    penalty: f64,
) -> LinExpr {
    let sign = match objective {
        Objective::MinimiseCost => 1.0,
        Objective::MaximiseProfit => -1.0,
    };

    let mut expr = LinExpr::default();
    for m in 0..2 {
        for r in 0..layout.r_dim() {
            for j in 0..layout.j_dim() {
                let net = cost_ag[[m, r, j]] + transition_ag[[m, r, j]] - revenue_ag[[m, r, j]];
                if net != 0.0 {
                    expr.add_term(layout.x_index(m, r, j), sign * net);
                }
            }
        }
    }
    for r in 0..layout.r_dim() {
        for k in 0..layout.k_dim() {
            let net = cost_non_ag[[r, k]] + transition_non_ag[[r, k]] - revenue_non_ag[[r, k]];
            if net != 0.0 {
                expr.add_term(layout.n_index(r, k), sign * net);
            }
        }
    }
    for slot in layout.am_slots() {
        let (cost_delta, revenue_delta) = &am_deltas[slot.am_idx];
        for m in 0..2 {
            for r in 0..layout.r_dim() {
                let net = cost_delta[[m, r, slot.j]] - revenue_delta[[m, r, slot.j]];
                if net != 0.0 {
                    if let Some(idx) = layout.a_index(slot.am_idx, m, r, slot.j) {
                        expr.add_term(idx, sign * net);
                    }
                }
            }
        }
    }
    for c in 0..layout.c_dim() {
        expr.add_term(layout.v_index(c), sign * penalty);
    }
    expr
}
