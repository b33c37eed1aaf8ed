//! The Program Builder: turns a year's tensors and configuration into a
//! solver-agnostic [`luto_core::solver::LpProblem`], and turns a solved
//! [`luto_core::solver::LpSolution`] back into per-cell maps.

pub mod constraints;
pub mod decode;
pub mod layout;
pub mod objective;

use layout::VariableLayout;
use luto_core::index::IndexModel;
use luto_core::solver::{LpProblem, ObjectiveSense, Variable};
use luto_core::types::{DemandConstraintType, Objective, Region};
use ndarray::{Array1, Array2, Array3};

/// Every tensor and configuration value the program builder needs for one
/// year, already computed by `luto-algo` and the run loop.
pub struct ProgramInputs<'a> {
    pub index: &'a IndexModel,
    pub r_dim: usize,
    pub k_dim: usize,
    pub objective: Objective,
    pub cost_ag: &'a Array3<f64>,
    pub revenue_ag: &'a Array3<f64>,
    pub quantity_ag: &'a Array3<f64>,
    pub transition_ag: &'a Array3<f64>,
    pub ghg_ag: &'a Array3<f64>,
    pub water_net_ag: &'a Array3<f64>,
    pub exclude_ag: &'a Array3<bool>,
    pub exclude_non_ag: &'a Array2<bool>,
    pub cost_non_ag: &'a Array2<f64>,
    pub revenue_non_ag: &'a Array2<f64>,
    pub transition_non_ag: &'a Array2<f64>,
    pub ghg_non_ag: &'a Array2<f64>,
    /// `(cost_delta, revenue_delta, yield_delta, ghg_delta)` per management,
    /// in [`IndexModel::ag_managements`] order.
    pub am_deltas: &'a [(Array3<f64>, Array3<f64>, Array3<f64>, Array3<f64>)],
    pub demand: &'a Array1<f64>,
    pub demand_constraint_type: DemandConstraintType,
    pub penalty: f64,
    pub water_regions: &'a [Region],
    pub water_stress_fraction: f64,
    pub ghg_cap: Option<f64>,
    pub biodiversity: Option<(&'a Array2<f64>, &'a Array2<f64>, f64)>,
}

/// The resolved demand-penalty ceiling: a single scalar large enough that
/// the soft-demand slack is never cheaper than actually meeting demand,
/// without the original implementation's undefined per-commodity index.
pub fn resolve_penalty(cost_ag: &Array3<f64>, penalty_level: f64, resfactor: u32) -> f64 {
    let max_cost = cost_ag.iter().cloned().fold(0.0_f64, f64::max);
    penalty_level * max_cost * (resfactor as f64).powi(2)
}

/// Assemble one year's complete linear program.
pub fn build_program(inputs: &ProgramInputs) -> (LpProblem, VariableLayout) {
    let layout = VariableLayout::build(inputs.index, inputs.r_dim, inputs.k_dim);
    let bounds = layout::variable_bounds(&layout, inputs.exclude_ag, inputs.exclude_non_ag);

    let cost_deltas: Vec<Array3<f64>> = inputs.am_deltas.iter().map(|(c, ..)| c.clone()).collect();
    let revenue_deltas: Vec<Array3<f64>> = inputs.am_deltas.iter().map(|(_, r, ..)| r.clone()).collect();
    let yield_deltas: Vec<Array3<f64>> = inputs.am_deltas.iter().map(|(_, _, y, _)| y.clone()).collect();
    let ghg_deltas: Vec<Array3<f64>> = inputs.am_deltas.iter().map(|(_, _, _, g)| g.clone()).collect();
    let objective_am_deltas: Vec<(Array3<f64>, Array3<f64>)> = cost_deltas
        .iter()
        .zip(revenue_deltas.iter())
        .map(|(c, r)| (c.clone(), r.clone()))
        .collect();

    let objective_expr = objective::build_objective(
        &layout,
        inputs.objective,
        inputs.cost_ag,
        inputs.revenue_ag,
        inputs.transition_ag,
        inputs.cost_non_ag,
        inputs.revenue_non_ag,
        inputs.transition_non_ag,
        objective_am_deltas.as_slice(),
        inputs.penalty,
    );
    let objective_sense = match inputs.objective {
        Objective::MinimiseCost => ObjectiveSense::Minimise,
        Objective::MaximiseProfit => ObjectiveSense::Maximise,
    };

    let mut all_constraints = Vec::new();
    all_constraints.extend(constraints::area_conservation(&layout));
    all_constraints.extend(constraints::am_subordination(&layout));
    all_constraints.extend(constraints::commodity_demand(
        &layout,
        inputs.index,
        inputs.quantity_ag,
        &yield_deltas,
        inputs.demand,
        inputs.penalty,
        inputs.demand_constraint_type,
    ));
    all_constraints.extend(constraints::regional_water_net_yield(
        &layout,
        inputs.water_regions,
        inputs.water_net_ag,
        inputs.water_stress_fraction,
    ));
    if let Some(cap) = inputs.ghg_cap {
        all_constraints.push(constraints::ghg_cap(
            &layout,
            inputs.ghg_ag,
            inputs.ghg_non_ag,
            &ghg_deltas,
            cap,
        ));
    }
    if let Some((score_ag, score_non_ag, target)) = inputs.biodiversity {
        all_constraints.push(constraints::biodiversity_floor(&layout, score_ag, score_non_ag, target));
    }

    let variables = bounds
        .into_iter()
        .enumerate()
        .map(|(i, (lower, upper))| Variable {
            name: format!("v{i}"),
            lower,
            upper,
        })
        .collect();

    let problem = LpProblem {
        variables,
        objective: objective_expr,
        objective_sense,
        constraints: all_constraints,
    };
    (problem, layout)
}
