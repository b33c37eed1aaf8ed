//! The Run Loop: drives one year at a time from the RESFACTOR active-cell
//! selection through matrix building, transition costs, culling, program
//! assembly, solve and decode, folding each year's result back into state
//! before moving to the next.

use crate::state::RunState;
use luto_algo::{coarsen, cull, matrices, transitions};
use luto_core::config::RunConfig;
use luto_core::error::{LutoError, LutoResult};
use luto_core::index::{AgManagement, IndexModel};
use luto_core::provider::{AmEffect, DataProvider};
use luto_core::solver::{SolveOptions, SolverAdapter};
use luto_core::types::{GhgLimitsType, RunMode, SolveStatus};
use luto_program::{build_program, decode::decode_solution, resolve_penalty, ProgramInputs};
use ndarray::{Array1, Array3, Axis};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, info_span, warn};

/// Outcome of one solved year.
#[derive(Debug, Clone)]
pub struct YearReport {
    pub year: u32,
    pub objective_value: f64,
    pub status: SolveStatus,
}

/// The run's full outcome: final persisted state plus one report per
/// solved year, in solve order.
pub struct RunReport {
    pub state: RunState,
    pub years: Vec<YearReport>,
}

/// Builds an [`IndexModel`] from whatever a data provider exposes. Pulled
/// out of the loop body since it's needed once per run, not once per year.
pub fn build_index(provider: &dyn DataProvider) -> LutoResult<IndexModel> {
    IndexModel::build(
        provider.land_uses_ag().to_vec(),
        provider.products().to_vec(),
        provider.commodities().to_vec(),
        provider.lu2pr().clone(),
        provider.pr2cm().clone(),
        provider.ag_managements().to_vec(),
    )
}

/// Resolve the named agricultural-management effect lookup a given
/// [`AgManagement`] draws from. Unrecognised names (a config typo past
/// validation) fall back to "no effect", rather than panicking mid-run.
fn am_effect<'p>(provider: &'p dyn DataProvider, am: &AgManagement, lu: &str, y: u32) -> Option<AmEffect> {
    match am.name.as_str() {
        "Asparagopsis taxiformis" => provider.asparagopsis(lu, y),
        "Precision Agriculture" => provider.precision_ag(lu, y),
        "Ecological Grazing" => provider.ecological_grazing(lu, y),
        "Savanna Burning" => provider.savanna_burning(lu, y),
        "AgTech EI" => provider.agtech_ei(lu, y),
        other => {
            warn!(management = other, "no effect lookup registered for this agricultural management");
            None
        }
    }
}

/// Orchestrates the whole multi-year optimisation against one data
/// provider and solver adapter.
pub struct RunLoop<'a, S: SolverAdapter> {
    provider: &'a dyn DataProvider,
    solver: &'a S,
    config: &'a RunConfig,
    cancelled: Arc<AtomicBool>,
}

impl<'a, S: SolverAdapter> RunLoop<'a, S> {
    pub fn new(provider: &'a dyn DataProvider, solver: &'a S, config: &'a RunConfig) -> Self {
        Self {
            provider,
            solver,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle the caller can use to request cancellation between years.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn run(&self) -> LutoResult<RunReport> {
        self.config.validate()?;
        let index = build_index(self.provider)?;
        let mut state = RunState::seed(self.provider);

        let baseline_ghg_total: f64 = matrices::ghg_ag(&index, self.provider, &state.lumap, &state.lmmap)?
            .iter()
            .sum();

        let years: Vec<u32> = match self.config.mode {
            RunMode::Snapshot => vec![self.config.yr_cal_target],
            RunMode::Timeseries => (self.config.yr_cal_base + 1..=self.config.yr_cal_target).collect(),
        };

        let mut reports = Vec::with_capacity(years.len());
        for year in years {
            if self.cancelled.load(Ordering::Relaxed) {
                info!(year, "run cancelled before solving");
                break;
            }
            let span = info_span!("solve_year", year);
            let _enter = span.enter();
            let report = self.solve_year(&index, &mut state, year, baseline_ghg_total)?;
            reports.push(report);
        }

        Ok(RunReport { state, years: reports })
    }

    fn solve_year(
        &self,
        index: &IndexModel,
        state: &mut RunState,
        year: u32,
        baseline_ghg_total: f64,
    ) -> LutoResult<YearReport> {
        let grid = self.provider.grid_shape();
        let lumask = coarsen::lumask(&state.lumap);
        let rfmask = coarsen::resmask(grid, self.config.resfactor);
        let active_mask = coarsen::active_mask(&lumask, &rfmask);

        let lumap_active = coarsen::select_active(&state.lumap, &active_mask);
        let lmmap_active = coarsen::select_active(&state.lmmap, &active_mask);
        let real_area_active = coarsen::select_active(self.provider.real_area_ha(), &active_mask);
        let licence_price_active = coarsen::select_active(self.provider.water_licence_price(), &active_mask);

        // The six tensor builders below are independent pure functions of
        // this year's provider state, so they run across a thread pool the
        // same way independent per-management work is fanned out further
        // down — `exclude_ag` stays sequential since it's a cheap
        // pass-through, not worth a thread-pool round trip.
        let builders: Vec<Box<dyn Fn() -> LutoResult<Array3<f64>> + Send + Sync + '_>> = vec![
            Box::new(|| matrices::cost_ag(index, self.provider)),
            Box::new(|| matrices::revenue_ag(index, self.provider)),
            Box::new(|| matrices::quantity_ag(index, self.provider)),
            Box::new(|| matrices::ghg_ag(index, self.provider, &state.lumap, &state.lmmap)),
            Box::new(|| matrices::water_req_ag(index, self.provider)),
            Box::new(|| matrices::water_yield_ag(index, self.provider, year)),
        ];
        let mut built = builders
            .into_par_iter()
            .map(|build| build())
            .collect::<LutoResult<Vec<_>>>()?
            .into_iter();
        let cost_ag_full = built.next().unwrap();
        let revenue_ag_full = built.next().unwrap();
        let quantity_ag_full = built.next().unwrap();
        let ghg_ag_full = built.next().unwrap();
        let water_req_full = built.next().unwrap();
        let water_yield_full = built.next().unwrap();
        let water_net_full = matrices::water_net_ag(&water_yield_full, &water_req_full);
        let exclude_full = matrices::exclude_ag(index, self.provider)?;

        let deforestation_full = transitions::deforestation_penalty(
            &state.lumap,
            self.provider.natural_land_t_co2_ha(),
            self.provider.real_area_ha(),
            index.lu_natural(),
            index.lu_unnatural(),
            index.n_land_uses(),
        );
        let ghg_ag_full = ghg_ag_full + &deforestation_full;

        let cost_ag = coarsen::select_active_mrj(&cost_ag_full, &active_mask);
        let revenue_ag = coarsen::select_active_mrj(&revenue_ag_full, &active_mask);
        let quantity_ag = coarsen::select_active_mrj(&quantity_ag_full, &active_mask);
        let ghg_ag = coarsen::select_active_mrj(&ghg_ag_full, &active_mask);
        let water_net_ag = coarsen::select_active_mrj(&water_net_full, &active_mask);
        let exclude_ag_raw = coarsen::select_active_mrj(&exclude_full, &active_mask);

        let cost_non_ag = coarsen::select_active_rk(&matrices::cost_non_ag(self.provider)?, &active_mask);
        let ghg_non_ag = coarsen::select_active_rk(&matrices::ghg_non_ag(self.provider)?, &active_mask);
        let revenue_non_ag_full = matrices::revenue_non_ag(self.provider, self.config.carbon_price_per_tonne)?;
        let revenue_non_ag = coarsen::select_active_rk(&revenue_non_ag_full, &active_mask);
        let transition_non_ag_full =
            matrices::transition_non_ag(self.provider, self.config.env_planting_cost_per_ha_per_year)?;
        let transition_non_ag = coarsen::select_active_rk(&transition_non_ag_full, &active_mask);
        let exclude_non_ag_full = matrices::exclude_non_ag(self.provider)?;
        let exclude_non_ag = coarsen::select_active_rk(&exclude_non_ag_full, &active_mask);

        let wr_irr_rj = water_req_full.index_axis(Axis(0), 1).to_owned();
        let wr_irr_rj_active = coarsen::select_active_rk(&wr_irr_rj, &active_mask);
        let transition_ag = transitions::build_transition_matrices(
            &lumap_active,
            &lmmap_active,
            self.provider.transition_matrix_ag(),
            &wr_irr_rj_active,
            &real_area_active,
            &licence_price_active,
            self.config.discount_rate,
            self.config.amortisation_period,
        );

        let exclude_ag = cull::apply_cull(
            self.config.cull_mode,
            self.config.max_land_uses_per_cell,
            self.config.land_usage_cull_percentage,
            &exclude_ag_raw,
            &cost_ag,
            &transition_ag,
            &revenue_ag,
        );

        // Each management's delta tensors are independent of every other
        // management's, so compute them across a thread pool the same way
        // independent per-scenario work is fanned out elsewhere in this
        // stack.
        let am_deltas: Vec<(Array3<f64>, Array3<f64>, Array3<f64>, Array3<f64>)> = index
            .ag_managements()
            .par_iter()
            .map(|am| -> LutoResult<_> {
                let cost = matrices::am_cost_delta(index, am, &cost_ag, |lu, y| am_effect(self.provider, am, lu, y), year)?;
                let revenue =
                    matrices::am_revenue_delta(index, am, &revenue_ag, |lu, y| am_effect(self.provider, am, lu, y), year)?;
                let yield_delta =
                    matrices::am_quantity_delta(index, am, &quantity_ag, |lu, y| am_effect(self.provider, am, lu, y), year)?;
                let ghg = matrices::am_ghg_delta(index, am, &ghg_ag, |lu, y| am_effect(self.provider, am, lu, y), year)?;
                Ok((cost, revenue, yield_delta, ghg))
            })
            .collect::<LutoResult<Vec<_>>>()?;
        let yield_deltas: Vec<Array3<f64>> = am_deltas.iter().map(|(_, _, y, _)| y.clone()).collect();

        let penalty = resolve_penalty(&cost_ag, self.config.penalty, self.config.resfactor);

        let demand = self.provider.demand_deltas_c(year);

        let water_regions = if self.config.water_use_limits.is_on() {
            let water_regions_full = match self.config.water_region_def {
                luto_core::types::WaterRegionDef::Rr => self.provider.region_limits_river(),
                luto_core::types::WaterRegionDef::Dd => self.provider.region_limits_drainage(),
            };
            coarsen::remap_regions(water_regions_full, &active_mask)
        } else {
            Vec::new()
        };

        let ghg_cap = if self.config.ghg_emissions_limits.is_on() {
            Some(self.resolve_ghg_cap(baseline_ghg_total, year)?)
        } else {
            None
        };

        let inputs = ProgramInputs {
            index,
            r_dim: lumap_active.len(),
            k_dim: self.provider.land_uses_non_ag().len(),
            objective: self.config.objective,
            cost_ag: &cost_ag,
            revenue_ag: &revenue_ag,
            quantity_ag: &quantity_ag,
            transition_ag: &transition_ag,
            ghg_ag: &ghg_ag,
            water_net_ag: &water_net_ag,
            exclude_ag: &exclude_ag,
            exclude_non_ag: &exclude_non_ag,
            cost_non_ag: &cost_non_ag,
            revenue_non_ag: &revenue_non_ag,
            transition_non_ag: &transition_non_ag,
            ghg_non_ag: &ghg_non_ag,
            am_deltas: &am_deltas,
            demand: &demand,
            demand_constraint_type: self.config.demand_constraint_type,
            penalty,
            water_regions: &water_regions,
            water_stress_fraction: self.config.water_stress_fraction,
            ghg_cap,
            biodiversity: None,
        };

        let (problem, layout) = build_program(&inputs);
        let handle = self.solver.build_model(problem)?;
        let options = SolveOptions {
            optimality_tolerance: self.config.optimality_tolerance,
            time_limit_secs: None,
            threads: self.config.threads,
        };
        let solution = self.solver.solve(handle, &options)?;

        if !solution.status.is_acceptable(self.config.accept_suboptimal) {
            return Err(LutoError::Solve(format!(
                "year {year} solve finished with status {:?}",
                solution.status
            )));
        }

        let decoded = decode_solution(&layout, index, &solution, 0.5);

        let pr2cm = index.pr2cm();
        let production: Array1<f64> = (0..layout.c_dim())
            .map(|c| {
                let mut total = 0.0;
                for j in 0..layout.j_dim() {
                    let products: Vec<usize> = index.products_of(j).into_iter().filter(|&p| pr2cm[[c, p]]).collect();
                    if products.is_empty() {
                        continue;
                    }
                    for m in 0..2 {
                        for r in 0..layout.r_dim() {
                            let q: f64 = products.iter().map(|&p| quantity_ag[[m, r, p]]).sum();
                            if q != 0.0 {
                                total += q * solution.value(layout.x_index(m, r, j));
                            }
                        }
                    }
                }
                for slot in layout.am_slots() {
                    let products: Vec<usize> = index
                        .products_of(slot.j)
                        .into_iter()
                        .filter(|&p| pr2cm[[c, p]])
                        .collect();
                    if products.is_empty() {
                        continue;
                    }
                    let delta = &yield_deltas[slot.am_idx];
                    for m in 0..2 {
                        for r in 0..layout.r_dim() {
                            let d: f64 = products.iter().map(|&p| delta[[m, r, p]]).sum();
                            if d == 0.0 {
                                continue;
                            }
                            if let Some(idx) = layout.a_index(slot.am_idx, m, r, slot.j) {
                                total += d * solution.value(idx);
                            }
                        }
                    }
                }
                total
            })
            .collect();

        state.apply_year(&decoded, &active_mask, &lumask);
        state.record_production(year, production);

        let retained_pct = 100.0 * lumap_active.len() as f64 / self.provider.n_cells() as f64;
        info!(
            year,
            objective = solution.objective_value,
            status = ?solution.status,
            cells = lumap_active.len(),
            retained_pct,
            "year solved"
        );

        Ok(YearReport {
            year,
            objective_value: solution.objective_value,
            status: solution.status,
        })
    }

    /// Resolve the year's GHG cap per [`GhgLimitsType`]: a percentage of
    /// year-0 agricultural emissions, a literal tonnage, or a per-year
    /// table value.
    fn resolve_ghg_cap(&self, baseline_ghg_total: f64, year: u32) -> LutoResult<f64> {
        match self.config.ghg_limits_type {
            GhgLimitsType::Percentage => {
                Ok(baseline_ghg_total * (1.0 - self.config.ghg_reduction_percentage / 100.0))
            }
            GhgLimitsType::Tonnes => self
                .provider
                .ghg_targets(year)
                .ok_or_else(|| LutoError::Data(format!("no GHG target supplied for year {year}"))),
            GhgLimitsType::File => self
                .provider
                .ghg_targets(year)
                .ok_or_else(|| LutoError::Data(format!("no GHG target supplied for year {year}"))),
        }
    }
}
