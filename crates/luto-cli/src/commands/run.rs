use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use luto_core::config::{RunConfig, Toggle};
use luto_core::types::{
    CullMode, DemandConstraintType, GhgLimitsType, Objective, RunMode, WaterLimitsType, WaterRegionDef,
};
use luto_run::RunLoop;
use luto_solver_lp::ClarabelAdapter;
use rayon::ThreadPoolBuilder;
use tabwriter::TabWriter;
use tracing::info;

use crate::demo_provider::DemoProvider;

/// A small snapshot config against the bundled demo provider, used when no
/// `--config` file is supplied.
fn default_config(yr_cal_target: u32) -> RunConfig {
    RunConfig {
        resfactor: 1,
        mode: RunMode::Snapshot,
        objective: Objective::MinimiseCost,
        demand_constraint_type: DemandConstraintType::Soft,
        penalty: 1.0e6,
        water_use_limits: Toggle::Off,
        water_limits_type: WaterLimitsType::WaterStress,
        water_stress_fraction: 0.4,
        water_region_def: WaterRegionDef::Rr,
        water_limits_target_year: yr_cal_target,
        ghg_emissions_limits: Toggle::Off,
        ghg_limits_type: GhgLimitsType::Percentage,
        ghg_reduction_percentage: 0.0,
        cull_mode: CullMode::None,
        max_land_uses_per_cell: 0,
        land_usage_cull_percentage: 0.0,
        ag_managements: HashMap::new(),
        non_ag_land_uses: HashMap::new(),
        discount_rate: 0.05,
        amortisation_period: 30,
        carbon_price_per_tonne: 30.0,
        env_planting_cost_per_ha_per_year: 0.0,
        optimality_tolerance: 1e-6,
        threads: num_cpus::get(),
        ssp: "SSP2".into(),
        rcp: "4.5".into(),
        yr_cal_base: 2020,
        yr_cal_target,
        accept_suboptimal: false,
    }
}

pub fn handle(config: Option<&Path>, yr_cal_target: u32) -> Result<()> {
    let config = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            RunConfig::from_json(&json).with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => default_config(yr_cal_target),
    };

    let _ = ThreadPoolBuilder::new().num_threads(config.threads).build_global();

    let provider = DemoProvider::new();
    let solver = ClarabelAdapter::new();
    let run_loop = RunLoop::new(&provider, &solver, &config);

    info!(mode = ?config.mode, target = config.yr_cal_target, "starting run");
    let report = run_loop.run()?;

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Year\tStatus\tObjective")?;
    for year in &report.years {
        writeln!(writer, "{}\t{:?}\t{:.2}", year.year, year.status, year.objective_value)?;
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    println!("{table}");

    Ok(())
}
