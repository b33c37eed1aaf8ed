//! Run configuration: every knob the core consumes, validated once at
//! construction rather than checked ad hoc throughout the run loop.

use crate::error::{LutoError, LutoResult};
use crate::types::{
    CullMode, DemandConstraintType, GhgLimitsType, Objective, RunMode, WaterLimitsType,
    WaterRegionDef,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a toggleable constraint group is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

/// Full run configuration, deserialisable from a JSON config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub resfactor: u32,
    pub mode: RunMode,
    pub objective: Objective,
    pub demand_constraint_type: DemandConstraintType,
    pub penalty: f64,

    pub water_use_limits: Toggle,
    pub water_limits_type: WaterLimitsType,
    pub water_stress_fraction: f64,
    pub water_region_def: WaterRegionDef,
    pub water_limits_target_year: u32,

    pub ghg_emissions_limits: Toggle,
    pub ghg_limits_type: GhgLimitsType,
    pub ghg_reduction_percentage: f64,

    pub cull_mode: CullMode,
    pub max_land_uses_per_cell: usize,
    pub land_usage_cull_percentage: f64,

    pub ag_managements: HashMap<String, bool>,
    pub non_ag_land_uses: HashMap<String, bool>,

    pub discount_rate: f64,
    pub amortisation_period: u32,
    pub carbon_price_per_tonne: f64,
    pub env_planting_cost_per_ha_per_year: f64,
    pub optimality_tolerance: f64,
    pub threads: usize,
    pub ssp: String,
    pub rcp: String,
    pub yr_cal_base: u32,
    pub yr_cal_target: u32,

    /// Accept a `SUBOPTIMAL` solver status as usable, per spec's
    /// `SolveError` continuation rule.
    pub accept_suboptimal: bool,
}

impl RunConfig {
    /// Validate cross-field invariants the data model can't express on its
    /// own. Called once at run start; any failure is a [`LutoError::Config`].
    pub fn validate(&self) -> LutoResult<()> {
        if self.resfactor < 1 {
            return Err(LutoError::Config("RESFACTOR must be >= 1".into()));
        }
        if self.yr_cal_target <= self.yr_cal_base {
            return Err(LutoError::Config(
                "YR_CAL_TARGET must be greater than YR_CAL_BASE".into(),
            ));
        }
        if self.water_use_limits.is_on() && self.water_limits_target_year <= self.yr_cal_base {
            return Err(LutoError::Config(
                "WATER_LIMITS_TARGET_YEAR must be greater than YR_CAL_BASE".into(),
            ));
        }
        if self.water_use_limits.is_on()
            && !(0.0..1.0).contains(&self.water_stress_fraction)
            && matches!(self.water_limits_type, WaterLimitsType::WaterStress)
        {
            return Err(LutoError::Config(
                "WATER_STRESS_FRACTION must be in (0, 1)".into(),
            ));
        }
        if self.penalty <= 0.0 {
            return Err(LutoError::Config("PENALTY must be > 0".into()));
        }
        if self.ghg_emissions_limits.is_on()
            && matches!(self.ghg_limits_type, GhgLimitsType::Percentage)
            && !(0.0..=100.0).contains(&self.ghg_reduction_percentage)
        {
            return Err(LutoError::Config(
                "GHG_REDUCTION_PERCENTAGE must be in [0, 100]".into(),
            ));
        }
        if matches!(self.cull_mode, CullMode::Percentage)
            && !(0.0..=1.0).contains(&self.land_usage_cull_percentage)
        {
            return Err(LutoError::Config(
                "LAND_USAGE_CULL_PERCENTAGE must be in [0, 1]".into(),
            ));
        }
        if matches!(self.cull_mode, CullMode::Absolute) && self.max_land_uses_per_cell == 0 {
            return Err(LutoError::Config(
                "MAX_LAND_USES_PER_CELL must be > 0 in absolute cull mode".into(),
            ));
        }
        if self.discount_rate < 0.0 {
            return Err(LutoError::Config("DISCOUNT_RATE must be >= 0".into()));
        }
        Ok(())
    }

    /// Parse and validate a config from a JSON document.
    pub fn from_json(json: &str) -> LutoResult<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            resfactor: 1,
            mode: RunMode::Snapshot,
            objective: Objective::MinimiseCost,
            demand_constraint_type: DemandConstraintType::Soft,
            penalty: 1000.0,
            water_use_limits: Toggle::On,
            water_limits_type: WaterLimitsType::WaterStress,
            water_stress_fraction: 0.4,
            water_region_def: WaterRegionDef::Rr,
            water_limits_target_year: 2030,
            ghg_emissions_limits: Toggle::On,
            ghg_limits_type: GhgLimitsType::Percentage,
            ghg_reduction_percentage: 50.0,
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
            threads: 1,
            ssp: "SSP2".into(),
            rcp: "4.5".into(),
            yr_cal_base: 2010,
            yr_cal_target: 2030,
            accept_suboptimal: false,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn target_year_before_base_year_is_rejected() {
        let mut config = base_config();
        config.yr_cal_target = 2000;
        assert!(matches!(config.validate(), Err(LutoError::Config(_))));
    }

    #[test]
    fn water_limits_target_year_before_base_is_rejected() {
        let mut config = base_config();
        config.water_limits_target_year = 2000;
        assert!(matches!(config.validate(), Err(LutoError::Config(_))));
    }

    #[test]
    fn zero_penalty_is_rejected() {
        let mut config = base_config();
        config.penalty = 0.0;
        assert!(matches!(config.validate(), Err(LutoError::Config(_))));
    }
}
