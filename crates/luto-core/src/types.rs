//! Shared domain enums used across the index model, data provider contract,
//! and run configuration.

use serde::{Deserialize, Serialize};

/// Shape of the original 2-D NLUM raster a [`crate::provider::DataProvider`]
/// is drawn from, needed by the RESFACTOR coarsen/reconstitute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub width: usize,
    pub height: usize,
}

impl GridShape {
    pub fn n_cells(self) -> usize {
        self.width * self.height
    }

    pub fn coords(self, idx: usize) -> (usize, usize) {
        (idx / self.width, idx % self.width)
    }

    pub fn index(self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

/// Land management regime: `dry` (rainfed) or `irr` (irrigated).
///
/// Ordered lexicographically: `Dry = 0`, `Irr = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandManagement {
    Dry = 0,
    Irr = 1,
}

impl LandManagement {
    pub const ALL: [LandManagement; 2] = [LandManagement::Dry, LandManagement::Irr];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// River region or drainage division: the unit of regional water accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterRegionDef {
    /// River region.
    Rr,
    /// Drainage division.
    Dd,
}

/// A water-accounting region: a partition of cells with a historical yield
/// and a derived net-yield target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    /// Dense-cell indices belonging to this region.
    pub cells: Vec<usize>,
    /// Historical yield, megalitres.
    pub historical_yield_ml: f64,
}

impl Region {
    /// Long-term net-yield target: `(1 - stress_fraction) * historical`.
    pub fn target_ml(&self, stress_fraction: f64) -> f64 {
        (1.0 - stress_fraction) * self.historical_yield_ml
    }
}

/// How the culler narrows the exclusion mask before the program is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    Absolute,
    Percentage,
    None,
}

/// Whether commodity-demand constraints are enforced with slack (`V[c]`)
/// or as hard equalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandConstraintType {
    Soft,
    Hard,
}

/// The sense of the program objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    MinimiseCost,
    MaximiseProfit,
}

/// How the GHG emissions cap for a year is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhgLimitsType {
    /// A percentage reduction relative to year-0 agricultural emissions.
    Percentage,
    /// A literal tonnage.
    Tonnes,
    /// A per-year value from a supplied table.
    File,
}

/// How the regional water-use cap is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterLimitsType {
    /// A percentage of year-0 agricultural water use.
    PctAg,
    /// `(1 - stress_fraction) * historical_yield`.
    WaterStress,
}

/// Run Loop execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Solve `YR_TARGET` only, with previous-map = base-year map.
    Snapshot,
    /// Solve every year from base+1 to target.
    Timeseries,
}

/// Solver termination status, as reported by a [`crate::solver::SolverAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Suboptimal,
    Infeasible,
    Unbounded,
    Timeout,
}

impl SolveStatus {
    /// Whether this status is acceptable given `accept_suboptimal`.
    pub fn is_acceptable(self, accept_suboptimal: bool) -> bool {
        match self {
            SolveStatus::Optimal => true,
            SolveStatus::Suboptimal => accept_suboptimal,
            SolveStatus::Infeasible | SolveStatus::Unbounded | SolveStatus::Timeout => false,
        }
    }
}
