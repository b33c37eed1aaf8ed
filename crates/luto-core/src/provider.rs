//! The Data Provider contract: the boundary between the core and whatever
//! loads raw rasters, economic tables and climate series into memory.
//!
//! Ingestion of those raw inputs is explicitly out of scope for this crate;
//! a `DataProvider` implementation hands over already-materialised numeric
//! arrays and the core never looks past this trait.

use crate::index::{AgManagementSpec, LandUse, Product};
use crate::types::{GridShape, LandManagement, Region};
use ndarray::{Array1, Array2};

/// Per-cell economic attributes for agricultural crops or livestock,
/// indexed `(attribute, land_management, landuse|animal)`.
#[derive(Debug, Clone)]
pub struct EconAttributes {
    pub attribute_names: Vec<String>,
    /// `(attribute, M, J)` dense tensor, one value per cell-independent
    /// per-hectare rate; builders broadcast these against `REAL_AREA`.
    pub values: ndarray::Array3<f64>,
}

impl EconAttributes {
    /// Look up one named attribute's `(M, J)` per-hectare rate table.
    pub fn attribute(&self, name: &str) -> Option<ndarray::ArrayView2<'_, f64>> {
        let idx = self.attribute_names.iter().position(|n| n == name)?;
        Some(self.values.index_axis(ndarray::Axis(0), idx))
    }
}

/// Per-cell GHG emission factors, same indexing scheme as [`EconAttributes`].
#[derive(Debug, Clone)]
pub struct GhgFactors {
    pub component_names: Vec<String>,
    pub values: ndarray::Array3<f64>,
}

impl GhgFactors {
    /// Look up one named emissions component's `(M, J)` per-hectare rate.
    pub fn component(&self, name: &str) -> Option<ndarray::ArrayView2<'_, f64>> {
        let idx = self.component_names.iter().position(|n| n == name)?;
        Some(self.values.index_axis(ndarray::Axis(0), idx))
    }

    pub fn component_names_iter(&self) -> impl Iterator<Item = &str> {
        self.component_names.iter().map(|s| s.as_str())
    }
}

/// Immutable, preloaded numeric data consumed by the core for one run.
///
/// Implementations are expected to be read-only and side-effect free after
/// construction: the core calls these methods repeatedly across years and
/// assumes the same `y` always yields the same answer.
pub trait DataProvider: Send + Sync {
    /// Number of active cells, their area in hectares, their region id, and
    /// their root-depth class (as an index into [`crate::index::RootDepth`]
    /// land-use buckets is not meaningful per-cell; this returns the raw
    /// root class for water-yield lookups).
    fn n_cells(&self) -> usize;
    /// The original 2-D raster shape backing [`Self::n_cells`] flat cells,
    /// needed by the RESFACTOR coarsen/reconstitute step.
    fn grid_shape(&self) -> GridShape;
    fn real_area_ha(&self) -> &Array1<f64>;
    fn region_of_cell(&self) -> &Array1<usize>;

    fn land_uses_ag(&self) -> &[LandUse];
    fn land_uses_non_ag(&self) -> &[String];
    fn land_managements(&self) -> &[LandManagement];
    fn ag_managements(&self) -> &[AgManagementSpec];
    fn products(&self) -> &[Product];
    fn commodities(&self) -> &[String];
    fn lu2pr(&self) -> &Array2<bool>;
    fn pr2cm(&self) -> &Array2<bool>;

    fn agec_crops(&self) -> &EconAttributes;
    fn agec_lvstk(&self) -> &EconAttributes;
    fn agghg_crops(&self) -> &GhgFactors;
    fn agghg_lvstk(&self) -> &GhgFactors;

    /// `(2, P)` per-hectare physical-quantity rate, dry/irr, one row per
    /// product rather than per land use — the mapping a land use's
    /// distinct products (e.g. meat and wool from the same livestock land
    /// use) need to carry distinct yields.
    fn quantity_per_ha_mp(&self) -> Array2<f64>;

    /// Non-agricultural per-hectare cost/quantity attributes, indexed
    /// `(attribute, 0, k)` — non-agricultural land uses carry no dry/irr
    /// split, so the management axis is always `0`.
    fn econ_non_ag(&self) -> &EconAttributes;
    /// Non-agricultural per-hectare emission factors, same indexing as
    /// [`Self::econ_non_ag`].
    fn ghg_non_ag(&self) -> &GhgFactors;

    /// `(M, R, J)` base eligibility mask: land-use/land-management
    /// combinations a cell may be assigned to before culling or AM
    /// subordination are applied (irrigation infrastructure reach, soil
    /// suitability, and similar out-of-scope raster-derived rules).
    fn base_exclusion_mask(&self) -> ndarray::Array3<bool>;

    /// `(R, K)` base eligibility mask for non-agricultural land uses,
    /// mirroring [`Self::base_exclusion_mask`] for the `N` variables.
    fn base_exclusion_mask_non_ag(&self) -> Array2<bool>;

    /// `(R,)` land uses currently grazed as pasture, used to select which
    /// cells receive the irrigated-pasture hay emissions add-on.
    fn is_irrigated_pasture(&self, lumap: &Array1<i32>, lmmap: &Array1<LandManagement>) -> Vec<bool>;

    /// `(J, J)` raw transition-cost matrix, AUD/ha.
    fn transition_matrix_ag(&self) -> &Array2<f64>;
    /// `(R,)` one-off deforestation GHG cost, tCO2e/ha, charged when a cell
    /// currently on natural land is converted to an unnatural land use.
    fn natural_land_t_co2_ha(&self) -> &Array1<f64>;

    fn water_licence_price(&self) -> &Array1<f64>;
    fn water_delivery_price(&self) -> &Array1<f64>;

    /// Dryland water yield, ML/ha/cell, for year `y`.
    fn water_yield_dr(&self, y: u32) -> Array1<f64>;
    /// Shallow-rooted irrigated water yield, ML/ha/cell, for year `y`.
    fn water_yield_sr(&self, y: u32) -> Array1<f64>;
    /// Natural-land water yield, ML/ha/cell, for year `y`.
    fn water_yield_nl(&self, y: u32) -> Array1<f64>;
    /// Climate-change impact on water yield for `region` at year `y`, ML.
    fn water_ccimpact(&self, region: &str, y: u32) -> f64;

    fn region_limits_river(&self) -> &[Region];
    fn region_limits_drainage(&self) -> &[Region];

    /// Per-commodity demand delta for year `y` (ML or t, per commodity).
    fn demand_deltas_c(&self, y: u32) -> Array1<f64>;
    /// Business-as-usual productivity increase multiplier for year `y`.
    fn bau_productivity_increase(&self, y: u32) -> Array1<f64>;

    /// Asparagopsis methane-suppressant effect table for `land_use` at `y`.
    fn asparagopsis(&self, land_use: &str, y: u32) -> Option<AmEffect>;
    /// Precision-agriculture effect table for `land_use` at `y`.
    fn precision_ag(&self, land_use: &str, y: u32) -> Option<AmEffect>;
    /// Ecological-grazing effect table for `land_use` at `y`.
    fn ecological_grazing(&self, land_use: &str, y: u32) -> Option<AmEffect>;
    /// Savanna-burning effect table for `land_use` at `y`.
    fn savanna_burning(&self, land_use: &str, y: u32) -> Option<AmEffect>;
    /// Agtech energy-intensity effect table for `land_use` at `y`.
    fn agtech_ei(&self, land_use: &str, y: u32) -> Option<AmEffect>;

    /// GHG emissions cap for year `y`, tonnes CO2e, if enabled.
    fn ghg_targets(&self, y: u32) -> Option<f64>;
    /// Biodiversity cap for year `y`, if enabled.
    fn biodiversity_targets(&self, y: u32) -> Option<f64>;

    /// Year-0 seed land-use map, `-1` where non-agricultural.
    fn seed_lumap(&self) -> Array1<i32>;
    /// Year-0 seed land-management map.
    fn seed_lmmap(&self) -> Array1<LandManagement>;
    /// Year-0 seed AM maps, one boolean array per agricultural management.
    fn seed_ammap(&self) -> Vec<Array1<bool>>;
}

/// A per-(land-use, year) agricultural-management effect table: multipliers
/// or absolute reductions applied to cost, revenue, yield, water and the
/// GHG emission components it touches.
///
/// Each field is `None` when the management has no effect on that axis for
/// this land use/year, rather than silently defaulting to a shared table —
/// see design note (b): AM data must never be implicitly shared across
/// managements.
#[derive(Debug, Clone, Default)]
pub struct AmEffect {
    pub cost_multiplier: Option<f64>,
    pub revenue_multiplier: Option<f64>,
    pub yield_multiplier: Option<f64>,
    pub water_req_multiplier: Option<f64>,
    /// Per-component GHG multiplier, keyed by the same component names as
    /// [`GhgFactors::component_names`].
    pub ghg_component_multipliers: Vec<(String, f64)>,
}
