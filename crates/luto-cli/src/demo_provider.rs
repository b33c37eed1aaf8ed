//! A small, literal in-memory [`DataProvider`]. This is a demonstration
//! fixture, not an ingestion pipeline: every array below is hand-written,
//! nothing here parses a raster or a spreadsheet.

use luto_core::index::{AgManagementSpec, LandUse, LandUseCategory, Product, RootDepth};
use luto_core::provider::{AmEffect, DataProvider, EconAttributes, GhgFactors};
use luto_core::types::{GridShape, LandManagement, Region};
use ndarray::{Array1, Array2, Array3};

/// Six cells on a 3x2 grid. `J = {Wheat, Beef cattle - natural land,
/// Unallocated - natural land}`, `K = {Environmental plantings, Carbon
/// plantings}`, one agricultural management (Precision Agriculture on
/// Wheat).
pub struct DemoProvider {
    land_uses_ag: Vec<LandUse>,
    land_uses_non_ag: Vec<String>,
    ag_managements: Vec<AgManagementSpec>,
    products: Vec<Product>,
    commodities: Vec<String>,
    real_area: Array1<f64>,
    region_of_cell: Array1<usize>,
    lu2pr: Array2<bool>,
    pr2cm: Array2<bool>,
    agec_crops: EconAttributes,
    agec_lvstk: EconAttributes,
    agghg_crops: GhgFactors,
    agghg_lvstk: GhgFactors,
    econ_non_ag: EconAttributes,
    ghg_non_ag: GhgFactors,
    transition_matrix_ag: Array2<f64>,
    natural_land_t_co2_ha: Array1<f64>,
    water_licence_price: Array1<f64>,
    river_regions: Vec<Region>,
}

impl DemoProvider {
    pub fn new() -> Self {
        let land_uses_ag = vec![
            LandUse {
                name: "Wheat".into(),
                category: LandUseCategory::Crop,
                root_depth: RootDepth::Shallow,
            },
            LandUse {
                name: "Beef cattle - natural land".into(),
                category: LandUseCategory::LivestockNatural,
                root_depth: RootDepth::Deep,
            },
            LandUse {
                name: "Unallocated - natural land".into(),
                category: LandUseCategory::UnallocatedNatural,
                root_depth: RootDepth::Natural,
            },
        ];

        // Wheat: attribute, M, subset position (lu_crops = [0]).
        let crop_names = vec![
            "variable_cost_per_ha".to_string(),
            "fixed_cost_per_ha".to_string(),
            "quantity_per_ha".to_string(),
            "price_per_unit".to_string(),
        ];
        let mut crop_values = Array3::<f64>::zeros((crop_names.len(), 2, 1));
        crop_values[[0, 0, 0]] = 80.0;
        crop_values[[0, 1, 0]] = 110.0;
        crop_values[[1, 0, 0]] = 20.0;
        crop_values[[1, 1, 0]] = 20.0;
        crop_values[[2, 0, 0]] = 2.2;
        crop_values[[2, 1, 0]] = 3.4;
        crop_values[[3, 0, 0]] = 330.0;
        crop_values[[3, 1, 0]] = 330.0;

        // Beef cattle: attribute, M, subset position (lu_lvstk = [1]).
        let lvstk_names = vec![
            "variable_cost_per_ha".to_string(),
            "fixed_cost_per_ha".to_string(),
            "quantity_per_ha".to_string(),
            "price_per_unit".to_string(),
        ];
        let mut lvstk_values = Array3::<f64>::zeros((lvstk_names.len(), 2, 1));
        lvstk_values[[0, 0, 0]] = 60.0;
        lvstk_values[[1, 0, 0]] = 15.0;
        lvstk_values[[2, 0, 0]] = 0.12; // head/ha -> t liveweight/ha via price below
        lvstk_values[[3, 0, 0]] = 4500.0;

        let crop_ghg_names = vec!["CO2E_SOIL".to_string()];
        let mut crop_ghg_values = Array3::<f64>::zeros((1, 2, 1));
        crop_ghg_values[[0, 0, 0]] = 0.4;
        crop_ghg_values[[0, 1, 0]] = 0.5;

        let lvstk_ghg_names = vec!["CO2E_ENTERIC".to_string()];
        let mut lvstk_ghg_values = Array3::<f64>::zeros((1, 2, 1));
        lvstk_ghg_values[[0, 0, 0]] = 3.1;

        Self {
            land_uses_ag,
            land_uses_non_ag: vec!["Environmental plantings".into(), "Carbon plantings".into()],
            ag_managements: vec![AgManagementSpec {
                name: "Precision Agriculture".into(),
                enabled: true,
                applicable_land_uses: vec!["Wheat".into()],
            }],
            products: vec![Product { name: "Wheat".into() }, Product { name: "Beef cattle".into() }],
            commodities: vec!["wheat".into(), "beef".into()],
            real_area: Array1::from_vec(vec![120.0, 95.0, 140.0, 110.0, 130.0, 105.0]),
            region_of_cell: Array1::from_vec(vec![0, 0, 0, 1, 1, 1]),
            lu2pr: Array2::from_shape_vec((2, 3), vec![true, false, false, false, true, false]).unwrap(),
            pr2cm: Array2::from_shape_vec((2, 2), vec![true, false, false, true]).unwrap(),
            agec_crops: EconAttributes {
                attribute_names: crop_names,
                values: crop_values,
            },
            agec_lvstk: EconAttributes {
                attribute_names: lvstk_names,
                values: lvstk_values,
            },
            agghg_crops: GhgFactors {
                component_names: crop_ghg_names,
                values: crop_ghg_values,
            },
            agghg_lvstk: GhgFactors {
                component_names: lvstk_ghg_names,
                values: lvstk_ghg_values,
            },
            econ_non_ag: EconAttributes {
                attribute_names: vec!["variable_cost_per_ha".to_string()],
                values: Array3::from_shape_vec((1, 1, 2), vec![8.0, 12.0]).unwrap(),
            },
            ghg_non_ag: GhgFactors {
                component_names: vec!["SEQUESTRATION".to_string()],
                values: Array3::from_shape_vec((1, 1, 2), vec![-6.5, -9.0]).unwrap(),
            },
            transition_matrix_ag: Array2::zeros((3, 3)),
            natural_land_t_co2_ha: Array1::from_vec(vec![2.1; 6]),
            water_licence_price: Array1::zeros(6),
            river_regions: vec![
                Region {
                    name: "north".into(),
                    cells: vec![0, 1, 2],
                    historical_yield_ml: 40.0,
                },
                Region {
                    name: "south".into(),
                    cells: vec![3, 4, 5],
                    historical_yield_ml: 35.0,
                },
            ],
        }
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for DemoProvider {
    fn n_cells(&self) -> usize {
        6
    }
    fn grid_shape(&self) -> GridShape {
        GridShape { width: 3, height: 2 }
    }
    fn real_area_ha(&self) -> &Array1<f64> {
        &self.real_area
    }
    fn region_of_cell(&self) -> &Array1<usize> {
        &self.region_of_cell
    }
    fn land_uses_ag(&self) -> &[LandUse] {
        &self.land_uses_ag
    }
    fn land_uses_non_ag(&self) -> &[String] {
        &self.land_uses_non_ag
    }
    fn land_managements(&self) -> &[LandManagement] {
        &LandManagement::ALL
    }
    fn ag_managements(&self) -> &[AgManagementSpec] {
        &self.ag_managements
    }
    fn products(&self) -> &[Product] {
        &self.products
    }
    fn commodities(&self) -> &[String] {
        &self.commodities
    }
    fn lu2pr(&self) -> &Array2<bool> {
        &self.lu2pr
    }
    fn pr2cm(&self) -> &Array2<bool> {
        &self.pr2cm
    }
    fn agec_crops(&self) -> &EconAttributes {
        &self.agec_crops
    }
    fn agec_lvstk(&self) -> &EconAttributes {
        &self.agec_lvstk
    }
    fn agghg_crops(&self) -> &GhgFactors {
        &self.agghg_crops
    }
    fn agghg_lvstk(&self) -> &GhgFactors {
        &self.agghg_lvstk
    }
    fn econ_non_ag(&self) -> &EconAttributes {
        &self.econ_non_ag
    }
    fn ghg_non_ag(&self) -> &GhgFactors {
        &self.ghg_non_ag
    }
    fn quantity_per_ha_mp(&self) -> Array2<f64> {
        // Product 0 (Wheat) <- land use 0; product 1 (Beef cattle) <- land
        // use 1, matching `quantity_per_ha` in `agec_crops`/`agec_lvstk`.
        Array2::from_shape_vec((2, 2), vec![2.2, 0.12, 3.4, 0.0]).unwrap()
    }
    fn base_exclusion_mask(&self) -> Array3<bool> {
        Array3::from_elem((2, self.n_cells(), self.land_uses_ag.len()), true)
    }
    fn base_exclusion_mask_non_ag(&self) -> Array2<bool> {
        Array2::from_elem((self.n_cells(), self.land_uses_non_ag.len()), true)
    }
    fn is_irrigated_pasture(&self, lumap: &Array1<i32>, lmmap: &Array1<LandManagement>) -> Vec<bool> {
        lumap
            .iter()
            .zip(lmmap.iter())
            .map(|(&j, &m)| j == 1 && m == LandManagement::Irr)
            .collect()
    }
    fn transition_matrix_ag(&self) -> &Array2<f64> {
        &self.transition_matrix_ag
    }
    fn natural_land_t_co2_ha(&self) -> &Array1<f64> {
        &self.natural_land_t_co2_ha
    }
    fn water_licence_price(&self) -> &Array1<f64> {
        &self.water_licence_price
    }
    fn water_delivery_price(&self) -> &Array1<f64> {
        &self.water_licence_price
    }
    fn water_yield_dr(&self, _y: u32) -> Array1<f64> {
        Array1::from_vec(vec![0.6, 0.5, 0.55, 0.4, 0.45, 0.5])
    }
    fn water_yield_sr(&self, _y: u32) -> Array1<f64> {
        Array1::from_vec(vec![0.3, 0.25, 0.28, 0.2, 0.22, 0.25])
    }
    fn water_yield_nl(&self, _y: u32) -> Array1<f64> {
        Array1::from_vec(vec![0.9, 0.8, 0.85, 0.75, 0.78, 0.8])
    }
    fn water_ccimpact(&self, _region: &str, _y: u32) -> f64 {
        0.0
    }
    fn region_limits_river(&self) -> &[Region] {
        &self.river_regions
    }
    fn region_limits_drainage(&self) -> &[Region] {
        &[]
    }
    fn demand_deltas_c(&self, _y: u32) -> Array1<f64> {
        Array1::from_vec(vec![500.0, 40.0])
    }
    fn bau_productivity_increase(&self, _y: u32) -> Array1<f64> {
        Array1::from_vec(vec![1.0, 1.0])
    }
    fn asparagopsis(&self, _land_use: &str, _y: u32) -> Option<AmEffect> {
        None
    }
    fn precision_ag(&self, land_use: &str, _y: u32) -> Option<AmEffect> {
        if land_use == "Wheat" {
            Some(AmEffect {
                cost_multiplier: Some(0.92),
                yield_multiplier: Some(1.04),
                ..Default::default()
            })
        } else {
            None
        }
    }
    fn ecological_grazing(&self, _land_use: &str, _y: u32) -> Option<AmEffect> {
        None
    }
    fn savanna_burning(&self, _land_use: &str, _y: u32) -> Option<AmEffect> {
        None
    }
    fn agtech_ei(&self, _land_use: &str, _y: u32) -> Option<AmEffect> {
        None
    }
    fn ghg_targets(&self, _y: u32) -> Option<f64> {
        Some(2_500.0)
    }
    fn biodiversity_targets(&self, _y: u32) -> Option<f64> {
        None
    }
    fn seed_lumap(&self) -> Array1<i32> {
        Array1::from_vec(vec![2, 2, 2, 2, 2, 2])
    }
    fn seed_lmmap(&self) -> Array1<LandManagement> {
        Array1::from_vec(vec![LandManagement::Dry; 6])
    }
    fn seed_ammap(&self) -> Vec<Array1<bool>> {
        vec![Array1::from_elem(6, false)]
    }
}
