//! The State Updater: the running per-cell maps that persist across years,
//! and the reconstitution step that turns one year's dense, RESFACTOR'd
//! decision back into full-resolution state.

use luto_algo::coarsen;
use luto_core::provider::DataProvider;
use luto_core::types::{GridShape, LandManagement};
use luto_program::decode::DecodedYear;
use ndarray::Array1;
use std::collections::HashMap;

/// Full-resolution land-use state, persisted across years.
pub struct RunState {
    pub grid: GridShape,
    pub lumap: Array1<i32>,
    pub lmmap: Array1<LandManagement>,
    pub non_ag_map: Array1<i32>,
    /// One full-resolution boolean map per agricultural management, in
    /// [`luto_core::index::IndexModel::ag_managements`] order.
    pub ammap: Vec<Array1<bool>>,
    /// Realised commodity production by year, the basis for
    /// [`RunState::implied_demand`].
    prod_data: HashMap<u32, Array1<f64>>,
}

impl RunState {
    /// Seed the run from a data provider's year-0 maps.
    pub fn seed(provider: &dyn DataProvider) -> Self {
        let grid = provider.grid_shape();
        Self {
            grid,
            lumap: provider.seed_lumap(),
            lmmap: provider.seed_lmmap(),
            non_ag_map: Array1::from_elem(grid.n_cells(), -1),
            ammap: provider.seed_ammap(),
            prod_data: HashMap::new(),
        }
    }

    /// Fold one year's dense, active-cell-only decoded result back into
    /// full-resolution state via nearest-neighbour reconstitution.
    pub fn apply_year(&mut self, decoded: &DecodedYear, active_mask: &Array1<bool>, lumask: &Array1<bool>) {
        self.lumap = coarsen::uncoarsen_and_reconstitute(self.grid, &decoded.lumap, active_mask, lumask, -1);
        self.non_ag_map =
            coarsen::uncoarsen_and_reconstitute(self.grid, &decoded.non_ag_map, active_mask, lumask, -1);

        let lmmap_codes: Array1<i32> = decoded.lmmap.mapv(|lm| lm.index() as i32);
        let full_lmmap_codes =
            coarsen::uncoarsen_and_reconstitute(self.grid, &lmmap_codes, active_mask, lumask, 0);
        self.lmmap = full_lmmap_codes.mapv(|code| LandManagement::ALL[code as usize]);

        self.ammap = decoded
            .ammap
            .iter()
            .map(|active| {
                let active_codes: Array1<i32> = active.mapv(|v| v as i32);
                let full = coarsen::uncoarsen_and_reconstitute(self.grid, &active_codes, active_mask, lumask, 0);
                full.mapv(|v| v != 0)
            })
            .collect();
    }

    pub fn record_production(&mut self, year: u32, quantities: Array1<f64>) {
        self.prod_data.insert(year, quantities);
    }

    /// The inverse of the provider's demand query: what was actually
    /// produced in a given year, per commodity. Falls back to `None` for a
    /// year that hasn't been solved yet.
    pub fn implied_demand(&self, year: u32) -> Option<&Array1<f64>> {
        self.prod_data.get(&year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luto_program::decode::DecodedYear;

    #[test]
    fn apply_year_fills_non_active_cells_with_sentinel() {
        let grid = GridShape { width: 2, height: 1 };
        let mut state = RunState {
            grid,
            lumap: Array1::from_vec(vec![0, -1]),
            lmmap: Array1::from_vec(vec![LandManagement::Dry, LandManagement::Dry]),
            non_ag_map: Array1::from_vec(vec![-1, -1]),
            ammap: vec![],
            prod_data: HashMap::new(),
        };
        let lumask = Array1::from_vec(vec![true, false]);
        let active_mask = lumask.clone();
        let decoded = DecodedYear {
            lumap: Array1::from_vec(vec![1]),
            lmmap: Array1::from_vec(vec![LandManagement::Irr]),
            non_ag_map: Array1::from_vec(vec![-1]),
            ammap: vec![],
        };
        state.apply_year(&decoded, &active_mask, &lumask);
        assert_eq!(state.lumap, Array1::from_vec(vec![1, -1]));
        assert_eq!(state.lmmap[0], LandManagement::Irr);
    }

    #[test]
    fn implied_demand_is_none_before_any_year_recorded() {
        let grid = GridShape { width: 1, height: 1 };
        let state = RunState {
            grid,
            lumap: Array1::from_vec(vec![0]),
            lmmap: Array1::from_vec(vec![LandManagement::Dry]),
            non_ag_map: Array1::from_vec(vec![-1]),
            ammap: vec![],
            prod_data: HashMap::new(),
        };
        assert!(state.implied_demand(2030).is_none());
    }
}
