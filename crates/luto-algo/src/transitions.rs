//! The Transition Engine: amortised switching costs between a cell's
//! previous `(land use, land management)` and every candidate target, plus
//! the one-off deforestation GHG penalty.

use luto_core::types::LandManagement;
use luto_core::units::Aud;
use ndarray::{Array1, Array2, Array3};

/// `aqlic[r, j] = wr_irr[r, j] * real_area[r] * licence_price[r]`: the total
/// irrigation-licence cost of land use `j` at cell `r`.
fn aqlic(wr_irr_rj: &Array2<f64>, real_area: &Array1<f64>, licence_price: &Array1<f64>) -> Array2<f64> {
    let (r_dim, j_dim) = (wr_irr_rj.shape()[0], wr_irr_rj.shape()[1]);
    Array2::from_shape_fn((r_dim, j_dim), |(r, j)| {
        wr_irr_rj[[r, j]] * real_area[r] * licence_price[r]
    })
}

/// Build `t_mrj`: amortised transition-cost tensor, AUD/cell, for every
/// `(m, r, j)` given the previous year's `lumap`/`lmmap`.
///
/// `t_ij` is the raw `(J, J)` transition-cost matrix in AUD/ha; its
/// diagonal must be zero (switching to the same land use has no base
/// cost) for the "staying put costs nothing" property to hold.
pub fn build_transition_matrices(
    lumap: &Array1<i32>,
    lmmap: &Array1<LandManagement>,
    t_ij: &Array2<f64>,
    wr_irr_rj: &Array2<f64>,
    real_area: &Array1<f64>,
    licence_price: &Array1<f64>,
    discount_rate: f64,
    amortisation_period: u32,
) -> Array3<f64> {
    let r_dim = lumap.len();
    let j_dim = t_ij.shape()[0];
    let aqlic_rj = aqlic(wr_irr_rj, real_area, licence_price);

    let mut t_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));
    for r in 0..r_dim {
        let j_cur = lumap[r] as usize;
        let lm_cur = lmmap[r];
        let area = real_area[r];
        for j in 0..j_dim {
            let base = t_ij[[j_cur, j]] * area;

            let delta_dry = match lm_cur {
                LandManagement::Irr => -aqlic_rj[[r, j_cur]],
                LandManagement::Dry => 0.0,
            };
            let delta_irr = match lm_cur {
                LandManagement::Irr => aqlic_rj[[r, j]] - aqlic_rj[[r, j_cur]],
                LandManagement::Dry => aqlic_rj[[r, j]] + 1.0e4 * area,
            };

            t_mrj[[0, r, j]] = Aud(base + delta_dry)
                .amortise(discount_rate, amortisation_period)
                .value();
            t_mrj[[1, r, j]] = Aud(base + delta_irr)
                .amortise(discount_rate, amortisation_period)
                .value();
        }
    }
    t_mrj
}

/// Build the deforestation-GHG penalty tensor: `NATURAL_LAND_T_CO2_HA[r] *
/// REAL_AREA[r]` when the cell is currently a natural-land use and the
/// target `j` is in `lu_unnatural`; zero otherwise. Identical across both
/// land-management slices.
pub fn deforestation_penalty(
    lumap: &Array1<i32>,
    natural_land_t_co2_ha: &Array1<f64>,
    real_area: &Array1<f64>,
    lu_natural: &[usize],
    lu_unnatural: &[usize],
    n_land_uses: usize,
) -> Array3<f64> {
    let r_dim = lumap.len();
    let is_natural: Vec<bool> = (0..r_dim)
        .map(|r| lu_natural.contains(&(lumap[r] as usize)))
        .collect();
    let is_unnatural_target: Vec<bool> = (0..n_land_uses).map(|j| lu_unnatural.contains(&j)).collect();

    let mut penalties = Array3::<f64>::zeros((2, r_dim, n_land_uses));
    for r in 0..r_dim {
        if !is_natural[r] {
            continue;
        }
        let penalty = natural_land_t_co2_ha[r] * real_area[r];
        for j in 0..n_land_uses {
            if is_unnatural_target[j] {
                penalties[[0, r, j]] = penalty;
                penalties[[1, r, j]] = penalty;
            }
        }
    }
    penalties
}
