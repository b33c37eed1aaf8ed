//! Matrix Builders: per-year dense economic, quantity, GHG and water tensors
//! over every `(land management, cell, land use)` triple, their sparse
//! `(cell, non-ag land use)` counterparts, and the agricultural-management
//! delta tensors that sit on top of both.
//!
//! Every builder here is a pure function of a year and whatever a
//! [`DataProvider`] hands over; none of them touch the solver, and none of
//! them decide which AM is active on which cell — that is a program
//! decision variable, not a builder concern.

use luto_core::error::{LutoError, LutoResult};
use luto_core::index::{AgManagement, IndexModel, RootDepth};
use luto_core::provider::{AmEffect, DataProvider};
use luto_core::types::LandManagement;
use ndarray::{Array1, Array2, Array3, ArrayView2};

const VARIABLE_COST_ATTR: &str = "variable_cost_per_ha";
const FIXED_COST_ATTR: &str = "fixed_cost_per_ha";
const QUANTITY_ATTR: &str = "quantity_per_ha";
const PRICE_ATTR: &str = "price_per_unit";
const WATER_REQ_IRR_ATTR: &str = "water_req_irr_ml_per_ha";
const LVSTK_DRINKING_WATER_ATTR: &str = "drinking_water_ml_per_head";
const STOCKING_RATE_ATTR: &str = "head_per_ha";

/// Emission components that pick up the irrigated-pasture hay add-on, named
/// `HAY_<component>` in [`luto_core::provider::GhgFactors`].
const HAY_ADDON_COMPONENTS: [&str; 6] = [
    "CHEM_APPL",
    "FERT_PROD",
    "IRRIG",
    "PEST_PROD",
    "SOIL_N_SURP",
    "SOWING",
];

fn check_finite_3(tensor: &Array3<f64>, label: &str) -> LutoResult<()> {
    if tensor.iter().any(|v| !v.is_finite()) {
        return Err(LutoError::Data(format!("{label} contains a non-finite value")));
    }
    Ok(())
}

fn check_finite_2(tensor: &Array2<f64>, label: &str) -> LutoResult<()> {
    if tensor.iter().any(|v| !v.is_finite()) {
        return Err(LutoError::Data(format!("{label} contains a non-finite value")));
    }
    Ok(())
}

/// Scatter a `(M, subset)` per-hectare rate table onto a `(M, R, J)` tensor,
/// multiplying by each cell's real area. `subset[pos]` gives the full-`J`
/// column each row of `rate_mj` belongs to.
fn scatter_per_ha_rate(dest: &mut Array3<f64>, subset: &[usize], rate_mj: ArrayView2<f64>, real_area: &Array1<f64>) {
    let r_dim = real_area.len();
    for (pos, &j) in subset.iter().enumerate() {
        for m in 0..2 {
            let rate = rate_mj[[m, pos]];
            if rate == 0.0 {
                continue;
            }
            for r in 0..r_dim {
                dest[[m, r, j]] += rate * real_area[r];
            }
        }
    }
}

/// `c_mrj`: base agricultural cost tensor, AUD/cell (variable + fixed cost,
/// before any agricultural-management delta is applied).
pub fn cost_ag(index: &IndexModel, provider: &dyn DataProvider) -> LutoResult<Array3<f64>> {
    let (j_dim, r_dim) = (index.n_land_uses(), provider.n_cells());
    let real_area = provider.real_area_ha();
    let mut c_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));

    for (econ, subset) in [
        (provider.agec_crops(), index.lu_crops()),
        (provider.agec_lvstk(), index.lu_lvstk()),
    ] {
        if let Some(rate) = econ.attribute(VARIABLE_COST_ATTR) {
            scatter_per_ha_rate(&mut c_mrj, subset, rate, real_area);
        }
        if let Some(rate) = econ.attribute(FIXED_COST_ATTR) {
            scatter_per_ha_rate(&mut c_mrj, subset, rate, real_area);
        }
    }

    check_finite_3(&c_mrj, "cost_ag")?;
    Ok(c_mrj)
}

/// `r_mrj`: base agricultural revenue tensor, AUD/cell (`quantity * price`).
pub fn revenue_ag(index: &IndexModel, provider: &dyn DataProvider) -> LutoResult<Array3<f64>> {
    let (j_dim, r_dim) = (index.n_land_uses(), provider.n_cells());
    let real_area = provider.real_area_ha();
    let mut r_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));

    for (econ, subset) in [
        (provider.agec_crops(), index.lu_crops()),
        (provider.agec_lvstk(), index.lu_lvstk()),
    ] {
        let (Some(qty), Some(price)) = (econ.attribute(QUANTITY_ATTR), econ.attribute(PRICE_ATTR)) else {
            continue;
        };
        let combined = &qty.to_owned() * &price.to_owned();
        scatter_per_ha_rate(&mut r_mrj, subset, combined.view(), real_area);
    }

    check_finite_3(&r_mrj, "revenue_ag")?;
    Ok(r_mrj)
}

/// `q_mrp`: physical product quantity tensor, one column per product
/// rather than per land use — two products of the same land use (meat and
/// wool from the same sheep land use) carry distinct columns here.
pub fn quantity_ag(index: &IndexModel, provider: &dyn DataProvider) -> LutoResult<Array3<f64>> {
    let (p_dim, r_dim) = (index.n_products(), provider.n_cells());
    let real_area = provider.real_area_ha();
    let rate_mp = provider.quantity_per_ha_mp();
    let mut q_mrp = Array3::<f64>::zeros((2, r_dim, p_dim));

    let identity: Vec<usize> = (0..p_dim).collect();
    scatter_per_ha_rate(&mut q_mrp, &identity, rate_mp.view(), real_area);

    check_finite_3(&q_mrp, "quantity_ag")?;
    Ok(q_mrp)
}

/// `g_mrj`: agricultural GHG emissions tensor, tCO2e/cell. Irrigated
/// pasture cells pick up the hay emissions add-on across
/// [`HAY_ADDON_COMPONENTS`], since grazing alone doesn't otherwise require
/// chemical, fertiliser or sowing inputs.
pub fn ghg_ag(
    index: &IndexModel,
    provider: &dyn DataProvider,
    lumap: &Array1<i32>,
    lmmap: &Array1<LandManagement>,
) -> LutoResult<Array3<f64>> {
    let (j_dim, r_dim) = (index.n_land_uses(), provider.n_cells());
    let real_area = provider.real_area_ha();
    let mut g_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));

    for (ghg, subset) in [
        (provider.agghg_crops(), index.lu_crops()),
        (provider.agghg_lvstk(), index.lu_lvstk()),
    ] {
        for name in ghg.component_names_iter() {
            if let Some(rate) = ghg.component(name) {
                scatter_per_ha_rate(&mut g_mrj, subset, rate, real_area);
            }
        }
    }

    let pasture_mask = provider.is_irrigated_pasture(lumap, lmmap);
    let lvstk_ghg = provider.agghg_lvstk();
    for component in HAY_ADDON_COMPONENTS {
        let hay_name = format!("HAY_{component}");
        let Some(rate) = lvstk_ghg.component(&hay_name) else {
            continue;
        };
        for (pos, &j) in index.lu_lvstk().iter().enumerate() {
            let addon = rate[[LandManagement::Irr.index(), pos]];
            if addon == 0.0 {
                continue;
            }
            for r in 0..r_dim {
                if pasture_mask[r] {
                    g_mrj[[LandManagement::Irr.index(), r, j]] += addon * real_area[r];
                }
            }
        }
    }

    check_finite_3(&g_mrj, "ghg_ag")?;
    Ok(g_mrj)
}

/// `aqreq_mrj`: agricultural water-requirement tensor, ML/cell. Livestock
/// drink regardless of land management; only the irrigation top-up is
/// gated on [`LandManagement::Irr`].
pub fn water_req_ag(index: &IndexModel, provider: &dyn DataProvider) -> LutoResult<Array3<f64>> {
    let (j_dim, r_dim) = (index.n_land_uses(), provider.n_cells());
    let real_area = provider.real_area_ha();
    let mut wr_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));

    let crops = provider.agec_crops();
    if let Some(rate) = crops.attribute(WATER_REQ_IRR_ATTR) {
        scatter_per_ha_rate(&mut wr_mrj, index.lu_crops(), rate, real_area);
    }

    let lvstk = provider.agec_lvstk();
    if let (Some(drink), Some(stocking)) = (
        lvstk.attribute(LVSTK_DRINKING_WATER_ATTR),
        lvstk.attribute(STOCKING_RATE_ATTR),
    ) {
        let drinking_total = &drink.to_owned() * &stocking.to_owned();
        scatter_per_ha_rate(&mut wr_mrj, index.lu_lvstk(), drinking_total.view(), real_area);
    }

    if let Some(irr_rate) = lvstk.attribute(WATER_REQ_IRR_ATTR) {
        for (pos, &j) in index.lu_lvstk().iter().enumerate() {
            let rate = irr_rate[[LandManagement::Irr.index(), pos]];
            if rate == 0.0 {
                continue;
            }
            for r in 0..r_dim {
                wr_mrj[[LandManagement::Irr.index(), r, j]] += rate * real_area[r];
            }
        }
    }

    check_finite_3(&wr_mrj, "water_req_ag")?;
    Ok(wr_mrj)
}

/// `wy_mrj`: natural water-yield tensor, ML/cell, selecting the dryland,
/// shallow-rooted-irrigated, or natural-land baseline per candidate land
/// use's root depth. Deep-rooted land uses intercept rainfall the same way
/// whether irrigated or not, so irrigation doesn't change their baseline.
pub fn water_yield_ag(index: &IndexModel, provider: &dyn DataProvider, year: u32) -> LutoResult<Array3<f64>> {
    let j_dim = index.n_land_uses();
    let dr = provider.water_yield_dr(year);
    let sr = provider.water_yield_sr(year);
    let nl = provider.water_yield_nl(year);
    let r_dim = dr.len();
    let mut wy_mrj = Array3::<f64>::zeros((2, r_dim, j_dim));

    for (j, lu) in index.land_uses().iter().enumerate() {
        for &lm in &LandManagement::ALL {
            let baseline = match (lu.root_depth, lm) {
                (RootDepth::Natural, _) => &nl,
                (RootDepth::Deep, _) => &dr,
                (RootDepth::Shallow, LandManagement::Dry) => &dr,
                (RootDepth::Shallow, LandManagement::Irr) => &sr,
            };
            for r in 0..r_dim {
                wy_mrj[[lm.index(), r, j]] = baseline[r];
            }
        }
    }

    check_finite_3(&wy_mrj, "water_yield_ag")?;
    Ok(wy_mrj)
}

/// `wy_mrj - aqreq_mrj`: net water yield after agricultural draw.
pub fn water_net_ag(water_yield: &Array3<f64>, water_req: &Array3<f64>) -> Array3<f64> {
    water_yield - water_req
}

/// `x_mrj`: base eligibility mask, a thin validated pass-through of
/// [`DataProvider::base_exclusion_mask`] — land suitability and irrigation
/// infrastructure reach are out-of-scope raster inputs, not builder logic.
pub fn exclude_ag(index: &IndexModel, provider: &dyn DataProvider) -> LutoResult<Array3<bool>> {
    let mask = provider.base_exclusion_mask();
    let expected = (2, provider.n_cells(), index.n_land_uses());
    if mask.dim() != expected {
        return Err(LutoError::Data(format!(
            "base exclusion mask shape {:?} does not match expected {:?}",
            mask.dim(),
            expected
        )));
    }
    Ok(mask)
}

fn am_multiplicative_delta(
    index: &IndexModel,
    am: &AgManagement,
    base: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
    pick: impl Fn(&AmEffect) -> Option<f64>,
    label: &str,
) -> LutoResult<Array3<f64>> {
    let (m_dim, r_dim, _) = base.dim();
    let mut delta = Array3::<f64>::zeros(base.dim());
    for &j in &am.land_use_indices {
        let lu_name = &index.land_uses()[j].name;
        let Some(effect) = effect_of(lu_name, year) else {
            continue;
        };
        let Some(multiplier) = pick(&effect) else {
            continue;
        };
        for m in 0..m_dim {
            for r in 0..r_dim {
                delta[[m, r, j]] = base[[m, r, j]] * (multiplier - 1.0);
            }
        }
    }
    check_finite_3(&delta, label)?;
    Ok(delta)
}

/// Per-management cost delta: `(M, R, J)`, zero outside `J_a` (design note
/// b: never implicitly shared across managements). Added to `cost_ag`'s
/// output scaled by the management's own decision variable, a program
/// builder concern, not this one.
pub fn am_cost_delta(
    index: &IndexModel,
    am: &AgManagement,
    base_cost: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
) -> LutoResult<Array3<f64>> {
    am_multiplicative_delta(index, am, base_cost, effect_of, year, |e| e.cost_multiplier, "am_cost_delta")
}

pub fn am_revenue_delta(
    index: &IndexModel,
    am: &AgManagement,
    base_revenue: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
) -> LutoResult<Array3<f64>> {
    am_multiplicative_delta(
        index,
        am,
        base_revenue,
        effect_of,
        year,
        |e| e.revenue_multiplier,
        "am_revenue_delta",
    )
}

/// Per-management quantity delta: `(M, R, P)`, zero outside the products
/// derived from `J_a`. Unlike the other AM deltas this can't reuse
/// [`am_multiplicative_delta`], since `base_quantity` is indexed by product,
/// not land use — each applicable land use's yield multiplier is instead
/// applied to every product [`IndexModel::products_of`] says it derives.
pub fn am_quantity_delta(
    index: &IndexModel,
    am: &AgManagement,
    base_quantity: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
) -> LutoResult<Array3<f64>> {
    let (m_dim, r_dim, _) = base_quantity.dim();
    let mut delta = Array3::<f64>::zeros(base_quantity.dim());
    for &j in &am.land_use_indices {
        let lu_name = &index.land_uses()[j].name;
        let Some(effect) = effect_of(lu_name, year) else {
            continue;
        };
        let Some(multiplier) = effect.yield_multiplier else {
            continue;
        };
        for p in index.products_of(j) {
            for m in 0..m_dim {
                for r in 0..r_dim {
                    delta[[m, r, p]] = base_quantity[[m, r, p]] * (multiplier - 1.0);
                }
            }
        }
    }
    check_finite_3(&delta, "am_quantity_delta")?;
    Ok(delta)
}

pub fn am_water_req_delta(
    index: &IndexModel,
    am: &AgManagement,
    base_water_req: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
) -> LutoResult<Array3<f64>> {
    am_multiplicative_delta(
        index,
        am,
        base_water_req,
        effect_of,
        year,
        |e| e.water_req_multiplier,
        "am_water_req_delta",
    )
}

/// Per-management GHG delta. The net multiplier is the mean across the
/// emission components this management names, since only the summed
/// tensor survives past [`ghg_ag`].
pub fn am_ghg_delta(
    index: &IndexModel,
    am: &AgManagement,
    base_ghg: &Array3<f64>,
    effect_of: impl Fn(&str, u32) -> Option<AmEffect>,
    year: u32,
) -> LutoResult<Array3<f64>> {
    let (m_dim, r_dim, _) = base_ghg.dim();
    let mut delta = Array3::<f64>::zeros(base_ghg.dim());
    for &j in &am.land_use_indices {
        let lu_name = &index.land_uses()[j].name;
        let Some(effect) = effect_of(lu_name, year) else {
            continue;
        };
        if effect.ghg_component_multipliers.is_empty() {
            continue;
        }
        let net: f64 = effect.ghg_component_multipliers.iter().map(|(_, m)| *m).sum::<f64>()
            / effect.ghg_component_multipliers.len() as f64;
        for m in 0..m_dim {
            for r in 0..r_dim {
                delta[[m, r, j]] = base_ghg[[m, r, j]] * (net - 1.0);
            }
        }
    }
    check_finite_3(&delta, "am_ghg_delta")?;
    Ok(delta)
}

/// Fold a set of per-management delta tensors into a base tensor. Callers
/// scale each delta by its management's decision variable before folding
/// it in here is the program builder's contribution; this function just
/// performs the sum once those deltas have already been realised.
pub fn effective_ag(base: &Array3<f64>, deltas: &[Array3<f64>]) -> Array3<f64> {
    let mut out = base.clone();
    for delta in deltas {
        out = out + delta;
    }
    out
}

/// `(R, K)` non-agricultural cost tensor, AUD/cell.
pub fn cost_non_ag(provider: &dyn DataProvider) -> LutoResult<Array2<f64>> {
    let cost_rk = scatter_non_ag(provider, provider.econ_non_ag().attribute(VARIABLE_COST_ATTR));
    check_finite_2(&cost_rk, "cost_non_ag")?;
    Ok(cost_rk)
}

/// `(R, K)` non-agricultural GHG tensor, tCO2e/cell (sequestration recorded
/// as negative values, the sign convention the objective expects).
pub fn ghg_non_ag(provider: &dyn DataProvider) -> LutoResult<Array2<f64>> {
    let k_dim = provider.land_uses_non_ag().len();
    let r_dim = provider.n_cells();
    let mut ghg_rk = Array2::<f64>::zeros((r_dim, k_dim));
    let ghg = provider.ghg_non_ag();
    for name in ghg.component_names_iter() {
        if let Some(rate) = ghg.component(name) {
            accumulate_non_ag(&mut ghg_rk, provider, Some(rate));
        }
    }
    check_finite_2(&ghg_rk, "ghg_non_ag")?;
    Ok(ghg_rk)
}

/// `(R, K)` non-agricultural revenue tensor, AUD/cell: carbon price times
/// sequestered tonnes for land uses that carry a `SEQUESTRATION` GHG
/// component (recorded negative by convention), zero for every other
/// non-agricultural land use.
pub fn revenue_non_ag(provider: &dyn DataProvider, carbon_price_per_tonne: f64) -> LutoResult<Array2<f64>> {
    let mut rev_rk = Array2::<f64>::zeros((provider.n_cells(), provider.land_uses_non_ag().len()));
    if let Some(seq) = provider.ghg_non_ag().component("SEQUESTRATION") {
        let scaled = seq.mapv(|v| -v * carbon_price_per_tonne);
        accumulate_non_ag(&mut rev_rk, provider, Some(scaled.view()));
    }
    check_finite_2(&rev_rk, "revenue_non_ag")?;
    Ok(rev_rk)
}

/// `(R, K)` non-agricultural transition (establishment) cost tensor,
/// AUD/cell: a flat annual per-hectare rate charged on Environmental
/// Plantings cells only, zero for every other non-agricultural land use
/// (the corpus carries no per-land-use establishment-cost table for the
/// others).
pub fn transition_non_ag(provider: &dyn DataProvider, env_planting_cost_per_ha_per_year: f64) -> LutoResult<Array2<f64>> {
    let r_dim = provider.n_cells();
    let k_dim = provider.land_uses_non_ag().len();
    let mut t_rk = Array2::<f64>::zeros((r_dim, k_dim));
    if env_planting_cost_per_ha_per_year != 0.0 {
        if let Some(k) = provider
            .land_uses_non_ag()
            .iter()
            .position(|name| name == "Environmental plantings")
        {
            let real_area = provider.real_area_ha();
            for r in 0..r_dim {
                t_rk[[r, k]] = env_planting_cost_per_ha_per_year * real_area[r];
            }
        }
    }
    check_finite_2(&t_rk, "transition_non_ag")?;
    Ok(t_rk)
}

/// `x_rk`: base non-agricultural eligibility mask, a thin validated
/// pass-through of [`DataProvider::base_exclusion_mask_non_ag`].
pub fn exclude_non_ag(provider: &dyn DataProvider) -> LutoResult<Array2<bool>> {
    let mask = provider.base_exclusion_mask_non_ag();
    let expected = (provider.n_cells(), provider.land_uses_non_ag().len());
    if mask.dim() != expected {
        return Err(LutoError::Data(format!(
            "non-agricultural exclusion mask shape {:?} does not match expected {:?}",
            mask.dim(),
            expected
        )));
    }
    Ok(mask)
}

fn scatter_non_ag(provider: &dyn DataProvider, rate: Option<ArrayView2<f64>>) -> Array2<f64> {
    let k_dim = provider.land_uses_non_ag().len();
    let r_dim = provider.n_cells();
    let mut out = Array2::<f64>::zeros((r_dim, k_dim));
    accumulate_non_ag(&mut out, provider, rate);
    out
}

fn accumulate_non_ag(dest: &mut Array2<f64>, provider: &dyn DataProvider, rate: Option<ArrayView2<f64>>) {
    let Some(rate) = rate else { return };
    let real_area = provider.real_area_ha();
    let k_dim = dest.shape()[1];
    for k in 0..k_dim {
        let rate_k = rate[[0, k]];
        if rate_k == 0.0 {
            continue;
        }
        for r in 0..real_area.len() {
            dest[[r, k]] += rate_k * real_area[r];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luto_core::index::{AgManagementSpec, LandUse, LandUseCategory, Product};
    use luto_core::provider::{EconAttributes, GhgFactors};
    use luto_core::types::Region;
    use ndarray::Array3;

    struct FakeProvider {
        n_cells: usize,
        real_area: Array1<f64>,
        land_uses_ag: Vec<LandUse>,
        land_uses_non_ag: Vec<String>,
        ag_managements: Vec<AgManagementSpec>,
        products: Vec<Product>,
        commodities: Vec<String>,
        lu2pr: Array2<bool>,
        pr2cm: Array2<bool>,
        agec_crops: EconAttributes,
        agec_lvstk: EconAttributes,
        agghg_crops: GhgFactors,
        agghg_lvstk: GhgFactors,
        econ_non_ag: EconAttributes,
        ghg_non_ag: GhgFactors,
        exclusion: Array3<bool>,
    }

    impl FakeProvider {
        fn toy() -> Self {
            // J = {Wheat (crop, shallow), Beef - modified land (lvstk, deep)}.
            let land_uses_ag = vec![
                LandUse {
                    name: "Wheat".into(),
                    category: LandUseCategory::Crop,
                    root_depth: RootDepth::Shallow,
                },
                LandUse {
                    name: "Beef - modified land".into(),
                    category: LandUseCategory::LivestockModified,
                    root_depth: RootDepth::Deep,
                },
            ];
            let real_area = Array1::from_vec(vec![2.0, 3.0]);

            // Crop attrs: (attr, M, n_crops=1). Row order matches the const names used above.
            let crop_names = vec![
                VARIABLE_COST_ATTR.to_string(),
                FIXED_COST_ATTR.to_string(),
                QUANTITY_ATTR.to_string(),
                PRICE_ATTR.to_string(),
                WATER_REQ_IRR_ATTR.to_string(),
            ];
            let mut crop_values = Array3::<f64>::zeros((crop_names.len(), 2, 1));
            crop_values[[0, 0, 0]] = 100.0; // variable cost, dry
            crop_values[[0, 1, 0]] = 120.0; // variable cost, irr
            crop_values[[1, 0, 0]] = 10.0; // fixed cost, dry
            crop_values[[1, 1, 0]] = 10.0; // fixed cost, irr
            crop_values[[2, 0, 0]] = 3.0; // quantity, dry
            crop_values[[2, 1, 0]] = 4.0; // quantity, irr
            crop_values[[3, 0, 0]] = 50.0; // price
            crop_values[[3, 1, 0]] = 50.0;
            crop_values[[4, 1, 0]] = 0.5; // water req under irrigation, ML/ha

            let lvstk_names = vec![
                VARIABLE_COST_ATTR.to_string(),
                LVSTK_DRINKING_WATER_ATTR.to_string(),
                STOCKING_RATE_ATTR.to_string(),
                WATER_REQ_IRR_ATTR.to_string(),
            ];
            let mut lvstk_values = Array3::<f64>::zeros((lvstk_names.len(), 2, 1));
            lvstk_values[[0, 0, 0]] = 20.0;
            lvstk_values[[0, 1, 0]] = 25.0;
            lvstk_values[[1, 0, 0]] = 0.01; // ML/head/year drinking
            lvstk_values[[1, 1, 0]] = 0.01;
            lvstk_values[[2, 0, 0]] = 2.0; // 2 head/ha
            lvstk_values[[2, 1, 0]] = 2.0;
            lvstk_values[[3, 1, 0]] = 1.0; // irrigation ML/ha on top, irr only

            let ghg_names = vec!["CO2E_SOIL".to_string()];
            let mut ghg_crop_values = Array3::<f64>::zeros((1, 2, 1));
            ghg_crop_values[[0, 0, 0]] = 1.0;
            ghg_crop_values[[0, 1, 0]] = 1.5;

            let mut ghg_lvstk_values = Array3::<f64>::zeros((1, 2, 1));
            ghg_lvstk_values[[0, 0, 0]] = 0.2;
            ghg_lvstk_values[[0, 1, 0]] = 0.2;

            Self {
                n_cells: 2,
                real_area,
                land_uses_ag,
                land_uses_non_ag: vec!["Environmental plantings".into()],
                ag_managements: vec![AgManagementSpec {
                    name: "Precision Agriculture".into(),
                    enabled: true,
                    applicable_land_uses: vec!["Wheat".into()],
                }],
                products: vec![Product { name: "Wheat".into() }, Product { name: "Beef meat".into() }],
                commodities: vec!["wheat".into(), "meat".into()],
                lu2pr: Array2::from_shape_vec((2, 2), vec![true, false, false, true]).unwrap(),
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
                    component_names: ghg_names.clone(),
                    values: ghg_crop_values,
                },
                agghg_lvstk: GhgFactors {
                    component_names: ghg_names,
                    values: ghg_lvstk_values,
                },
                econ_non_ag: EconAttributes {
                    attribute_names: vec![VARIABLE_COST_ATTR.to_string()],
                    values: Array3::from_shape_vec((1, 1, 1), vec![40.0]).unwrap(),
                },
                ghg_non_ag: GhgFactors {
                    component_names: vec!["SEQUESTRATION".to_string()],
                    values: Array3::from_shape_vec((1, 1, 1), vec![-5.0]).unwrap(),
                },
                exclusion: Array3::from_elem((2, 2, 2), true),
            }
        }

        fn index_model(&self) -> IndexModel {
            IndexModel::build(
                self.land_uses_ag.clone(),
                self.products.clone(),
                self.commodities.clone(),
                self.lu2pr.clone(),
                self.pr2cm.clone(),
                self.ag_managements.clone(),
            )
            .unwrap()
        }
    }

    impl DataProvider for FakeProvider {
        fn n_cells(&self) -> usize {
            self.n_cells
        }
        fn grid_shape(&self) -> luto_core::types::GridShape {
            luto_core::types::GridShape { width: self.n_cells, height: 1 }
        }
        fn real_area_ha(&self) -> &Array1<f64> {
            &self.real_area
        }
        fn region_of_cell(&self) -> &Array1<usize> {
            unimplemented!()
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
            // Product 0 (Wheat), product 1 (Beef meat), dry/irr per hectare.
            Array2::from_shape_vec((2, 2), vec![3.0, 0.24, 4.0, 0.0]).unwrap()
        }
        fn base_exclusion_mask(&self) -> Array3<bool> {
            self.exclusion.clone()
        }
        fn base_exclusion_mask_non_ag(&self) -> Array2<bool> {
            Array2::from_elem((self.n_cells, self.land_uses_non_ag.len()), true)
        }
        fn is_irrigated_pasture(&self, _lumap: &Array1<i32>, lmmap: &Array1<LandManagement>) -> Vec<bool> {
            lmmap.iter().map(|&lm| lm == LandManagement::Irr).collect()
        }
        fn transition_matrix_ag(&self) -> &Array2<f64> {
            unimplemented!()
        }
        fn natural_land_t_co2_ha(&self) -> &Array1<f64> {
            unimplemented!()
        }
        fn water_licence_price(&self) -> &Array1<f64> {
            unimplemented!()
        }
        fn water_delivery_price(&self) -> &Array1<f64> {
            unimplemented!()
        }
        fn water_yield_dr(&self, _y: u32) -> Array1<f64> {
            Array1::from_vec(vec![1.0, 1.2])
        }
        fn water_yield_sr(&self, _y: u32) -> Array1<f64> {
            Array1::from_vec(vec![0.6, 0.7])
        }
        fn water_yield_nl(&self, _y: u32) -> Array1<f64> {
            Array1::from_vec(vec![2.0, 2.2])
        }
        fn water_ccimpact(&self, _region: &str, _y: u32) -> f64 {
            0.0
        }
        fn region_limits_river(&self) -> &[Region] {
            &[]
        }
        fn region_limits_drainage(&self) -> &[Region] {
            &[]
        }
        fn demand_deltas_c(&self, _y: u32) -> Array1<f64> {
            Array1::from_vec(vec![0.0, 0.0])
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
                    cost_multiplier: Some(0.9),
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
            None
        }
        fn biodiversity_targets(&self, _y: u32) -> Option<f64> {
            None
        }
        fn seed_lumap(&self) -> Array1<i32> {
            Array1::from_vec(vec![0, 1])
        }
        fn seed_lmmap(&self) -> Array1<LandManagement> {
            Array1::from_vec(vec![LandManagement::Dry, LandManagement::Dry])
        }
        fn seed_ammap(&self) -> Vec<Array1<bool>> {
            vec![]
        }
    }

    #[test]
    fn cost_ag_scales_by_real_area() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let cost = cost_ag(&index, &provider).unwrap();
        // Wheat (j=0), dry, cell 0: (100 + 10) * 2.0 = 220.
        assert_eq!(cost[[0, 0, 0]], 220.0);
        // Beef (j=1), irr, cell 1: 25 * 3.0 = 75.
        assert_eq!(cost[[1, 1, 1]], 75.0);
    }

    #[test]
    fn revenue_ag_multiplies_quantity_by_price() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let revenue = revenue_ag(&index, &provider).unwrap();
        // Wheat, dry, cell 0: 3.0 * 50.0 * 2.0 = 300.
        assert_eq!(revenue[[0, 0, 0]], 300.0);
    }

    #[test]
    fn ghg_ag_adds_hay_addon_only_for_irrigated_pasture() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let lumap = Array1::from_vec(vec![1, 1]);
        let lmmap = Array1::from_vec(vec![LandManagement::Dry, LandManagement::Irr]);
        let ghg = ghg_ag(&index, &provider, &lumap, &lmmap).unwrap();
        // No HAY_* components supplied by the fake provider, so irrigated
        // beef only carries its base factor: 0.2 * 3.0 = 0.6.
        assert_eq!(ghg[[1, 1, 1]], 0.6);
    }

    #[test]
    fn water_req_ag_adds_livestock_drinking_regardless_of_management() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let wr = water_req_ag(&index, &provider).unwrap();
        // Beef, dry, cell 0: drinking = 0.01 * 2.0 head/ha * 2.0 ha = 0.04.
        assert_eq!(wr[[0, 0, 1]], 0.04);
        // Beef, irr, cell 0: drinking 0.04 + irrigation top-up 1.0*2.0 = 2.04.
        assert_eq!(wr[[1, 0, 1]], 2.04);
    }

    #[test]
    fn water_yield_ag_selects_baseline_by_root_depth_and_management() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let wy = water_yield_ag(&index, &provider, 2030).unwrap();
        // Wheat (shallow), dry: dr baseline.
        assert_eq!(wy[[0, 0, 0]], 1.0);
        // Wheat (shallow), irr: sr baseline.
        assert_eq!(wy[[1, 0, 0]], 0.6);
        // Beef (deep), irr: still dr baseline, irrigation doesn't change it.
        assert_eq!(wy[[1, 0, 1]], 1.0);
    }

    #[test]
    fn am_cost_delta_is_zero_outside_applicable_land_uses() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let base_cost = cost_ag(&index, &provider).unwrap();
        let am = index
            .ag_managements()
            .iter()
            .find(|a| a.name == "Precision Agriculture")
            .unwrap();
        let delta = am_cost_delta(
            &index,
            am,
            &base_cost,
            |lu, y| provider.precision_ag(lu, y),
            2030,
        )
        .unwrap();
        assert_eq!(delta[[0, 0, 1]], 0.0); // Beef is not in J_a.
        assert!(delta[[0, 0, 0]] < 0.0); // Wheat's cost multiplier is 0.9.
    }

    #[test]
    fn non_ag_tensors_scale_by_area_and_keep_ghg_sign() {
        let provider = FakeProvider::toy();
        let cost = cost_non_ag(&provider).unwrap();
        assert_eq!(cost[[0, 0]], 40.0 * 2.0);
        let ghg = ghg_non_ag(&provider).unwrap();
        assert_eq!(ghg[[0, 0]], -5.0 * 2.0);
    }

    #[test]
    fn quantity_ag_is_indexed_by_product_not_land_use() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let q = quantity_ag(&index, &provider).unwrap();
        assert_eq!(q.dim(), (2, 2, index.n_products()));
        // Wheat product (p=0), dry, cell 0: 3.0 * 2.0 = 6.0.
        assert_eq!(q[[0, 0, 0]], 6.0);
        // Beef meat product (p=1), dry, cell 1: 0.24 * 3.0 = 0.72.
        assert_eq!(q[[0, 1, 1]], 0.72);
    }

    #[test]
    fn am_quantity_delta_applies_yield_multiplier_to_the_am_land_uses_products() {
        let provider = FakeProvider::toy();
        let index = provider.index_model();
        let q = quantity_ag(&index, &provider).unwrap();
        let am = index
            .ag_managements()
            .iter()
            .find(|a| a.name == "Precision Agriculture")
            .unwrap();
        let precision_ag = |lu: &str, y: u32| -> Option<AmEffect> {
            if lu == "Wheat" {
                Some(AmEffect {
                    yield_multiplier: Some(1.1),
                    ..Default::default()
                })
            } else {
                provider.precision_ag(lu, y)
            }
        };
        let delta = am_quantity_delta(&index, am, &q, precision_ag, 2030).unwrap();
        // Wheat is product 0; Beef meat (product 1) is not in J_a.
        assert!(delta[[0, 0, 0]] > 0.0);
        assert_eq!(delta[[0, 0, 1]], 0.0);
    }

    #[test]
    fn revenue_non_ag_prices_sequestration_by_carbon_price() {
        let provider = FakeProvider::toy();
        let rev = revenue_non_ag(&provider, 20.0).unwrap();
        // SEQUESTRATION = -5.0 t/ha, cell 0 area 2.0 ha: 5.0 * 20.0 * 2.0 = 200.0.
        assert_eq!(rev[[0, 0]], 200.0);
    }

    #[test]
    fn transition_non_ag_charges_only_environmental_plantings() {
        let provider = FakeProvider::toy();
        let t = transition_non_ag(&provider, 15.0).unwrap();
        // Only non-ag land use is "Environmental plantings", cell 0 area 2.0 ha.
        assert_eq!(t[[0, 0]], 15.0 * 2.0);
        assert_eq!(t[[1, 0]], 15.0 * 3.0);
    }

    #[test]
    fn exclude_non_ag_passes_through_the_provider_mask() {
        let provider = FakeProvider::toy();
        let mask = exclude_non_ag(&provider).unwrap();
        assert_eq!(mask.dim(), (2, 1));
        assert!(mask[[0, 0]]);
    }
}
