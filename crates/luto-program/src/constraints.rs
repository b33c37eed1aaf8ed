//! The constraint groups of one year's program: area conservation, AM
//! subordination, commodity demand, regional water, GHG cap and the
//! optional biodiversity floor. Cell eligibility (`x_mrj`) is expressed as
//! variable bounds, not a constraint — see [`crate::layout::variable_bounds`].

use crate::layout::VariableLayout;
use luto_core::index::IndexModel;
use luto_core::solver::{Constraint, ConstraintSense, LinExpr};
use luto_core::types::{DemandConstraintType, Region};
use ndarray::{Array1, Array2, Array3};

/// Every cell is either an agricultural or non-agricultural option, never a
/// fraction of both and never unallocated.
pub fn area_conservation(layout: &VariableLayout) -> Vec<Constraint> {
    let mut out = Vec::with_capacity(layout.r_dim());
    for r in 0..layout.r_dim() {
        let mut expr = LinExpr::default();
        for m in 0..2 {
            for j in 0..layout.j_dim() {
                expr.add_term(layout.x_index(m, r, j), 1.0);
            }
        }
        for k in 0..layout.k_dim() {
            expr.add_term(layout.n_index(r, k), 1.0);
        }
        out.push(Constraint {
            name: format!("area_conservation_r{r}"),
            expr,
            sense: ConstraintSense::Eq,
            rhs: 1.0,
        });
    }
    out
}

/// `A[a,m,r,j] <= X[m,r,j]`: a management can only be active where its land
/// use is actually chosen.
pub fn am_subordination(layout: &VariableLayout) -> Vec<Constraint> {
    let mut out = Vec::new();
    for slot in layout.am_slots() {
        for m in 0..2 {
            for r in 0..layout.r_dim() {
                let Some(a_idx) = layout.a_index(slot.am_idx, m, r, slot.j) else {
                    continue;
                };
                let mut expr = LinExpr::default();
                expr.add_term(a_idx, 1.0);
                expr.add_term(layout.x_index(m, r, slot.j), -1.0);
                out.push(Constraint {
                    name: format!("am_subordination_a{}_m{m}_r{r}_j{}", slot.am_idx, slot.j),
                    expr,
                    sense: ConstraintSense::Le,
                    rhs: 0.0,
                });
            }
        }
    }
    out
}

/// Commodity production must meet demand: a hard equality, or a soft bound
/// with slack `V[c]` penalised in the objective on both sides. `q_c` for
/// land use `j` is the sum of whichever of its products ([`IndexModel::
/// products_of`]) aggregate into commodity `c` ([`IndexModel::pr2cm`]) —
/// quantity lives per product, not per land use, since two products of one
/// land use (meat and wool from the same sheep land use) can carry
/// different yields. The soft form scales both the production term and
/// `demand[c]` by `penalty` before comparing against `V[c]`, so `V[c]`
/// bounds `penalty * |d_c - q_c|`, matching the two-sided deviation
/// penalty the objective's `Σ_c penalty * V[c]` term assumes.
pub fn commodity_demand(
    layout: &VariableLayout,
    index: &IndexModel,
    quantity_ag: &Array3<f64>,
    am_yield_deltas: &[Array3<f64>],
    demand: &Array1<f64>,
    penalty: f64,
    constraint_type: DemandConstraintType,
) -> Vec<Constraint> {
    let pr2cm = index.pr2cm();
    let mut out = Vec::with_capacity(layout.c_dim() * 2);
    for c in 0..layout.c_dim() {
        let mut expr = LinExpr::default();
        for j in 0..layout.j_dim() {
            let products: Vec<usize> = index.products_of(j).into_iter().filter(|&p| pr2cm[[c, p]]).collect();
            if products.is_empty() {
                continue;
            }
            for m in 0..2 {
                for r in 0..layout.r_dim() {
                    let base: f64 = products.iter().map(|&p| quantity_ag[[m, r, p]]).sum();
                    if base != 0.0 {
                        expr.add_term(layout.x_index(m, r, j), base);
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
            let delta = &am_yield_deltas[slot.am_idx];
            for m in 0..2 {
                for r in 0..layout.r_dim() {
                    let d: f64 = products.iter().map(|&p| delta[[m, r, p]]).sum();
                    if d != 0.0 {
                        if let Some(idx) = layout.a_index(slot.am_idx, m, r, slot.j) {
                            expr.add_term(idx, d);
                        }
                    }
                }
            }
        }

        match constraint_type {
            DemandConstraintType::Hard => {
                out.push(Constraint {
                    name: format!("commodity_demand_hard_c{c}"),
                    expr,
                    sense: ConstraintSense::Eq,
                    rhs: demand[c],
                });
            }
            DemandConstraintType::Soft => {
                let scaled = scale_expr(&expr, penalty);

                let mut shortfall = scaled.clone();
                shortfall.add_term(layout.v_index(c), 1.0);
                out.push(Constraint {
                    name: format!("commodity_demand_shortfall_c{c}"),
                    expr: shortfall,
                    sense: ConstraintSense::Ge,
                    rhs: penalty * demand[c],
                });

                let mut surplus = LinExpr {
                    constant: -scaled.constant,
                    terms: scaled.terms.iter().map(|&(idx, coeff)| (idx, -coeff)).collect(),
                };
                surplus.add_term(layout.v_index(c), 1.0);
                out.push(Constraint {
                    name: format!("commodity_demand_surplus_c{c}"),
                    expr: surplus,
                    sense: ConstraintSense::Ge,
                    rhs: -penalty * demand[c],
                });
            }
        }
    }
    out
}

fn scale_expr(expr: &LinExpr, factor: f64) -> LinExpr {
    LinExpr {
        constant: expr.constant * factor,
        terms: expr.terms.iter().map(|&(idx, coeff)| (idx, coeff * factor)).collect(),
    }
}

/// Net water yield in each accounting region must not fall below its
/// long-term target.
pub fn regional_water_net_yield(
    layout: &VariableLayout,
    regions: &[Region],
    water_net_ag: &Array3<f64>,
    stress_fraction: f64,
) -> Vec<Constraint> {
    let mut out = Vec::with_capacity(regions.len());
    for region in regions {
        let mut expr = LinExpr::default();
        for &r in &region.cells {
            for m in 0..2 {
                for j in 0..layout.j_dim() {
                    let net = water_net_ag[[m, r, j]];
                    if net != 0.0 {
                        expr.add_term(layout.x_index(m, r, j), net);
                    }
                }
            }
        }
        out.push(Constraint {
            name: format!("water_net_yield_{}", region.name),
            expr,
            sense: ConstraintSense::Ge,
            rhs: region.target_ml(stress_fraction),
        });
    }
    out
}

/// Total agricultural plus non-agricultural GHG emissions must not exceed
/// the year's cap.
pub fn ghg_cap(
    layout: &VariableLayout,
    ghg_ag: &Array3<f64>,
    ghg_non_ag: &Array2<f64>,
    am_ghg_deltas: &[Array3<f64>],
    cap: f64,
) -> Constraint {
    let mut expr = LinExpr::default();
    for m in 0..2 {
        for r in 0..layout.r_dim() {
            for j in 0..layout.j_dim() {
                let v = ghg_ag[[m, r, j]];
                if v != 0.0 {
                    expr.add_term(layout.x_index(m, r, j), v);
                }
            }
        }
    }
    for r in 0..layout.r_dim() {
        for k in 0..layout.k_dim() {
            let v = ghg_non_ag[[r, k]];
            if v != 0.0 {
                expr.add_term(layout.n_index(r, k), v);
            }
        }
    }
    for slot in layout.am_slots() {
        let delta = &am_ghg_deltas[slot.am_idx];
        for m in 0..2 {
            for r in 0..layout.r_dim() {
                let d = delta[[m, r, slot.j]];
                if d != 0.0 {
                    if let Some(idx) = layout.a_index(slot.am_idx, m, r, slot.j) {
                        expr.add_term(idx, d);
                    }
                }
            }
        }
    }
    Constraint {
        name: "ghg_cap".into(),
        expr,
        sense: ConstraintSense::Le,
        rhs: cap,
    }
}

/// A biodiversity floor: `score` is a per-`(r, j)` land-use suitability
/// score, independent of land management.
pub fn biodiversity_floor(
    layout: &VariableLayout,
    score_ag: &Array2<f64>,
    score_non_ag: &Array2<f64>,
    target: f64,
) -> Constraint {
    let mut expr = LinExpr::default();
    for m in 0..2 {
        for r in 0..layout.r_dim() {
            for j in 0..layout.j_dim() {
                let s = score_ag[[r, j]];
                if s != 0.0 {
                    expr.add_term(layout.x_index(m, r, j), s);
                }
            }
        }
    }
    for r in 0..layout.r_dim() {
        for k in 0..layout.k_dim() {
            let s = score_non_ag[[r, k]];
            if s != 0.0 {
                expr.add_term(layout.n_index(r, k), s);
            }
        }
    }
    Constraint {
        name: "biodiversity_floor".into(),
        expr,
        sense: ConstraintSense::Ge,
        rhs: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luto_core::index::{AgManagementSpec, LandUse, LandUseCategory, Product, RootDepth};

    fn toy_layout() -> (IndexModel, VariableLayout) {
        let land_uses = vec![LandUse {
            name: "Wheat".into(),
            category: LandUseCategory::Crop,
            root_depth: RootDepth::Shallow,
        }];
        let index = IndexModel::build(
            land_uses,
            vec![Product { name: "Wheat".into() }],
            vec!["wheat".into()],
            Array2::from_elem((1, 1), true),
            Array2::from_elem((1, 1), true),
            vec![],
        )
        .unwrap();
        let layout = VariableLayout::build(&index, 2, 1);
        (index, layout)
    }

    #[test]
    fn area_conservation_covers_every_cell() {
        let (_, layout) = toy_layout();
        let cons = area_conservation(&layout);
        assert_eq!(cons.len(), 2);
        assert_eq!(cons[0].rhs, 1.0);
    }

    #[test]
    fn commodity_demand_soft_adds_slack_term() {
        let (index, layout) = toy_layout();
        let quantity = Array3::<f64>::ones((2, 2, 1));
        let demand = Array1::from_vec(vec![5.0]);
        let cons = commodity_demand(
            &layout,
            &index,
            &quantity,
            &[],
            &demand,
            2.0,
            DemandConstraintType::Soft,
        );
        assert_eq!(cons.len(), 2);
        assert!(cons.iter().all(|c| c.expr.terms.iter().any(|&(idx, _)| idx == layout.v_index(0))));
        assert!(cons.iter().all(|c| c.sense == ConstraintSense::Ge));
        // Shortfall rhs is penalty * demand.
        assert_eq!(cons[0].rhs, 10.0);
    }

    #[test]
    fn ghg_cap_sums_ag_and_non_ag() {
        let (_, layout) = toy_layout();
        let ghg_ag = Array3::<f64>::from_elem((2, 2, 1), 1.0);
        let ghg_non_ag = Array2::<f64>::from_elem((2, 1), 2.0);
        let cons = ghg_cap(&layout, &ghg_ag, &ghg_non_ag, &[], 100.0);
        assert_eq!(cons.rhs, 100.0);
        assert_eq!(cons.sense, ConstraintSense::Le);
    }
}
