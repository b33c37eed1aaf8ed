//! Solution decoding: turn a solved LP's variable values back into the
//! per-cell maps the state updater persists.

use crate::layout::VariableLayout;
use luto_core::index::IndexModel;
use luto_core::solver::LpSolution;
use luto_core::types::LandManagement;
use ndarray::{Array1, Array2};

/// A decoded year's result: `-1` in `lumap` means the cell went
/// non-agricultural, with its choice recorded in `non_ag_map` instead.
pub struct DecodedYear {
    pub lumap: Array1<i32>,
    pub lmmap: Array1<LandManagement>,
    pub non_ag_map: Array1<i32>,
    /// One boolean array per agricultural management in
    /// [`IndexModel::ag_managements`] order (disabled managements get an
    /// all-`false` array), `true` where that management is active.
    pub ammap: Vec<Array1<bool>>,
}

/// Decode a solution by per-cell argmax over every `X`/`N` option, with an
/// AM considered active only where its `A` value clears
/// `am_activity_threshold` relative to the winning `X` value — a
/// management the solver left at a token fraction of its host land use
/// doesn't count as adopted.
pub fn decode_solution(
    layout: &VariableLayout,
    index: &IndexModel,
    solution: &LpSolution,
    am_activity_threshold: f64,
) -> DecodedYear {
    let r_dim = layout.r_dim();
    let j_dim = layout.j_dim();
    let k_dim = layout.k_dim();

    let mut lumap = Array1::<i32>::from_elem(r_dim, -1);
    let mut lmmap = Array1::from_elem(r_dim, LandManagement::Dry);
    let mut non_ag_map = Array1::<i32>::from_elem(r_dim, -1);
    let mut winning_x = Array2::<f64>::zeros((r_dim, 2));

    for r in 0..r_dim {
        let mut best_value = 0.0;
        let mut best_is_ag = false;
        let mut best_m = LandManagement::Dry;
        let mut best_j = 0usize;
        let mut best_k = 0usize;

        // Ties are broken by smaller `j` then smaller `m`, so `j` must be
        // the outer loop: the first-seen maximum under a strict `>` is then
        // always the lowest `(j, m)` pair.
        for j in 0..j_dim {
            for m in 0..2 {
                let v = solution.value(layout.x_index(m, r, j));
                if v > best_value {
                    best_value = v;
                    best_is_ag = true;
                    best_m = LandManagement::ALL[m];
                    best_j = j;
                }
            }
        }
        for k in 0..k_dim {
            let v = solution.value(layout.n_index(r, k));
            if v > best_value {
                best_value = v;
                best_is_ag = false;
                best_k = k;
            }
        }

        if best_is_ag {
            lumap[r] = best_j as i32;
            lmmap[r] = best_m;
            winning_x[[r, best_m.index()]] = best_value;
        } else {
            non_ag_map[r] = best_k as i32;
        }
    }

    let mut ammap = Vec::with_capacity(index.ag_managements().len());
    for (am_idx, am) in index.ag_managements().iter().enumerate() {
        let mut active = Array1::from_elem(r_dim, false);
        if am.enabled {
            for r in 0..r_dim {
                if lumap[r] < 0 {
                    continue;
                }
                let j = lumap[r] as usize;
                if !am.land_use_mask[j] {
                    continue;
                }
                let m = lmmap[r].index();
                let Some(a_idx) = layout.a_index(am_idx, m, r, j) else {
                    continue;
                };
                let a_value = solution.value(a_idx);
                let host = winning_x[[r, m]];
                if host > 0.0 && a_value / host >= am_activity_threshold {
                    active[r] = true;
                }
            }
        }
        ammap.push(active);
    }

    DecodedYear {
        lumap,
        lmmap,
        non_ag_map,
        ammap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luto_core::index::{AgManagementSpec, LandUse, LandUseCategory, Product, RootDepth};
    use luto_core::types::SolveStatus;
    use ndarray::Array2 as NdArray2;

    fn toy() -> (IndexModel, VariableLayout) {
        let land_uses = vec![
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
        let index = IndexModel::build(
            land_uses,
            vec![Product { name: "Wheat".into() }, Product { name: "Beef meat".into() }],
            vec!["wheat".into(), "meat".into()],
            NdArray2::from_shape_vec((2, 2), vec![true, false, false, true]).unwrap(),
            NdArray2::from_elem((2, 2), true),
            vec![AgManagementSpec {
                name: "Precision Agriculture".into(),
                enabled: true,
                applicable_land_uses: vec!["Wheat".into()],
            }],
        )
        .unwrap();
        let layout = VariableLayout::build(&index, 1, 1);
        (index, layout)
    }

    #[test]
    fn decodes_winning_ag_option_per_cell() {
        let (index, layout) = toy();
        let mut values = vec![0.0; layout.total_variables()];
        values[layout.x_index(0, 0, 0)] = 1.0; // Wheat, dry, cell 0.
        let solution = LpSolution {
            status: SolveStatus::Optimal,
            values,
            objective_value: 0.0,
        };
        let decoded = decode_solution(&layout, &index, &solution, 0.5);
        assert_eq!(decoded.lumap[0], 0);
        assert_eq!(decoded.lmmap[0], LandManagement::Dry);
    }

    #[test]
    fn am_below_threshold_is_not_marked_active() {
        let (index, layout) = toy();
        let mut values = vec![0.0; layout.total_variables()];
        values[layout.x_index(0, 0, 0)] = 1.0;
        if let Some(idx) = layout.a_index(0, 0, 0, 0) {
            values[idx] = 0.1; // well under the 0.5 host fraction.
        }
        let solution = LpSolution {
            status: SolveStatus::Optimal,
            values,
            objective_value: 0.0,
        };
        let decoded = decode_solution(&layout, &index, &solution, 0.5);
        assert!(!decoded.ammap[0][0]);
    }

    #[test]
    fn ties_break_by_smaller_land_use_then_smaller_management() {
        let (index, layout) = toy();
        let mut values = vec![0.0; layout.total_variables()];
        // Beef (j=1, dry) and Wheat (j=0, irr) are tied at 0.7; the winner
        // must be the smaller `j`, Wheat, regardless of which `m` it's on.
        values[layout.x_index(0, 0, 1)] = 0.7;
        values[layout.x_index(1, 0, 0)] = 0.7;
        let solution = LpSolution {
            status: SolveStatus::Optimal,
            values,
            objective_value: 0.0,
        };
        let decoded = decode_solution(&layout, &index, &solution, 0.5);
        assert_eq!(decoded.lumap[0], 0);
        assert_eq!(decoded.lmmap[0], LandManagement::Irr);
    }

    #[test]
    fn cell_with_no_ag_value_goes_non_agricultural() {
        let (index, layout) = toy();
        let mut values = vec![0.0; layout.total_variables()];
        values[layout.n_index(0, 0)] = 1.0;
        let solution = LpSolution {
            status: SolveStatus::Optimal,
            values,
            objective_value: 0.0,
        };
        let decoded = decode_solution(&layout, &index, &solution, 0.5);
        assert_eq!(decoded.lumap[0], -1);
        assert_eq!(decoded.non_ag_map[0], 0);
    }
}
