//! The Culler: narrows the `(M, R, J)` exclusion mask to the most
//! profitable options per cell, before the program builder ever sees them.
//!
//! Culling only tightens `x_mrj`; it never turns an excluded option back
//! on.

use luto_core::types::CullMode;
use ndarray::Array3;
use std::collections::HashSet;

/// Apply the configured cull mode to `x_mrj`, returning a new, narrower
/// exclusion mask. `cost_*` tensors are combined as `cost + transition -
/// revenue` to rank options, matching the objective's own cost terms.
pub fn apply_cull(
    mode: CullMode,
    max_land_uses_per_cell: usize,
    land_usage_cull_percentage: f64,
    x_mrj: &Array3<bool>,
    c_mrj: &Array3<f64>,
    t_mrj: &Array3<f64>,
    r_mrj: &Array3<f64>,
) -> Array3<bool> {
    if matches!(mode, CullMode::None) {
        return x_mrj.clone();
    }

    let (m_dim, r_dim, j_dim) = x_mrj.dim();
    let mut out = x_mrj.clone();

    for m in 0..m_dim {
        for r in 0..r_dim {
            let mut allowed: Vec<(usize, f64)> = (0..j_dim)
                .filter(|&j| x_mrj[[m, r, j]])
                .map(|j| (j, c_mrj[[m, r, j]] + t_mrj[[m, r, j]] - r_mrj[[m, r, j]]))
                .collect();
            if allowed.is_empty() {
                continue;
            }

            let keep_n = match mode {
                CullMode::Absolute => {
                    if allowed.len() < max_land_uses_per_cell {
                        continue;
                    }
                    max_land_uses_per_cell
                }
                CullMode::Percentage => {
                    let n = allowed.len();
                    let include_fraction = 1.0 - land_usage_cull_percentage;
                    ((include_fraction * n as f64).round() as usize).max(1)
                }
                CullMode::None => unreachable!(),
            };

            allowed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
            let keep: HashSet<usize> = allowed
                .into_iter()
                .take(keep_n)
                .map(|(j, _)| j)
                .collect();

            for j in 0..j_dim {
                out[[m, r, j]] = x_mrj[[m, r, j]] && keep.contains(&j);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_mode_retains_cheapest_n() {
        let x = Array3::from_elem((1, 1, 3), true);
        let c = Array3::from_shape_vec((1, 1, 3), vec![10.0, 5.0, 20.0]).unwrap();
        let t = Array3::<f64>::zeros((1, 1, 3));
        let r = Array3::<f64>::zeros((1, 1, 3));
        let out = apply_cull(CullMode::Absolute, 2, 0.0, &x, &c, &t, &r);
        assert!(out[[0, 0, 1]]); // cost 5, cheapest
        assert!(out[[0, 0, 0]]); // cost 10, second
        assert!(!out[[0, 0, 2]]); // cost 20, culled
    }

    #[test]
    fn absolute_mode_skips_when_too_few_options() {
        let x = Array3::from_elem((1, 1, 2), true);
        let c = Array3::from_shape_vec((1, 1, 2), vec![10.0, 5.0]).unwrap();
        let t = Array3::<f64>::zeros((1, 1, 2));
        let r = Array3::<f64>::zeros((1, 1, 2));
        let out = apply_cull(CullMode::Absolute, 3, 0.0, &x, &c, &t, &r);
        assert_eq!(out, x);
    }

    #[test]
    fn percentage_mode_keeps_at_least_one() {
        let x = Array3::from_elem((1, 1, 4), true);
        let c = Array3::from_shape_vec((1, 1, 4), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let t = Array3::<f64>::zeros((1, 1, 4));
        let r = Array3::<f64>::zeros((1, 1, 4));
        // Cull 99%: only the single cheapest option survives.
        let out = apply_cull(CullMode::Percentage, 0, 0.99, &x, &c, &t, &r);
        let kept: usize = (0..4).filter(|&j| out[[0, 0, j]]).count();
        assert_eq!(kept, 1);
        assert!(out[[0, 0, 0]]);
    }

    #[test]
    fn never_re_enables_an_already_excluded_option() {
        let mut x = Array3::from_elem((1, 1, 2), true);
        x[[0, 0, 1]] = false;
        let c = Array3::from_shape_vec((1, 1, 2), vec![10.0, 1.0]).unwrap();
        let t = Array3::<f64>::zeros((1, 1, 2));
        let r = Array3::<f64>::zeros((1, 1, 2));
        let out = apply_cull(CullMode::Absolute, 1, 0.0, &x, &c, &t, &r);
        assert!(!out[[0, 0, 1]]);
    }
}
