//! Maps the problem's decision variables onto a flat index space the
//! solver-agnostic [`luto_core::solver::LpProblem`] works with.
//!
//! Built once per year, then handed to both the objective/constraint
//! builders and the solution decoder so the two sides never drift apart.

use luto_core::index::IndexModel;
use ndarray::{Array2, Array3};

/// One `(agricultural management, land use)` slot with an AM decision
/// variable: `am_idx` into [`IndexModel::ag_managements`], `j` the land
/// use, `j_pos` its position within that management's own `J_a` ordering.
#[derive(Debug, Clone, Copy)]
pub struct AmSlot {
    pub am_idx: usize,
    pub j: usize,
    pub j_pos: usize,
}

/// Flat variable layout for one year's program: `X[m,r,j]`, `N[r,k]`,
/// `A[a,m,r,j]` for every enabled management's applicable land uses, and
/// one demand slack `V[c]` per commodity.
#[derive(Debug, Clone)]
pub struct VariableLayout {
    r_dim: usize,
    j_dim: usize,
    k_dim: usize,
    c_dim: usize,
    am_slots: Vec<AmSlot>,
    x_base: usize,
    n_base: usize,
    a_base: usize,
    v_base: usize,
    total: usize,
}

impl VariableLayout {
    pub fn build(index: &IndexModel, r_dim: usize, k_dim: usize) -> Self {
        let j_dim = index.n_land_uses();
        let c_dim = index.n_commodities();

        let mut am_slots = Vec::new();
        for (am_idx, am) in index.ag_managements().iter().enumerate() {
            if !am.enabled {
                continue;
            }
            for (j_pos, &j) in am.land_use_indices.iter().enumerate() {
                am_slots.push(AmSlot { am_idx, j, j_pos });
            }
        }

        let x_base = 0;
        let x_len = 2 * r_dim * j_dim;
        let n_base = x_base + x_len;
        let n_len = r_dim * k_dim;
        let a_base = n_base + n_len;
        let a_len = 2 * r_dim * am_slots.len();
        let v_base = a_base + a_len;
        let total = v_base + c_dim;

        Self {
            r_dim,
            j_dim,
            k_dim,
            c_dim,
            am_slots,
            x_base,
            n_base,
            a_base,
            v_base,
            total,
        }
    }

    pub fn total_variables(&self) -> usize {
        self.total
    }

    pub fn x_index(&self, m: usize, r: usize, j: usize) -> usize {
        self.x_base + (m * self.r_dim + r) * self.j_dim + j
    }

    pub fn n_index(&self, r: usize, k: usize) -> usize {
        self.n_base + r * self.k_dim + k
    }

    /// `None` if `(am_idx, j)` isn't an applicable combination for an
    /// enabled management — such a cell simply has no `A` variable.
    pub fn a_index(&self, am_idx: usize, m: usize, r: usize, j: usize) -> Option<usize> {
        let slot_pos = self
            .am_slots
            .iter()
            .position(|s| s.am_idx == am_idx && s.j == j)?;
        Some(self.a_base + (m * self.r_dim + r) * self.am_slots.len() + slot_pos)
    }

    pub fn v_index(&self, c: usize) -> usize {
        self.v_base + c
    }

    pub fn am_slots(&self) -> &[AmSlot] {
        &self.am_slots
    }

    pub fn r_dim(&self) -> usize {
        self.r_dim
    }

    pub fn j_dim(&self) -> usize {
        self.j_dim
    }

    pub fn k_dim(&self) -> usize {
        self.k_dim
    }

    pub fn c_dim(&self) -> usize {
        self.c_dim
    }
}

/// Variable bounds for every slot in the layout: `X`/`N`/`A` in `[0, 1]`
/// (the LP relaxation of the original 0/1 land-use choice), except where
/// `exclude_mask`/`exclude_mask_non_ag` forces an `X`/`N` slot's upper
/// bound to zero; `V` is non-negative with no upper bound.
pub fn variable_bounds(
    layout: &VariableLayout,
    exclude_mask: &Array3<bool>,
    exclude_mask_non_ag: &Array2<bool>,
) -> Vec<(f64, f64)> {
    let mut bounds = vec![(0.0, 1.0); layout.total_variables()];
    for m in 0..2 {
        for r in 0..layout.r_dim() {
            for j in 0..layout.j_dim() {
                if !exclude_mask[[m, r, j]] {
                    bounds[layout.x_index(m, r, j)] = (0.0, 0.0);
                }
            }
        }
    }
    for r in 0..layout.r_dim() {
        for k in 0..layout.k_dim() {
            if !exclude_mask_non_ag[[r, k]] {
                bounds[layout.n_index(r, k)] = (0.0, 0.0);
            }
        }
    }
    for c in 0..layout.c_dim() {
        bounds[layout.v_index(c)] = (0.0, f64::INFINITY);
    }
    bounds
}
