//! Spatial coarse-graining (RESFACTOR): the deterministic downsample mask
//! applied to the active-cell set, and the nearest-neighbour reconstitution
//! back to full resolution after a year has been solved.

use luto_core::types::{GridShape, Region};
use ndarray::{Array1, Array2, Array3};

/// RESFACTOR stride mask over the 2-D grid: true where both coordinates
/// land on the `resfactor`-grid. `resfactor == 1` retains every cell.
pub fn resmask(grid: GridShape, resfactor: u32) -> Array1<bool> {
    let resfactor = resfactor.max(1) as usize;
    Array1::from_shape_fn(grid.n_cells(), |idx| {
        let (row, col) = grid.coords(idx);
        row % resfactor == 0 && col % resfactor == 0
    })
}

/// The land-use mask: true where the seed land-use map is agricultural
/// (not `-1`).
pub fn lumask(seed_lumap: &Array1<i32>) -> Array1<bool> {
    seed_lumap.mapv(|v| v != -1)
}

/// The active-cell mask used for the whole run: `lumask & rfmask`. `R`, the
/// dense cell count the rest of the pipeline works with, is this mask's
/// population count.
pub fn active_mask(lumask: &Array1<bool>, rfmask: &Array1<bool>) -> Array1<bool> {
    assert_eq!(lumask.len(), rfmask.len());
    Array1::from_shape_fn(lumask.len(), |i| lumask[i] && rfmask[i])
}

/// Restrict a full-grid array down to the `R` active cells, in order.
pub fn select_active<T: Copy>(full: &Array1<T>, mask: &Array1<bool>) -> Array1<T> {
    let values: Vec<T> = full
        .iter()
        .zip(mask.iter())
        .filter_map(|(v, &m)| if m { Some(*v) } else { None })
        .collect();
    Array1::from_vec(values)
}

/// Restrict a `(M, R, J)` tensor's middle axis down to the active cells in
/// `mask`, in order. Matrix builders work at full provider resolution;
/// every tensor crosses this once per year before the program builder sees
/// it, since demand/GHG/water caps are not themselves rescaled (design
/// note: "each retained cell represents itself").
pub fn select_active_mrj<T: Copy + Default>(full: &Array3<T>, mask: &Array1<bool>) -> Array3<T> {
    let (m_dim, _, j_dim) = full.dim();
    let r_dim = mask.iter().filter(|&&m| m).count();
    let mut out = Array3::<T>::from_elem((m_dim, r_dim, j_dim), T::default());
    let mut dst_r = 0;
    for (r, &keep) in mask.iter().enumerate() {
        if !keep {
            continue;
        }
        for m in 0..m_dim {
            for j in 0..j_dim {
                out[[m, dst_r, j]] = full[[m, r, j]];
            }
        }
        dst_r += 1;
    }
    out
}

/// Restrict an `(R, K)` tensor's first axis down to the active cells in
/// `mask`, in order.
pub fn select_active_rk<T: Copy + Default>(full: &Array2<T>, mask: &Array1<bool>) -> Array2<T> {
    let (_, k_dim) = full.dim();
    let r_dim = mask.iter().filter(|&&m| m).count();
    let mut out = Array2::<T>::from_elem((r_dim, k_dim), T::default());
    let mut dst_r = 0;
    for (r, &keep) in mask.iter().enumerate() {
        if !keep {
            continue;
        }
        for k in 0..k_dim {
            out[[dst_r, k]] = full[[r, k]];
        }
        dst_r += 1;
    }
    out
}

/// Remap water-accounting regions' cell indices from full provider
/// resolution down to the RESFACTOR-active cell space, dropping cells the
/// mask excludes.
pub fn remap_regions(regions: &[Region], mask: &Array1<bool>) -> Vec<Region> {
    let mut new_index = vec![None; mask.len()];
    let mut next = 0usize;
    for (i, &keep) in mask.iter().enumerate() {
        if keep {
            new_index[i] = Some(next);
            next += 1;
        }
    }
    regions
        .iter()
        .map(|region| Region {
            name: region.name.clone(),
            cells: region.cells.iter().filter_map(|&c| new_index[c]).collect(),
            historical_yield_ml: region.historical_yield_ml,
        })
        .collect()
}

/// Broadcast a dense `R`-sized array back onto the full grid by
/// nearest-neighbour lookup against the active-cell coordinates, then
/// overwrite non-agricultural cells (where `lumask` is false) with `filler`.
///
/// This is the State Updater's uncoarsen step followed by reconstitution,
/// kept as one call since the second step only ever follows the first.
pub fn uncoarsen_and_reconstitute(
    grid: GridShape,
    values: &Array1<i32>,
    active_mask: &Array1<bool>,
    lumask: &Array1<bool>,
    filler: i32,
) -> Array1<i32> {
    assert_eq!(active_mask.len(), grid.n_cells());
    assert_eq!(lumask.len(), grid.n_cells());
    let active_coords: Vec<(usize, usize)> = active_mask
        .iter()
        .enumerate()
        .filter_map(|(idx, &m)| if m { Some(grid.coords(idx)) } else { None })
        .collect();
    assert_eq!(active_coords.len(), values.len(), "value count must equal active cells");

    Array1::from_shape_fn(grid.n_cells(), |idx| {
        if !lumask[idx] {
            return filler;
        }
        let (row, col) = grid.coords(idx);
        let nearest = nearest_active(&active_coords, row, col);
        values[nearest]
    })
}

/// Index (into `active_coords`/`values`) of the coordinate nearest `(row,
/// col)` by squared Euclidean distance, ties broken by lowest index.
fn nearest_active(active_coords: &[(usize, usize)], row: usize, col: usize) -> usize {
    active_coords
        .iter()
        .enumerate()
        .map(|(i, &(r, c))| {
            let dr = r as i64 - row as i64;
            let dc = c as i64 - col as i64;
            (i, dr * dr + dc * dc)
        })
        .min_by_key(|&(_, dist)| dist)
        .map(|(i, _)| i)
        .expect("at least one active cell")
}
