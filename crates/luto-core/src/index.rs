//! The index model: canonical orderings and mapping matrices over land uses,
//! products, commodities and agricultural managements.
//!
//! Everything here is a pure, immutable facade over data handed in by a
//! [`crate::provider::DataProvider`] — there is no hidden global state, per
//! the "no hidden singletons" design note.

use crate::error::{LutoError, LutoResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Broad category a land use falls into. Dispatch on this instead of
/// string-sniffing a land-use name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandUseCategory {
    Crop,
    IntensiveCropping,
    Horticulture,
    LivestockNatural,
    LivestockModified,
    UnallocatedNatural,
    UnallocatedModified,
}

impl LandUseCategory {
    /// Is this category considered "natural land" for deforestation-penalty
    /// and root-depth purposes?
    pub fn is_natural(self) -> bool {
        matches!(
            self,
            LandUseCategory::LivestockNatural | LandUseCategory::UnallocatedNatural
        )
    }

    /// Is this category part of `LU_UNNATURAL` (modified-land agricultural
    /// uses a cell can be converted *to*, triggering the deforestation
    /// penalty when leaving natural land)?
    pub fn is_unnatural(self) -> bool {
        !self.is_natural()
    }

    /// Is this category `LU_UNALLOCATED`?
    pub fn is_unallocated(self) -> bool {
        matches!(
            self,
            LandUseCategory::UnallocatedNatural | LandUseCategory::UnallocatedModified
        )
    }

    /// Is this category `LU_LVSTK`?
    pub fn is_livestock(self) -> bool {
        matches!(
            self,
            LandUseCategory::LivestockNatural | LandUseCategory::LivestockModified
        )
    }

    /// Is this category `LU_CROPS`?
    pub fn is_crop(self) -> bool {
        matches!(
            self,
            LandUseCategory::Crop | LandUseCategory::IntensiveCropping | LandUseCategory::Horticulture
        )
    }
}

/// Root-depth class of a land use, used for shallow/deep-rooted water-yield
/// accounting. `LU_SHALLOW_ROOTED` and `LU_DEEP_ROOTED` (design note c) are
/// modelled explicitly here rather than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootDepth {
    Shallow,
    Deep,
    /// Land left in its native state: neither a shallow- nor deep-rooted
    /// agricultural use.
    Natural,
}

/// One entry of the agricultural land-use set `J`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandUse {
    pub name: String,
    pub category: LandUseCategory,
    pub root_depth: RootDepth,
}

/// One entry of the product set `P`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
}

/// Agricultural-management specification as supplied by a data provider:
/// the enabled flag and which land uses it applies to, by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgManagementSpec {
    pub name: String,
    pub enabled: bool,
    pub applicable_land_uses: Vec<String>,
}

/// A resolved agricultural management: `applicable_land_uses` has been
/// turned into indices into `J` and a `(J,)` boolean mask.
#[derive(Debug, Clone, PartialEq)]
pub struct AgManagement {
    pub name: String,
    pub enabled: bool,
    /// Sorted ascending indices into `J`: the `J_a` subset.
    pub land_use_indices: Vec<usize>,
    /// `(J,)` boolean mask, true where the land use is in `J_a`.
    pub land_use_mask: Vec<bool>,
}

/// The index model: canonical orderings plus the derived mapping matrices.
#[derive(Debug, Clone)]
pub struct IndexModel {
    land_uses: Vec<LandUse>,
    products: Vec<Product>,
    commodities: Vec<String>,
    /// `(P, J)` — which land use each product is derived from.
    lu2pr: Array2<bool>,
    /// `(C, P)` — which products aggregate into each commodity.
    pr2cm: Array2<bool>,
    /// `(C, J)` = `pr2cm . lu2pr`.
    lu2cm: Array2<bool>,
    /// `(P,)` — the one land use each product derives from, the reverse of
    /// `lu2pr`'s `(P, J)` mapping.
    pr2lu: Vec<usize>,
    ag_managements: Vec<AgManagement>,
    lu_crops: Vec<usize>,
    lu_lvstk: Vec<usize>,
    lu_natural: Vec<usize>,
    lu_unnatural: Vec<usize>,
    lu_unallocated: Vec<usize>,
    lu_shallow_rooted: Vec<usize>,
    lu_deep_rooted: Vec<usize>,
}

impl IndexModel {
    /// Build an index model from the orderings and mapping matrices a
    /// [`crate::provider::DataProvider`] exposes.
    ///
    /// Returns [`LutoError::Config`] if `lu2pr`/`pr2cm` have the wrong
    /// shape, or if an agricultural management names a land use absent
    /// from `land_uses`.
    pub fn build(
        land_uses: Vec<LandUse>,
        products: Vec<Product>,
        commodities: Vec<String>,
        lu2pr: Array2<bool>,
        pr2cm: Array2<bool>,
        ag_managements: Vec<AgManagementSpec>,
    ) -> LutoResult<Self> {
        let (nj, np, nc) = (land_uses.len(), products.len(), commodities.len());

        if lu2pr.shape() != [np, nj] {
            return Err(LutoError::Config(format!(
                "lu2pr shape {:?} does not match (P={}, J={})",
                lu2pr.shape(),
                np,
                nj
            )));
        }
        if pr2cm.shape() != [nc, np] {
            return Err(LutoError::Config(format!(
                "pr2cm shape {:?} does not match (C={}, P={})",
                pr2cm.shape(),
                nc,
                np
            )));
        }

        let lu2cm = bool_matmul(&pr2cm, &lu2pr);

        let mut pr2lu = Vec::with_capacity(np);
        for p in 0..np {
            let mut matches = (0..nj).filter(|&j| lu2pr[[p, j]]);
            let j = matches.next().ok_or_else(|| {
                LutoError::Config(format!(
                    "product {} ('{}') maps to no land use in lu2pr",
                    p, products[p].name
                ))
            })?;
            if matches.next().is_some() {
                return Err(LutoError::Config(format!(
                    "product {} ('{}') maps to more than one land use in lu2pr",
                    p, products[p].name
                )));
            }
            pr2lu.push(j);
        }

        let name_index: std::collections::HashMap<&str, usize> = land_uses
            .iter()
            .enumerate()
            .map(|(i, lu)| (lu.name.as_str(), i))
            .collect();

        let mut resolved = Vec::with_capacity(ag_managements.len());
        for spec in ag_managements {
            let mut indices = Vec::with_capacity(spec.applicable_land_uses.len());
            for name in &spec.applicable_land_uses {
                let idx = name_index.get(name.as_str()).ok_or_else(|| {
                    LutoError::Config(format!(
                        "agricultural management '{}' references unknown land use '{}'",
                        spec.name, name
                    ))
                })?;
                indices.push(*idx);
            }
            indices.sort_unstable();
            let mut mask = vec![false; nj];
            for &idx in &indices {
                mask[idx] = true;
            }
            resolved.push(AgManagement {
                name: spec.name,
                enabled: spec.enabled,
                land_use_indices: indices,
                land_use_mask: mask,
            });
        }

        let mut lu_crops = Vec::new();
        let mut lu_lvstk = Vec::new();
        let mut lu_natural = Vec::new();
        let mut lu_unnatural = Vec::new();
        let mut lu_unallocated = Vec::new();
        let mut lu_shallow_rooted = Vec::new();
        let mut lu_deep_rooted = Vec::new();
        for (i, lu) in land_uses.iter().enumerate() {
            if lu.category.is_crop() {
                lu_crops.push(i);
            }
            if lu.category.is_livestock() {
                lu_lvstk.push(i);
            }
            if lu.category.is_natural() {
                lu_natural.push(i);
            } else {
                lu_unnatural.push(i);
            }
            if lu.category.is_unallocated() {
                lu_unallocated.push(i);
            }
            match lu.root_depth {
                RootDepth::Shallow => lu_shallow_rooted.push(i),
                RootDepth::Deep => lu_deep_rooted.push(i),
                RootDepth::Natural => {}
            }
        }

        Ok(Self {
            land_uses,
            products,
            commodities,
            lu2pr,
            pr2cm,
            lu2cm,
            pr2lu,
            ag_managements: resolved,
            lu_crops,
            lu_lvstk,
            lu_natural,
            lu_unnatural,
            lu_unallocated,
            lu_shallow_rooted,
            lu_deep_rooted,
        })
    }

    pub fn n_land_uses(&self) -> usize {
        self.land_uses.len()
    }

    pub fn n_products(&self) -> usize {
        self.products.len()
    }

    pub fn n_commodities(&self) -> usize {
        self.commodities.len()
    }

    pub fn land_uses(&self) -> &[LandUse] {
        &self.land_uses
    }

    pub fn commodities(&self) -> &[String] {
        &self.commodities
    }

    pub fn lu2pr(&self) -> &Array2<bool> {
        &self.lu2pr
    }

    pub fn pr2cm(&self) -> &Array2<bool> {
        &self.pr2cm
    }

    pub fn lu2cm(&self) -> &Array2<bool> {
        &self.lu2cm
    }

    pub fn pr2lu(&self) -> &[usize] {
        &self.pr2lu
    }

    /// Every product index derived from land use `j`, ascending.
    pub fn products_of(&self, j: usize) -> Vec<usize> {
        (0..self.products.len()).filter(|&p| self.pr2lu[p] == j).collect()
    }

    pub fn ag_managements(&self) -> &[AgManagement] {
        &self.ag_managements
    }

    pub fn lu_crops(&self) -> &[usize] {
        &self.lu_crops
    }

    pub fn lu_lvstk(&self) -> &[usize] {
        &self.lu_lvstk
    }

    pub fn lu_natural(&self) -> &[usize] {
        &self.lu_natural
    }

    pub fn lu_unnatural(&self) -> &[usize] {
        &self.lu_unnatural
    }

    pub fn lu_unallocated(&self) -> &[usize] {
        &self.lu_unallocated
    }

    pub fn lu_shallow_rooted(&self) -> &[usize] {
        &self.lu_shallow_rooted
    }

    pub fn lu_deep_rooted(&self) -> &[usize] {
        &self.lu_deep_rooted
    }
}

/// Boolean matrix product `a (n,k) . b (k,m) -> (n,m)`, true if any term is true.
fn bool_matmul(a: &Array2<bool>, b: &Array2<bool>) -> Array2<bool> {
    let (n, k) = (a.shape()[0], a.shape()[1]);
    let m = b.shape()[1];
    debug_assert_eq!(k, b.shape()[0]);
    Array2::from_shape_fn((n, m), |(i, j)| (0..k).any(|t| a[[i, t]] && b[[t, j]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_land_uses() -> Vec<LandUse> {
        vec![
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
        ]
    }

    #[test]
    fn unknown_am_land_use_is_config_error() {
        let land_uses = toy_land_uses();
        let lu2pr = Array2::from_elem((2, 2), false);
        let pr2cm = Array2::from_elem((1, 2), false);
        let result = IndexModel::build(
            land_uses,
            vec![Product { name: "Wheat".into() }, Product { name: "Meat".into() }],
            vec!["wheat".into()],
            lu2pr,
            pr2cm,
            vec![AgManagementSpec {
                name: "Asparagopsis taxiformis".into(),
                enabled: true,
                applicable_land_uses: vec!["Sheep - natural land".into()],
            }],
        );
        assert!(matches!(result, Err(LutoError::Config(_))));
    }

    #[test]
    fn lu2cm_composes_lu2pr_and_pr2cm() {
        let land_uses = toy_land_uses();
        // P = {Wheat, Beef meat}; J = {Wheat, Beef - modified land}.
        let mut lu2pr = Array2::from_elem((2, 2), false);
        lu2pr[[0, 0]] = true; // Wheat product <- Wheat land use.
        lu2pr[[1, 1]] = true; // Beef meat product <- Beef land use.
        // C = {wheat, meat}.
        let mut pr2cm = Array2::from_elem((2, 2), false);
        pr2cm[[0, 0]] = true;
        pr2cm[[1, 1]] = true;

        let model = IndexModel::build(
            land_uses,
            vec![
                Product { name: "Wheat".into() },
                Product { name: "Beef meat".into() },
            ],
            vec!["wheat".into(), "meat".into()],
            lu2pr,
            pr2cm,
            vec![],
        )
        .unwrap();

        assert!(model.lu2cm()[[0, 0]]);
        assert!(!model.lu2cm()[[0, 1]]);
        assert!(model.lu2cm()[[1, 1]]);
    }

    #[test]
    fn subsets_partition_land_uses_by_category() {
        let land_uses = toy_land_uses();
        let lu2pr = Array2::from_shape_vec((2, 2), vec![true, false, false, true]).unwrap();
        let pr2cm = Array2::from_elem((1, 2), false);
        let model = IndexModel::build(
            land_uses,
            vec![Product { name: "a".into() }, Product { name: "b".into() }],
            vec!["c".into()],
            lu2pr,
            pr2cm,
            vec![],
        )
        .unwrap();
        assert_eq!(model.lu_crops(), &[0]);
        assert_eq!(model.lu_lvstk(), &[1]);
        assert_eq!(model.lu_shallow_rooted(), &[0]);
        assert_eq!(model.lu_deep_rooted(), &[1]);
    }

    #[test]
    fn pr2lu_inverts_lu2pr() {
        let land_uses = toy_land_uses();
        let lu2pr = Array2::from_shape_vec((2, 2), vec![true, false, false, true]).unwrap();
        let pr2cm = Array2::from_elem((1, 2), false);
        let model = IndexModel::build(
            land_uses,
            vec![Product { name: "a".into() }, Product { name: "b".into() }],
            vec!["c".into()],
            lu2pr,
            pr2cm,
            vec![],
        )
        .unwrap();
        assert_eq!(model.pr2lu(), &[0, 1]);
        assert_eq!(model.products_of(0), vec![0]);
        assert_eq!(model.products_of(1), vec![1]);
    }

    #[test]
    fn product_mapping_to_two_land_uses_is_config_error() {
        let land_uses = toy_land_uses();
        let lu2pr = Array2::from_elem((1, 2), true);
        let pr2cm = Array2::from_elem((1, 1), true);
        let result = IndexModel::build(
            land_uses,
            vec![Product { name: "ambiguous".into() }],
            vec!["c".into()],
            lu2pr,
            pr2cm,
            vec![],
        );
        assert!(matches!(result, Err(LutoError::Config(_))));
    }
}
