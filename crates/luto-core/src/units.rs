//! Compile-time unit safety for the scalar quantities that flow between
//! LUTO's components.
//!
//! The bulk per-cell tensors (`c_mrj`, `q_mrp`, ...) stay as plain
//! `ndarray` arrays of `f64` — wrapping every element would fight the
//! array crate for no benefit. These newtypes instead cover the scalar
//! quantities that are easy to mix up across a function boundary: a
//! hectare count added to a price, or a tonnage compared against a ratio.
//!
//! # Zero runtime overhead
//!
//! All types use `#[repr(transparent)]`, so they carry the same layout as
//! `f64` and the wrapper disappears after optimisation.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Land area in hectares.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectares(pub f64);
impl_unit_ops!(Hectares, "ha");

/// A monetary amount in Australian dollars.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Aud(pub f64);
impl_unit_ops!(Aud, "AUD");

/// Greenhouse-gas mass in tonnes of CO2-equivalent.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TonnesCo2e(pub f64);
impl_unit_ops!(TonnesCo2e, "tCO2e");

/// Water volume in megalitres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megalitres(pub f64);
impl_unit_ops!(Megalitres, "ML");

impl Aud {
    /// Amortise a lump-sum cost into an equal annual payment at `rate`
    /// over `horizon` years: the ordinary-annuity payment `x` solving
    /// `P = x * (1 - (1+r)^-h) / r`.
    pub fn amortise(self, rate: f64, horizon: u32) -> Aud {
        if horizon == 0 {
            return self;
        }
        if rate.abs() < 1e-12 {
            return Aud(self.0 / horizon as f64);
        }
        let factor = (1.0 - (1.0 + rate).powi(-(horizon as i32))) / rate;
        Aud(self.0 / factor)
    }
}
