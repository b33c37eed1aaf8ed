//! Core types, index model, configuration and external-interface contracts
//! for the LUTO land-use optimisation engine.
//!
//! This crate has no dependency on any particular solver or tensor-builder
//! implementation — it defines the shapes that [`provider::DataProvider`]
//! implementations and [`solver::SolverAdapter`] implementations must agree
//! on, plus the [`index::IndexModel`] facade both sides are built around.

pub mod config;
pub mod error;
pub mod index;
pub mod provider;
pub mod solver;
pub mod types;
pub mod units;

pub use error::{LutoError, LutoResult};
