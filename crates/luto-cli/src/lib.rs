//! Command-line entry point tying the data provider, Run Loop and Clarabel
//! solver adapter together: a `run` command against a small bundled demo
//! [`DataProvider`](luto_core::provider::DataProvider), and a `doctor`
//! command that sanity-checks the environment and a config before running.

pub mod cli;
pub mod commands;
pub mod demo_provider;

pub use cli::{Cli, Commands};
