//! Ties the data provider, algorithms and program builder together into a
//! runnable multi-year optimisation: the State Updater ([`state`]) and the
//! Run Loop ([`loop_`]).

pub mod loop_;
pub mod state;

pub use loop_::{build_index, RunLoop, RunReport, YearReport};
pub use state::RunState;
