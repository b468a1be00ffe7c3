//! Configuration: run-level settings and per-table specs

pub mod defaults;
mod settings;
mod table;

pub use settings::*;
pub use table::*;
