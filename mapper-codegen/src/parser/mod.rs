//! Metadata sources: the driver-facing trait and a DDL-backed implementation

mod jdbc;
mod metadata;
mod schema_parser;

pub use jdbc::*;
pub use metadata::*;
pub use schema_parser::*;
