//! Introspection: naming, type resolution and table model assembly

mod introspector;
pub mod naming;
mod type_resolver;

pub use introspector::*;
pub use type_resolver::*;
