//! Canonical table and column models

mod column;
mod table;

pub use column::*;
pub use table::*;

#[cfg(test)]
pub(crate) mod test_support {
    pub use super::column::test_support::*;
    pub use super::table::test_support::*;
}
