//! Raw metadata rows, as a JDBC-style metadata driver reports them

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Fully-qualified reference to one physical table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Name as written into SQL, optionally wrapped in MySQL backticks
    pub fn runtime_name(&self, delimit: bool) -> String {
        let quote = |part: &str| {
            if delimit {
                format!("`{}`", part)
            } else {
                part.to_string()
            }
        };
        [self.catalog.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .map(quote)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.runtime_name(false))
    }
}

/// One row of column metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumn {
    /// Table the column belongs to
    pub table: TableRef,

    /// Column name
    pub name: String,

    /// Vendor type code (`java.sql.Types` value)
    pub type_code: i32,

    /// Type name as declared, e.g. "VARCHAR(255)"
    pub type_name: String,

    /// Declared length or precision
    pub size: u32,

    /// Declared scale
    pub scale: u32,

    /// Whether the column is nullable
    pub nullable: bool,

    /// Column comment (if any)
    pub remarks: Option<String>,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Whether this column is auto-increment
    pub auto_increment: bool,

    /// Whether the value is computed by the database
    pub generated: bool,
}

/// One row of primary-key metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyColumn {
    pub column: String,
    /// 1-based position within the key
    pub key_seq: u16,
}

/// Source of column, key and remark metadata
pub trait DatabaseMetadata {
    /// Column rows for every table accepted by `table_filter`
    fn columns(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<RawColumn>>;

    /// Primary-key rows for one table, in any order
    fn primary_keys(&self, table: &TableRef) -> Result<Vec<PrimaryKeyColumn>>;

    /// Table comment, if the source records one
    fn table_remarks(&self, table: &TableRef) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_name() {
        let mut table = TableRef::new("orders");
        assert_eq!(table.runtime_name(false), "orders");
        table.schema = Some("shop".into());
        assert_eq!(table.runtime_name(true), "`shop`.`orders`");
        assert_eq!(table.to_string(), "shop.orders");
    }
}
