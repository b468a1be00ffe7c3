//! Resolved column model

use std::collections::BTreeMap;

use crate::dom::JavaType;

/// How the database assigns a column's value on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    None,
    /// Assigned by the insert itself (auto-increment, identity)
    Identity,
    /// Fetched from a sequence before the insert
    Sequence,
}

/// One physical column after naming, type resolution and overrides
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    /// Column name as the database reports it
    pub actual_name: String,

    /// Java property name
    pub property: String,

    pub java_type: JavaType,

    /// JDBC type name, e.g. `VARCHAR`
    pub jdbc_type: String,

    pub nullable: bool,

    pub primary_key: bool,

    /// 1-based position within the primary key; 0 for other columns
    pub key_seq: u16,

    pub large_object: bool,

    pub key_generation: KeyGeneration,

    /// Computed by the database, never written
    pub generated_always: bool,

    pub type_handler: Option<String>,

    pub properties: BTreeMap<String, String>,

    pub remarks: Option<String>,

    pub default_value: Option<String>,

    pub length: u32,

    pub scale: u32,

    /// Quote the column name in SQL
    pub delimited: bool,
}

impl ColumnModel {
    /// Whether the column is excluded from explicit insert/update value lists.
    /// Sequence keys are fetched before the insert and written like any other value.
    pub fn is_generated(&self) -> bool {
        self.generated_always || self.key_generation == KeyGeneration::Identity
    }

    /// Column name as written into SQL
    pub fn escaped_name(&self) -> String {
        if self.delimited {
            format!("`{}`", self.actual_name)
        } else {
            self.actual_name.clone()
        }
    }

    /// MyBatis parameter reference, e.g. `#{item.orderCode}`
    pub fn parameter(&self, prefix: Option<&str>) -> String {
        let mut param = String::from("#{");
        if let Some(prefix) = prefix {
            param.push_str(prefix);
            param.push('.');
        }
        param.push_str(&self.property);
        if let Some(handler) = &self.type_handler {
            param.push_str(",typeHandler=");
            param.push_str(handler);
        }
        param.push('}');
        param
    }

    /// Property path as used in OGNL tests, e.g. `item.orderCode`
    pub fn property_path(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{}.{}", prefix, self.property),
            None => self.property.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::column;
    use super::*;

    #[test]
    fn test_parameters() {
        let mut col = column("order_code");
        assert_eq!(col.parameter(None), "#{orderCode}");
        assert_eq!(col.parameter(Some("item")), "#{item.orderCode}");
        assert_eq!(col.property_path(Some("item")), "item.orderCode");

        col.type_handler = Some("com.example.CodeHandler".into());
        assert_eq!(
            col.parameter(None),
            "#{orderCode,typeHandler=com.example.CodeHandler}"
        );
    }

    #[test]
    fn test_generated_columns() {
        let mut col = column("id");
        assert!(!col.is_generated());
        col.key_generation = KeyGeneration::Identity;
        assert!(col.is_generated());
        col.key_generation = KeyGeneration::Sequence;
        assert!(!col.is_generated());

        let mut col = column("total");
        col.generated_always = true;
        assert!(col.is_generated());
    }

    #[test]
    fn test_escaped_name() {
        let mut col = column("order");
        assert_eq!(col.escaped_name(), "order");
        col.delimited = true;
        assert_eq!(col.escaped_name(), "`order`");
    }
}
