//! Naming utilities for code generation

use heck::{ToLowerCamelCase, ToPascalCase};

use crate::config::PropertyNaming;

/// Convert a table name to a domain object name (PascalCase)
pub fn to_domain_object_name(table_name: &str) -> String {
    table_name.to_pascal_case()
}

/// Convert a column name to a property name (camelCase)
pub fn to_property_name(column_name: &str) -> String {
    column_name.to_lower_camel_case()
}

/// Derive a property name from a (possibly renamed) column name
pub fn derive_property_name(mode: PropertyNaming, column_name: &str, remarks: Option<&str>) -> String {
    match mode {
        PropertyNaming::Actual => column_name.to_string(),
        PropertyNaming::Compound => match remarks.map(str::trim).filter(|r| !r.is_empty()) {
            Some(remarks) => format!("{}_{}", column_name, remarks.to_pascal_case()),
            None => column_name.to_string(),
        },
        PropertyNaming::CamelCase => to_property_name(column_name),
    }
}

/// JavaBeans accessor suffix: `orderCode` -> `OrderCode`, `xAxis` -> `xAxis`
fn accessor_suffix(property: &str) -> String {
    let mut chars = property.chars();
    match (chars.next(), chars.next()) {
        (Some(_), Some(second)) if second.is_uppercase() => property.to_string(),
        (Some(first), _) => {
            let mut s = first.to_uppercase().collect::<String>();
            s.push_str(&property[first.len_utf8()..]);
            s
        }
        (None, _) => String::new(),
    }
}

/// Getter name; `is` prefix only for primitive booleans
pub fn getter_name(property: &str, primitive_boolean: bool) -> String {
    let prefix = if primitive_boolean { "is" } else { "get" };
    format!("{}{}", prefix, accessor_suffix(property))
}

pub fn setter_name(property: &str) -> String {
    format!("set{}", accessor_suffix(property))
}

/// Property name used for a multi-value filter over `property`
pub fn list_property_name(property: &str) -> String {
    format!("{}List", property)
}

/// Check if a name is a Java reserved word
pub fn is_java_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "false"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "null"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "true"
            | "try"
            | "void"
            | "volatile"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_domain_object_name() {
        assert_eq!(to_domain_object_name("orders"), "Orders");
        assert_eq!(to_domain_object_name("user_settings"), "UserSettings");
        assert_eq!(to_domain_object_name("ORDER_ITEMS"), "OrderItems");
    }

    #[test]
    fn test_to_property_name() {
        assert_eq!(to_property_name("order_code"), "orderCode");
        assert_eq!(to_property_name("IS_DELETED"), "isDeleted");
        assert_eq!(to_property_name("id"), "id");
    }

    #[test]
    fn test_property_modes() {
        assert_eq!(
            derive_property_name(PropertyNaming::Actual, "ORDER_CODE", None),
            "ORDER_CODE"
        );
        assert_eq!(
            derive_property_name(PropertyNaming::Compound, "col1", Some("order code")),
            "col1_OrderCode"
        );
        assert_eq!(
            derive_property_name(PropertyNaming::Compound, "col1", Some("  ")),
            "col1"
        );
        assert_eq!(
            derive_property_name(PropertyNaming::CamelCase, "order_code", Some("ignored")),
            "orderCode"
        );
    }

    #[test]
    fn test_property_name_is_deterministic() {
        let first = derive_property_name(PropertyNaming::CamelCase, "gmt_create", None);
        for _ in 0..3 {
            assert_eq!(
                derive_property_name(PropertyNaming::CamelCase, "gmt_create", None),
                first
            );
        }
    }

    #[test]
    fn test_accessor_names() {
        assert_eq!(getter_name("orderCode", false), "getOrderCode");
        assert_eq!(getter_name("active", true), "isActive");
        assert_eq!(setter_name("xAxis"), "setxAxis");
        assert_eq!(setter_name("id"), "setId");
        assert_eq!(list_property_name("status"), "statusList");
    }

    #[test]
    fn test_java_keywords() {
        assert!(is_java_keyword("class"));
        assert!(is_java_keyword("default"));
        assert!(!is_java_keyword("status"));
    }
}
