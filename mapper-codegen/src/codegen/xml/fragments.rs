//! Reusable `<sql>` fragments and the result map

use crate::config::defaults;
use crate::dom::XmlElement;
use crate::model::{ColumnModel, FragmentId, TableModel};

/// `<include refid="..."/>`
pub fn include(fragment: FragmentId) -> XmlElement {
    XmlElement::new("include").attr("refid", fragment.as_str())
}

fn sql(fragment: FragmentId) -> XmlElement {
    XmlElement::new("sql").attr("id", fragment.as_str())
}

/// `<if test="path != null">text</if>`
fn if_present(path: &str, text: String) -> XmlElement {
    XmlElement::new("if")
        .attr("test", format!("{} != null", path))
        .text(text)
}

/// Use the supplied value when present, otherwise `fallback`
fn choose_default(path: &str, value: String, fallback: String) -> XmlElement {
    XmlElement::new("choose")
        .child(
            XmlElement::new("when")
                .attr("test", format!("{} != null", path))
                .text(value),
        )
        .child(XmlElement::new("otherwise").text(fallback))
}

/// Parameter bound to one element of a `<foreach>` over `item`
fn element_parameter(column: &ColumnModel) -> String {
    match &column.type_handler {
        Some(handler) => format!("#{{item,typeHandler={}}}", handler),
        None => "#{item}".to_string(),
    }
}

/// Value the database should get when a defaulted column is left null
fn default_value(table: &TableModel, column: &ColumnModel) -> Option<String> {
    if table.is_timestamp_column(column) {
        return Some(defaults::TIMESTAMP_DEFAULT.to_string());
    }
    if table.is_soft_delete_column(column) {
        return table.soft_delete().map(|s| s.alive_value.clone());
    }
    None
}

pub fn result_map(table: &TableModel) -> Option<XmlElement> {
    let mut element = XmlElement::new("resultMap")
        .attr("id", FragmentId::ResultMap.as_str())
        .attr("type", table.names().record_type.qualified_name());
    for column in table.columns() {
        let tag = if column.primary_key { "id" } else { "result" };
        let mut entry = XmlElement::new(tag)
            .attr("column", column.actual_name.as_str())
            .attr("jdbcType", column.jdbc_type.as_str())
            .attr("property", column.property.as_str());
        if let Some(handler) = &column.type_handler {
            entry = entry.attr("typeHandler", handler.as_str());
        }
        element.push(entry);
    }
    Some(element)
}

pub fn base_column(table: &TableModel) -> Option<XmlElement> {
    let names: Vec<String> = table.columns().iter().map(ColumnModel::escaped_name).collect();
    Some(sql(FragmentId::BaseColumn).text(names.join(", ")))
}

/// The filter predicate: the soft-delete predicate first, then one optional
/// predicate per filter column
pub fn query_condition(table: &TableModel) -> Option<XmlElement> {
    let mut element = sql(FragmentId::Qc);

    if let Some(soft_delete) = table.soft_delete() {
        if let Some(column) = table.column(&soft_delete.column) {
            element.push_text(format!(
                "{} = {}",
                column.escaped_name(),
                soft_delete.alive_value
            ));
        }
    }

    for field in table.query_fields() {
        let column = &field.column;
        if field.multi_value {
            element.push(
                XmlElement::new("if")
                    .attr(
                        "test",
                        format!("{0} != null and {0}.size() > 0", field.property),
                    )
                    .text(format!("and {} in", column.escaped_name()))
                    .child(
                        XmlElement::new("foreach")
                            .attr("collection", field.property.as_str())
                            .attr("item", "item")
                            .attr("open", "(")
                            .attr("close", ")")
                            .attr("separator", ",")
                            .text(element_parameter(column)),
                    ),
            );
        } else {
            element.push(if_present(
                &field.property,
                format!("and {} = {}", column.escaped_name(), column.parameter(None)),
            ));
        }
    }
    Some(element)
}

/// Assignments for single-row insert and update; a null modification
/// timestamp falls back to the database clock
pub fn set(table: &TableModel) -> Option<XmlElement> {
    let mut element = sql(FragmentId::Set);
    for column in table.insertable_columns() {
        let assign = |value: String| format!("{} = {},", column.escaped_name(), value);
        if table.is_modified_timestamp_column(column) {
            element.push(choose_default(
                &column.property_path(None),
                assign(column.parameter(None)),
                assign(defaults::TIMESTAMP_DEFAULT.to_string()),
            ));
        } else {
            element.push(if_present(
                &column.property_path(None),
                assign(column.parameter(None)),
            ));
        }
    }
    Some(element)
}

/// Assignments for one `item` of a batch update
pub fn batch_set(table: &TableModel) -> Option<XmlElement> {
    let mut element = sql(FragmentId::BatchSet);
    for column in table.insertable_columns() {
        element.push(if_present(
            &column.property_path(Some("item")),
            format!(
                "{} = {},",
                column.escaped_name(),
                column.parameter(Some("item"))
            ),
        ));
    }
    Some(element)
}

/// Value list for one `item` of a batch insert, in `insertable_columns` order
pub fn batch_set_value(table: &TableModel) -> Option<XmlElement> {
    let mut trim = XmlElement::new("trim").attr("suffixOverrides", ",");
    for column in table.insertable_columns() {
        let value = format!("{},", column.parameter(Some("item")));
        match default_value(table, column) {
            Some(fallback) => trim.push(choose_default(
                &column.property_path(Some("item")),
                value,
                format!("{},", fallback),
            )),
            None => trim.push_text(value),
        }
    }
    Some(sql(FragmentId::BatchSetValue).child(trim))
}

pub fn table_name(table: &TableModel) -> Option<XmlElement> {
    Some(sql(FragmentId::TableName).text(table.names().runtime_table.as_str()))
}

/// Only emitted when both paging fields are configured
pub fn page_limit(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().pagination {
        return None;
    }
    let spec = table.spec();
    let (offset, limit) = (spec.offset_field.as_deref()?, spec.limit_field.as_deref()?);
    Some(
        sql(FragmentId::PageLimit).child(
            XmlElement::new("if")
                .attr("test", format!("{} != null and {} != null", offset, limit))
                .text(format!("limit #{{{}}}, #{{{}}}", offset, limit)),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlNode;
    use crate::model::test_support::{orders_spec, orders_table, orders_table_with};

    fn texts(element: &XmlElement) -> Vec<&str> {
        element
            .children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_soft_delete_predicate_comes_first() {
        let qc = query_condition(&orders_table()).unwrap();
        assert_eq!(qc.children.len(), 3);
        assert_eq!(qc.children[0], XmlNode::Text("is_deleted = 0".into()));
        assert_eq!(
            texts(&qc).iter().filter(|t| t.contains("is_deleted")).count(),
            1
        );

        let first = qc.elements().next().unwrap();
        assert_eq!(first.attribute("test"), Some("orderCode != null"));
        assert_eq!(texts(first), vec!["and order_code = #{orderCode}"]);

        let second = qc.elements().nth(1).unwrap();
        assert_eq!(
            second.attribute("test"),
            Some("statusList != null and statusList.size() > 0")
        );
        assert_eq!(texts(second), vec!["and status in"]);
        let foreach = second.elements().next().unwrap();
        assert_eq!(foreach.attribute("collection"), Some("statusList"));
        assert_eq!(texts(foreach), vec!["#{item}"]);
    }

    #[test]
    fn test_no_soft_delete_predicate_when_unconfigured() {
        let mut spec = orders_spec();
        spec.soft_delete = None;
        let qc = query_condition(&orders_table_with(&spec)).unwrap();
        assert!(texts(&qc).is_empty());
    }

    #[test]
    fn test_page_limit_gating() {
        assert!(page_limit(&orders_table()).is_some());

        let mut spec = orders_spec();
        spec.limit_field = None;
        assert!(page_limit(&orders_table_with(&spec)).is_none());

        let mut spec = orders_spec();
        spec.offset_field = None;
        assert!(page_limit(&orders_table_with(&spec)).is_none());
    }

    #[test]
    fn test_page_limit_text() {
        let element = page_limit(&orders_table()).unwrap();
        let guard = element.elements().next().unwrap();
        assert_eq!(guard.attribute("test"), Some("offset != null and limit != null"));
        assert_eq!(texts(guard), vec!["limit #{offset}, #{limit}"]);
    }

    #[test]
    fn test_batch_set_value_defaults() {
        let mut spec = orders_spec();
        spec.gmt_create_column = Some("creator".into());
        let element = batch_set_value(&orders_table_with(&spec)).unwrap();
        let trim = element.elements().next().unwrap();

        // id is an identity column and never written
        assert_eq!(trim.children.len(), 4);
        assert_eq!(texts(trim), vec!["#{item.orderCode},", "#{item.status},"]);

        let chooses: Vec<&XmlElement> = trim.elements().collect();
        assert_eq!(chooses.len(), 2);
        let otherwise = |choose: &XmlElement| {
            let e = choose.elements().nth(1).unwrap();
            texts(e)[0].to_string()
        };
        assert_eq!(otherwise(chooses[0]), "0,");
        assert_eq!(otherwise(chooses[1]), "now(),");
        assert_eq!(
            chooses[0].elements().next().unwrap().attribute("test"),
            Some("item.isDeleted != null")
        );
    }

    #[test]
    fn test_set_defaults_modified_timestamp() {
        let mut spec = orders_spec();
        spec.gmt_modified_column = Some("creator".into());
        let element = set(&orders_table_with(&spec)).unwrap();
        let last = element.elements().last().unwrap();
        assert_eq!(last.name, "choose");
        assert_eq!(
            texts(last.elements().nth(1).unwrap()),
            vec!["creator = now(),"]
        );
        assert_eq!(element.elements().filter(|e| e.name == "if").count(), 3);
    }

    #[test]
    fn test_result_map_and_columns() {
        let table = orders_table();
        let map = result_map(&table).unwrap();
        assert_eq!(map.attribute("type"), Some("com.example.model.Orders"));
        let first = map.elements().next().unwrap();
        assert_eq!(first.name, "id");
        assert_eq!(first.attribute("jdbcType"), Some("BIGINT"));
        assert_eq!(map.elements().filter(|e| e.name == "result").count(), 4);

        let columns = base_column(&table).unwrap();
        assert_eq!(texts(&columns), vec!["id, order_code, status, is_deleted, creator"]);
        assert_eq!(texts(&table_name(&table).unwrap()), vec!["orders"]);
    }
}
