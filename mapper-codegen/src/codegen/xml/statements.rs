//! Mapped statements: selects, inserts and updates

use crate::dom::XmlElement;
use crate::model::{FragmentId, TableModel};

use super::fragments::include;

const LIST_TYPE: &str = "java.util.List";

fn where_qc() -> XmlElement {
    XmlElement::new("where").child(include(FragmentId::Qc))
}

fn set_of(fragment: FragmentId) -> XmlElement {
    XmlElement::new("set").child(include(fragment))
}

/// `id = #{id} and ...` over every key column
fn key_predicate(table: &TableModel, prefix: Option<&str>) -> String {
    let keys: Vec<String> = table
        .primary_key_columns()
        .iter()
        .map(|c| format!("{} = {}", c.escaped_name(), c.parameter(prefix)))
        .collect();
    format!("where {}", keys.join(" and "))
}

/// `select <columns> from <table> <where>`
fn select_from(id: FragmentId, table: &TableModel) -> XmlElement {
    XmlElement::new("select")
        .attr("id", id.as_str())
        .attr("parameterType", table.names().query_type.qualified_name())
        .attr("resultMap", FragmentId::ResultMap.as_str())
        .text("select")
        .child(include(FragmentId::BaseColumn))
        .text("from")
        .child(include(FragmentId::TableName))
        .child(where_qc())
}

/// Filtered select: predicate, then ordering, then paging
pub fn list(table: &TableModel) -> Option<XmlElement> {
    let rules = table.rules();
    if !rules.list {
        return None;
    }
    let mut element = select_from(FragmentId::List, table);
    let order_by = table.spec().order_by_field.as_ref().filter(|_| rules.order_by);
    if let Some(order_by) = order_by {
        element.push(
            XmlElement::new("if")
                .attr("test", format!("{} != null", order_by))
                .text(format!("order by ${{{}}}", order_by)),
        );
    }
    if rules.pagination {
        element.push(include(FragmentId::PageLimit));
    }
    Some(element)
}

pub fn get_by_qc(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().get_by_qc {
        return None;
    }
    Some(select_from(FragmentId::GetByQc, table).text("limit 1"))
}

pub fn count(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().count {
        return None;
    }
    Some(
        XmlElement::new("select")
            .attr("id", FragmentId::Count.as_str())
            .attr("parameterType", table.names().query_type.qualified_name())
            .attr("resultType", "java.lang.Long")
            .text("select count(1)")
            .text("from")
            .child(include(FragmentId::TableName))
            .child(where_qc()),
    )
}

/// Generated-key attributes or `<selectKey>` for an insert statement
fn with_generated_key(mut element: XmlElement, table: &TableModel, batch: bool) -> XmlElement {
    let (Some(key), Some(column)) = (&table.spec().generated_key, table.generated_key_column())
    else {
        return element;
    };
    if key.is_jdbc_standard() {
        return element
            .attr("useGeneratedKeys", "true")
            .attr("keyProperty", column.property.as_str());
    }
    if batch {
        // selectKey runs once per statement, not per row
        return element;
    }
    let order = if key.runs_after_insert() { "AFTER" } else { "BEFORE" };
    let select_key = XmlElement::new("selectKey")
        .attr("keyProperty", column.property.as_str())
        .attr("order", order)
        .attr("resultType", column.java_type.qualified_name())
        .text(key.resolved_statement());
    element.children.insert(0, crate::dom::XmlNode::Element(select_key));
    element
}

pub fn insert(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().insert {
        return None;
    }
    let element = XmlElement::new("insert")
        .attr("id", FragmentId::Insert.as_str())
        .attr("parameterType", table.names().record_type.qualified_name());
    let element = with_generated_key(element, table, false)
        .text("insert into")
        .child(include(FragmentId::TableName))
        .child(set_of(FragmentId::Set));
    Some(element)
}

pub fn batch_insert(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().batch_insert {
        return None;
    }
    let columns: Vec<String> = table.insertable_columns().map(|c| c.escaped_name()).collect();
    let element = XmlElement::new("insert")
        .attr("id", FragmentId::BatchInsert.as_str())
        .attr("parameterType", LIST_TYPE);
    let element = with_generated_key(element, table, true)
        .text("insert into")
        .child(include(FragmentId::TableName))
        .text(format!("({})", columns.join(", ")))
        .text("values")
        .child(
            XmlElement::new("foreach")
                .attr("collection", "list")
                .attr("item", "item")
                .attr("index", "index")
                .attr("separator", ",")
                .text("(")
                .child(include(FragmentId::BatchSetValue))
                .text(")"),
        );
    Some(element)
}

pub fn update(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().update {
        return None;
    }
    Some(
        XmlElement::new("update")
            .attr("id", FragmentId::Update.as_str())
            .attr("parameterType", table.names().record_type.qualified_name())
            .text("update")
            .child(include(FragmentId::TableName))
            .child(set_of(FragmentId::Set))
            .text(key_predicate(table, None)),
    )
}

/// One update per element, separated by `;`
pub fn batch_update(table: &TableModel) -> Option<XmlElement> {
    if !table.rules().batch_update {
        return None;
    }
    Some(
        XmlElement::new("update")
            .attr("id", FragmentId::BatchUpdate.as_str())
            .attr("parameterType", LIST_TYPE)
            .child(
                XmlElement::new("foreach")
                    .attr("collection", "list")
                    .attr("item", "item")
                    .attr("index", "index")
                    .attr("separator", ";")
                    .text("update")
                    .child(include(FragmentId::TableName))
                    .child(set_of(FragmentId::BatchSet))
                    .text(key_predicate(table, Some("item"))),
            ),
    )
}
