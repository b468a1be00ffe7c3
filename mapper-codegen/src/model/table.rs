//! Table model: the aggregate every generator reads

use crate::config::{defaults, CodegenConfig, SoftDelete, TableSpec};
use crate::dom::JavaType;
use crate::error::Result;
use crate::introspect::naming;
use crate::parser::TableRef;

use super::column::{ColumnModel, KeyGeneration};

/// Ids of the mapper XML fragments, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentId {
    ResultMap,
    BaseColumn,
    Qc,
    Set,
    BatchSet,
    BatchSetValue,
    TableName,
    PageLimit,
    List,
    GetByQc,
    Count,
    Insert,
    BatchInsert,
    Update,
    BatchUpdate,
}

impl FragmentId {
    pub const ALL: [FragmentId; 15] = [
        FragmentId::ResultMap,
        FragmentId::BaseColumn,
        FragmentId::Qc,
        FragmentId::Set,
        FragmentId::BatchSet,
        FragmentId::BatchSetValue,
        FragmentId::TableName,
        FragmentId::PageLimit,
        FragmentId::List,
        FragmentId::GetByQc,
        FragmentId::Count,
        FragmentId::Insert,
        FragmentId::BatchInsert,
        FragmentId::Update,
        FragmentId::BatchUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FragmentId::ResultMap => "BaseResultMap",
            FragmentId::BaseColumn => "baseColumn",
            FragmentId::Qc => "qc",
            FragmentId::Set => "set",
            FragmentId::BatchSet => "batchSet",
            FragmentId::BatchSetValue => "batchSetValue",
            FragmentId::TableName => "tableName",
            FragmentId::PageLimit => "page-limit",
            FragmentId::List => "list",
            FragmentId::GetByQc => "getByQc",
            FragmentId::Count => "count",
            FragmentId::Insert => "insert",
            FragmentId::BatchInsert => "batchInsert",
            FragmentId::Update => "update",
            FragmentId::BatchUpdate => "batchUpdate",
        }
    }
}

/// Names derived once per table
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactNames {
    pub domain_object: String,
    pub record_type: JavaType,
    pub query_type: JavaType,
    pub mapper_type: JavaType,
    /// Mapper XML namespace, the qualified mapper interface name
    pub namespace: String,
    pub sqlmap_file: String,
    /// Table name as written into SQL
    pub runtime_table: String,
}

/// Which optional statements and clauses apply to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub insert: bool,
    pub batch_insert: bool,
    pub count: bool,
    pub get_by_qc: bool,
    pub list: bool,
    pub update: bool,
    pub batch_update: bool,
    pub order_by: bool,
    pub pagination: bool,
}

impl Rules {
    fn new(spec: &TableSpec, has_primary_key: bool) -> Self {
        Self {
            insert: spec.enable_insert,
            batch_insert: spec.enable_batch_insert,
            count: spec.enable_count,
            get_by_qc: spec.enable_get_by_qc,
            list: spec.enable_list,
            update: spec.enable_update && has_primary_key,
            batch_update: spec.enable_batch_update && has_primary_key,
            order_by: spec.order_by_field.is_some(),
            pagination: spec.pagination_enabled(),
        }
    }
}

/// One property of the query-condition record
#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    pub column: ColumnModel,
    /// `status`, or `statusList` for multi-value filters
    pub property: String,
    /// `T`, or `List<T>` for multi-value filters
    pub java_type: JavaType,
    pub multi_value: bool,
}

/// Aggregate root for one physical table
#[derive(Debug, Clone)]
pub struct TableModel {
    table: TableRef,
    remarks: Option<String>,
    columns: Vec<ColumnModel>,
    query_fields: Vec<QueryField>,
    names: ArtifactNames,
    rules: Rules,
    spec: TableSpec,
}

impl TableModel {
    /// Freeze resolved columns into a model; names are computed here and never again
    pub fn new(
        table: TableRef,
        spec: &TableSpec,
        config: &CodegenConfig,
        columns: Vec<ColumnModel>,
        remarks: Option<String>,
    ) -> Result<Self> {
        let mut domain_object = spec
            .domain_object_name
            .clone()
            .unwrap_or_else(|| naming::to_domain_object_name(&table.name));
        if let Some(rule) = &spec.domain_object_renaming_rule {
            domain_object = rule.compile()?.apply(&domain_object);
        }

        let mapper_name = format!(
            "{}.{}{}",
            config.client_package,
            domain_object,
            defaults::MAPPER_SUFFIX
        );
        let names = ArtifactNames {
            record_type: JavaType::new(format!("{}.{}", config.model_package, domain_object)),
            query_type: JavaType::new(format!(
                "{}.{}{}",
                config.query_package,
                domain_object,
                defaults::QUERY_SUFFIX
            )),
            mapper_type: JavaType::new(mapper_name.clone()),
            namespace: mapper_name,
            sqlmap_file: format!("{}{}.xml", domain_object, defaults::MAPPER_SUFFIX),
            runtime_table: table.runtime_name(spec.delimit_identifiers),
            domain_object,
        };

        let has_primary_key = columns.iter().any(|c| c.primary_key);
        let rules = Rules::new(spec, has_primary_key);
        let query_fields = query_fields(spec, &columns);

        Ok(Self {
            table,
            remarks,
            columns,
            query_fields,
            names,
            rules,
            spec: spec.clone(),
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn names(&self) -> &ArtifactNames {
        &self.names
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// All columns in table order
    pub fn columns(&self) -> &[ColumnModel] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns
            .iter()
            .find(|c| c.actual_name.eq_ignore_ascii_case(name))
    }

    /// Key columns in key order
    pub fn primary_key_columns(&self) -> Vec<&ColumnModel> {
        let mut keys: Vec<&ColumnModel> = self.columns.iter().filter(|c| c.primary_key).collect();
        keys.sort_by_key(|c| c.key_seq);
        keys
    }

    /// Non-key, non-large-object columns
    pub fn base_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.columns
            .iter()
            .filter(|c| !c.primary_key && !c.large_object)
    }

    pub fn large_object_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.columns.iter().filter(|c| c.large_object)
    }

    /// Columns written explicitly by insert/update statements
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.columns.iter().filter(|c| !c.is_generated())
    }

    /// Column named by the generated-key descriptor
    pub fn generated_key_column(&self) -> Option<&ColumnModel> {
        self.columns
            .iter()
            .find(|c| c.key_generation != KeyGeneration::None)
    }

    pub fn query_fields(&self) -> &[QueryField] {
        &self.query_fields
    }

    pub fn soft_delete(&self) -> Option<&SoftDelete> {
        self.spec.soft_delete.as_ref()
    }

    pub fn is_soft_delete_column(&self, column: &ColumnModel) -> bool {
        self.soft_delete()
            .map(|s| s.column.eq_ignore_ascii_case(&column.actual_name))
            .unwrap_or(false)
    }

    /// Creation or modification timestamp column
    pub fn is_timestamp_column(&self, column: &ColumnModel) -> bool {
        [&self.spec.gmt_create_column, &self.spec.gmt_modified_column]
            .into_iter()
            .flatten()
            .any(|c| c.eq_ignore_ascii_case(&column.actual_name))
    }

    pub fn is_modified_timestamp_column(&self, column: &ColumnModel) -> bool {
        self.spec
            .gmt_modified_column
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(&column.actual_name))
            .unwrap_or(false)
    }
}

/// Configured filter columns, or every column when none are configured.
/// The soft-delete column is always predicated unconditionally, so it never
/// becomes an optional filter.
fn query_fields(spec: &TableSpec, columns: &[ColumnModel]) -> Vec<QueryField> {
    let is_soft_delete = |c: &ColumnModel| {
        spec.soft_delete
            .as_ref()
            .map(|s| s.column.eq_ignore_ascii_case(&c.actual_name))
            .unwrap_or(false)
    };

    let selected: Vec<(&ColumnModel, bool)> = if spec.filters.is_empty() {
        columns.iter().map(|c| (c, false)).collect()
    } else {
        // unresolved filters were already reported by the introspector
        spec.filters
            .iter()
            .filter_map(|f| {
                columns
                    .iter()
                    .find(|c| c.actual_name.eq_ignore_ascii_case(&f.column))
                    .map(|c| (c, f.multi_value))
            })
            .collect()
    };

    selected
        .into_iter()
        .filter(|(c, _)| !is_soft_delete(c))
        .map(|(c, multi_value)| {
            if multi_value {
                QueryField {
                    column: c.clone(),
                    property: naming::list_property_name(&c.property),
                    java_type: JavaType::list_of(c.java_type.clone()),
                    multi_value,
                }
            } else {
                QueryField {
                    column: c.clone(),
                    property: c.property.clone(),
                    java_type: c.java_type.clone(),
                    multi_value,
                }
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{FilterColumn, GeneratedKey, SoftDelete};
    use crate::model::column::test_support::column;

    /// The `orders` table: id PK, order_code, status, is_deleted, creator
    pub fn orders_spec() -> TableSpec {
        let mut spec = TableSpec::new("orders");
        spec.soft_delete = Some(SoftDelete {
            column: "is_deleted".into(),
            alive_value: "0".into(),
        });
        spec.filters = vec![
            FilterColumn {
                column: "order_code".into(),
                multi_value: false,
            },
            FilterColumn {
                column: "status".into(),
                multi_value: true,
            },
        ];
        spec.offset_field = Some("offset".into());
        spec.limit_field = Some("limit".into());
        spec.generated_key = Some(GeneratedKey {
            column: "id".into(),
            statement: "JDBC".into(),
            identity: true,
            timing: None,
            delimited: false,
        });
        spec
    }

    pub fn orders_columns() -> Vec<ColumnModel> {
        let mut id = column("id");
        id.java_type = JavaType::new("java.lang.Long");
        id.jdbc_type = "BIGINT".into();
        id.primary_key = true;
        id.key_seq = 1;
        id.nullable = false;
        id.key_generation = KeyGeneration::Identity;

        let mut status = column("status");
        status.java_type = JavaType::new("java.lang.Integer");
        status.jdbc_type = "INTEGER".into();

        let mut is_deleted = column("is_deleted");
        is_deleted.java_type = JavaType::new("java.lang.Integer");
        is_deleted.jdbc_type = "TINYINT".into();

        vec![id, column("order_code"), status, is_deleted, column("creator")]
    }

    pub fn orders_table_with(spec: &TableSpec) -> TableModel {
        TableModel::new(
            TableRef::new("orders"),
            spec,
            &CodegenConfig::default(),
            orders_columns(),
            Some("customer orders".into()),
        )
        .unwrap()
    }

    pub fn orders_table() -> TableModel {
        orders_table_with(&orders_spec())
    }
}
