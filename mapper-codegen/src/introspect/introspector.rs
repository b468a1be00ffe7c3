//! Turn raw metadata rows into table models

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{CodegenConfig, Renamer, TableSpec};
use crate::context::RunContext;
use crate::dom::JavaType;
use crate::error::Result;
use crate::model::{ColumnModel, KeyGeneration, TableModel};
use crate::parser::{DatabaseMetadata, JdbcType, RawColumn, TableRef};

use super::naming;
use super::type_resolver::{JavaTypeResolver, ResolvedType};

/// Resolves configured tables against a metadata source
pub struct Introspector<'a> {
    config: &'a CodegenConfig,
    metadata: &'a dyn DatabaseMetadata,
    resolver: JavaTypeResolver,
}

impl<'a> Introspector<'a> {
    pub fn new(config: &'a CodegenConfig, metadata: &'a dyn DatabaseMetadata) -> Self {
        Self {
            config,
            metadata,
            resolver: JavaTypeResolver::new(config.force_big_decimals, config.use_java_time),
        }
    }

    /// Build one model per physical table matching `spec`.
    /// Degraded lookups become warnings; only configuration errors fail.
    pub fn introspect(&self, spec: &TableSpec, ctx: &mut RunContext) -> Result<Vec<TableModel>> {
        let rows = match self.metadata.columns(
            spec.catalog.as_deref(),
            spec.schema.as_deref(),
            &|name| spec.matches_table(name),
        ) {
            Ok(rows) => rows,
            Err(e) => {
                ctx.warn(format!(
                    "Cannot read columns for table {}: {}",
                    describe(spec),
                    e
                ));
                return Ok(Vec::new());
            }
        };

        let mut by_table: BTreeMap<TableRef, Vec<RawColumn>> = BTreeMap::new();
        for row in rows {
            by_table.entry(row.table.clone()).or_default().push(row);
        }

        if by_table.is_empty() {
            ctx.warn(format!(
                "Table configuration {} did not resolve to any tables",
                describe(spec)
            ));
            return Ok(Vec::new());
        }

        if by_table.len() > 1 && !spec.has_wildcard() {
            let names: Vec<String> = by_table.keys().map(TableRef::to_string).collect();
            ctx.warn(format!(
                "Table configuration {} matched more than one table ({})",
                describe(spec),
                names.join(", ")
            ));
        }

        let mut models = Vec::new();
        for (table, rows) in by_table {
            if let Some(model) = self.build_table(spec, table, rows, ctx)? {
                models.push(model);
            }
        }
        Ok(models)
    }

    fn build_table(
        &self,
        spec: &TableSpec,
        table: TableRef,
        rows: Vec<RawColumn>,
        ctx: &mut RunContext,
    ) -> Result<Option<TableModel>> {
        debug!("Introspecting table {} ({} columns)", table, rows.len());
        let renamer = match &spec.column_renaming_rule {
            Some(rule) => Some(rule.compile()?),
            None => None,
        };

        for ignored in &spec.ignored_columns {
            if !rows.iter().any(|r| ignored.matches(&r.name)) {
                ctx.warn(format!(
                    "Column {}, specified as ignored in table {}, does not exist in the table",
                    ignored.column, table
                ));
            }
        }
        for column_override in &spec.column_overrides {
            if !rows.iter().any(|r| column_override.matches(&r.name)) {
                ctx.warn(format!(
                    "Column {}, specified as an override in table {}, does not exist in the table",
                    column_override.column, table
                ));
            }
        }
        if let Some(key) = &spec.generated_key {
            if !rows.iter().any(|r| key.matches(&r.name)) {
                ctx.warn(format!(
                    "Column {}, specified as the generated key in table {}, does not exist in the table",
                    key.column, table
                ));
            }
        }

        let ignores = spec.ignore_rules()?;
        let mut columns = Vec::new();
        for row in rows.iter().filter(|r| !ignores.is_ignored(&r.name)) {
            columns.push(self.resolve_column(spec, &table, row, renamer.as_ref(), ctx));
        }
        warn_unresolved_roles(spec, &table, &columns, ctx);

        match self.metadata.primary_keys(&table) {
            Ok(keys) => {
                for key in keys {
                    if let Some(column) = columns
                        .iter_mut()
                        .find(|c| c.actual_name.eq_ignore_ascii_case(&key.column))
                    {
                        column.primary_key = true;
                        column.key_seq = key.key_seq;
                    }
                }
            }
            Err(e) => ctx.warn(format!(
                "Cannot read primary key for table {}: {}",
                table, e
            )),
        }

        let remarks = match self.metadata.table_remarks(&table) {
            Ok(remarks) => remarks,
            Err(e) => {
                ctx.warn(format!("Cannot read remarks for table {}: {}", table, e));
                None
            }
        };

        if columns.is_empty() {
            ctx.warn(format!(
                "Table {} has no columns left after ignored columns were removed, it will be skipped",
                table
            ));
            return Ok(None);
        }

        let has_primary_key = columns.iter().any(|c| c.primary_key);
        let has_base_columns = columns.iter().any(|c| !c.large_object);
        if !has_primary_key && !has_base_columns {
            ctx.warn(format!(
                "Table {} contains only large object columns and has no primary key, it will be skipped",
                table
            ));
            return Ok(None);
        }

        for column in &columns {
            if naming::is_java_keyword(&column.property) {
                ctx.warn(format!(
                    "Column {} in table {} maps to the Java reserved word \"{}\"; add a column override",
                    column.actual_name, table, column.property
                ));
            }
        }

        TableModel::new(table, spec, self.config, columns, remarks).map(Some)
    }

    fn resolve_column(
        &self,
        spec: &TableSpec,
        table: &TableRef,
        row: &RawColumn,
        renamer: Option<&Renamer>,
        ctx: &mut RunContext,
    ) -> ColumnModel {
        let column_override = spec.override_for(&row.name);

        let renamed = renamer
            .map(|r| r.apply(&row.name))
            .unwrap_or_else(|| row.name.clone());
        let property = column_override
            .and_then(|o| o.property.clone())
            .unwrap_or_else(|| {
                naming::derive_property_name(spec.property_naming, &renamed, row.remarks.as_deref())
            });

        let resolved = match self.resolver.resolve(row) {
            Some(resolved) => resolved,
            None => {
                if column_override.and_then(|o| o.java_type.as_ref()).is_none() {
                    ctx.warn(format!(
                        "Unsupported data type {} in column {} of table {}; property {} will be java.lang.Object",
                        row.type_name, row.name, table, property
                    ));
                }
                ResolvedType::untyped()
            }
        };

        let java_type = column_override
            .and_then(|o| o.java_type.as_deref())
            .map(JavaType::new)
            .unwrap_or(resolved.java_type);
        let jdbc_type = column_override
            .and_then(|o| o.jdbc_type.clone())
            .unwrap_or(resolved.jdbc_type)
            .to_ascii_uppercase();
        let large_object = JdbcType::from_name(&jdbc_type)
            .map(JdbcType::is_large_object)
            .unwrap_or(false);

        let key_generation = match &spec.generated_key {
            Some(key) if key.matches(&row.name) => {
                if key.is_identity() {
                    KeyGeneration::Identity
                } else {
                    KeyGeneration::Sequence
                }
            }
            _ => KeyGeneration::None,
        };

        ColumnModel {
            actual_name: row.name.clone(),
            property,
            java_type,
            jdbc_type,
            nullable: row.nullable,
            primary_key: false,
            key_seq: 0,
            large_object,
            key_generation,
            generated_always: row.generated
                || column_override.map(|o| o.generated_always).unwrap_or(false),
            type_handler: column_override.and_then(|o| o.type_handler.clone()),
            properties: column_override
                .map(|o| o.properties.clone())
                .unwrap_or_default(),
            remarks: row.remarks.clone(),
            default_value: row.default_value.clone(),
            length: row.size,
            scale: row.scale,
            delimited: column_override.map(|o| o.delimited).unwrap_or(false),
        }
    }
}

/// Columns named by filters, soft delete or timestamp settings must survive
/// ignore rules; otherwise the predicate or default they drive is not generated
fn warn_unresolved_roles(
    spec: &TableSpec,
    table: &TableRef,
    columns: &[ColumnModel],
    ctx: &mut RunContext,
) {
    let mut roles: Vec<(&str, &str)> = spec
        .filters
        .iter()
        .map(|f| (f.column.as_str(), "a filter"))
        .collect();
    if let Some(soft_delete) = &spec.soft_delete {
        roles.push((soft_delete.column.as_str(), "the soft-delete column"));
    }
    if let Some(column) = &spec.gmt_create_column {
        roles.push((column.as_str(), "the creation timestamp column"));
    }
    if let Some(column) = &spec.gmt_modified_column {
        roles.push((column.as_str(), "the modification timestamp column"));
    }

    for (name, role) in roles {
        if !columns.iter().any(|c| c.actual_name.eq_ignore_ascii_case(name)) {
            ctx.warn(format!(
                "Column {}, specified as {} in table {}, does not exist in the table or is ignored; it will not be generated",
                name, role, table
            ));
        }
    }
}

fn describe(spec: &TableSpec) -> String {
    format!(
        "catalog {}, schema {}, table {}",
        spec.catalog.as_deref().unwrap_or("<none>"),
        spec.schema.as_deref().unwrap_or("<none>"),
        spec.table_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ColumnOverride, FilterColumn, GeneratedKey, IgnoredColumn, RenamingRule, SoftDelete,
    };
    use crate::error::CodegenError;
    use crate::parser::{DdlMetadata, PrimaryKeyColumn};

    const SCHEMA: &str = r#"
        CREATE TABLE orders (
            id BIGINT NOT NULL AUTO_INCREMENT,
            order_code VARCHAR(64) NOT NULL,
            status INT,
            is_deleted TINYINT NOT NULL DEFAULT 0,
            creator VARCHAR(32),
            shape GEOMETRY,
            PRIMARY KEY (id)
        );
        CREATE TABLE order_lines (
            order_id BIGINT NOT NULL,
            line_no INT NOT NULL,
            PRIMARY KEY (line_no, order_id)
        );
        CREATE TABLE blobs (
            payload LONGBLOB,
            notes TEXT
        );
    "#;

    fn run(spec: &TableSpec) -> (Vec<TableModel>, Vec<String>) {
        let metadata = DdlMetadata::parse(SCHEMA).unwrap();
        let config = CodegenConfig::default();
        let mut ctx = RunContext::default();
        let models = Introspector::new(&config, &metadata)
            .introspect(spec, &mut ctx)
            .unwrap();
        (models, ctx.into_warnings())
    }

    #[test]
    fn test_columns_resolved() {
        let mut spec = TableSpec::new("orders");
        spec.ignored_columns.push(IgnoredColumn {
            column: "shape".into(),
            delimited: false,
        });
        let (models, warnings) = run(&spec);
        assert!(warnings.is_empty(), "{:?}", warnings);
        let table = &models[0];
        let props: Vec<&str> = table.columns().iter().map(|c| c.property.as_str()).collect();
        assert_eq!(props, vec!["id", "orderCode", "status", "isDeleted", "creator"]);
        assert_eq!(table.primary_key_columns()[0].actual_name, "id");
        assert_eq!(table.column("is_deleted").unwrap().java_type.qualified_name(), "java.lang.Integer");
    }

    #[test]
    fn test_unmapped_type_warns_and_falls_back() {
        let (models, warnings) = run(&TableSpec::new("orders"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("GEOMETRY"));
        let shape = models[0].column("shape").unwrap();
        assert_eq!(shape.java_type.qualified_name(), "java.lang.Object");
        assert_eq!(shape.jdbc_type, "OTHER");
    }

    #[test]
    fn test_override_suppresses_type_warning() {
        let mut spec = TableSpec::new("orders");
        spec.column_overrides.push(ColumnOverride {
            column: "SHAPE".into(),
            property: Some("area".into()),
            java_type: Some("com.example.Shape".into()),
            type_handler: Some("com.example.ShapeHandler".into()),
            ..Default::default()
        });
        let (models, warnings) = run(&spec);
        assert!(warnings.is_empty(), "{:?}", warnings);
        let shape = models[0].column("shape").unwrap();
        assert_eq!(shape.property, "area");
        assert_eq!(shape.java_type.qualified_name(), "com.example.Shape");
        assert_eq!(shape.type_handler.as_deref(), Some("com.example.ShapeHandler"));
    }

    #[test]
    fn test_generated_key_marks_identity() {
        let mut spec = TableSpec::new("orders");
        spec.generated_key = Some(GeneratedKey {
            column: "ID".into(),
            statement: "MySql".into(),
            identity: true,
            timing: None,
            delimited: false,
        });
        let (models, _) = run(&spec);
        let id = models[0].column("id").unwrap();
        assert_eq!(id.key_generation, KeyGeneration::Identity);
        assert!(!models[0].insertable_columns().any(|c| c.actual_name == "id"));

        spec.generated_key = Some(GeneratedKey {
            column: "ID".into(),
            statement: "select seq.nextval".into(),
            identity: false,
            timing: None,
            delimited: true,
        });
        let (models, warnings) = run(&spec);
        assert_eq!(models[0].column("id").unwrap().key_generation, KeyGeneration::None);
        assert!(warnings.iter().any(|w| w.contains("generated key")));
    }

    #[test]
    fn test_column_renaming() {
        let mut spec = TableSpec::new("orders");
        spec.column_renaming_rule = Some(RenamingRule {
            search: "^order_".into(),
            replace: String::new(),
        });
        let (models, _) = run(&spec);
        assert_eq!(models[0].column("order_code").unwrap().property, "code");
    }

    #[test]
    fn test_composite_key_order() {
        let (models, warnings) = run(&TableSpec::new("order_lines"));
        assert!(warnings.is_empty());
        let keys: Vec<&str> = models[0]
            .primary_key_columns()
            .iter()
            .map(|c| c.actual_name.as_str())
            .collect();
        assert_eq!(keys, vec!["line_no", "order_id"]);
    }

    #[test]
    fn test_large_object_only_table_dropped() {
        let (models, warnings) = run(&TableSpec::new("blobs"));
        assert!(models.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("only large object columns"));
    }

    #[test]
    fn test_missing_table_warns() {
        let (models, warnings) = run(&TableSpec::new("nope"));
        assert!(models.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("did not resolve"));
    }

    #[test]
    fn test_drift_warnings() {
        let mut spec = TableSpec::new("order_lines");
        spec.ignored_columns.push(IgnoredColumn {
            column: "gone".into(),
            delimited: false,
        });
        spec.column_overrides.push(ColumnOverride {
            column: "also_gone".into(),
            ..Default::default()
        });
        let (models, warnings) = run(&spec);
        assert_eq!(models.len(), 1);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_unresolved_role_columns_warn() {
        let mut spec = TableSpec::new("orders");
        spec.ignored_columns.push(IgnoredColumn {
            column: "shape".into(),
            delimited: false,
        });
        spec.ignored_columns.push(IgnoredColumn {
            column: "creator".into(),
            delimited: false,
        });
        spec.filters.push(FilterColumn {
            column: "STATUS".into(),
            multi_value: true,
        });
        spec.filters.push(FilterColumn {
            column: "creator".into(),
            multi_value: false,
        });
        spec.soft_delete = Some(SoftDelete {
            column: "is_deletd".into(),
            alive_value: "0".into(),
        });
        spec.gmt_modified_column = Some("gmt_modified".into());

        let (models, warnings) = run(&spec);
        assert_eq!(models.len(), 1);
        assert_eq!(warnings.len(), 3, "{:?}", warnings);
        assert!(warnings[0].contains("creator") && warnings[0].contains("a filter"));
        assert!(warnings[1].contains("is_deletd") && warnings[1].contains("soft-delete"));
        assert!(warnings[2].contains("modification timestamp"));
    }

    #[test]
    fn test_ambiguous_match_without_wildcard() {
        let mut spec = TableSpec::new("ORDERS");
        spec.wildcard_escaping = true;
        let (models, warnings) = run(&spec);
        assert_eq!(models.len(), 1);
        assert!(warnings.iter().all(|w| !w.contains("more than one")));

        // `_` is a wildcard, so matching several tables is expected
        let (models, warnings) = run(&TableSpec::new("order_%"));
        assert_eq!(models.len(), 2);
        assert!(warnings.iter().all(|w| !w.contains("more than one")));
    }

    struct FlakyMetadata(DdlMetadata);

    impl DatabaseMetadata for FlakyMetadata {
        fn columns(
            &self,
            catalog: Option<&str>,
            schema: Option<&str>,
            table_filter: &dyn Fn(&str) -> bool,
        ) -> Result<Vec<RawColumn>> {
            self.0.columns(catalog, schema, table_filter)
        }

        fn primary_keys(&self, table: &TableRef) -> Result<Vec<PrimaryKeyColumn>> {
            self.0.primary_keys(table)
        }

        fn table_remarks(&self, _table: &TableRef) -> Result<Option<String>> {
            Err(CodegenError::MetadataError("remarks unavailable".into()))
        }
    }

    #[test]
    fn test_remarks_failure_is_a_warning() {
        let metadata = FlakyMetadata(DdlMetadata::parse(SCHEMA).unwrap());
        let config = CodegenConfig::default();
        let mut ctx = RunContext::default();
        let models = Introspector::new(&config, &metadata)
            .introspect(&TableSpec::new("order_lines"), &mut ctx)
            .unwrap();
        assert_eq!(models.len(), 1);
        assert!(models[0].remarks().is_none());
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn test_ambiguous_physical_tables_warn() {
        let sql = "CREATE TABLE a.items (id INT PRIMARY KEY); CREATE TABLE b.items (id INT PRIMARY KEY);";
        let metadata = DdlMetadata::parse(sql).unwrap();
        let config = CodegenConfig::default();
        let mut ctx = RunContext::default();
        let models = Introspector::new(&config, &metadata)
            .introspect(&TableSpec::new("items"), &mut ctx)
            .unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].contains("more than one table"));
    }
}
