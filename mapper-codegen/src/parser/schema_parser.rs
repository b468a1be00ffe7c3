//! DDL-backed metadata source using sqlparser-rs

use std::path::Path;

use sqlparser::ast::{
    ColumnOption, CommentDef, CreateTable, CreateTableOptions, Expr, Ident, IndexColumn,
    ObjectName, PrimaryKeyConstraint, SqlOption, Statement, TableConstraint,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::jdbc::mysql_type_code;
use super::metadata::*;
use crate::error::{CodegenError, Result};

/// One `CREATE TABLE` statement, flattened into metadata rows
#[derive(Debug, Clone)]
pub struct DdlTable {
    pub table: TableRef,
    pub columns: Vec<RawColumn>,
    pub primary_key: Vec<String>,
    pub remarks: Option<String>,
}

/// Metadata source answering lookups from parsed MySQL DDL
#[derive(Debug, Clone, Default)]
pub struct DdlMetadata {
    tables: Vec<DdlTable>,
}

impl DdlMetadata {
    /// Parse a SQL schema string
    pub fn parse(sql: &str) -> Result<Self> {
        let dialect = MySqlDialect {};
        let statements = Parser::parse_sql(&dialect, sql)?;

        let mut tables = Vec::new();
        for stmt in statements {
            if let Statement::CreateTable(create_table) = stmt {
                let table = extract_table(&create_table)?;
                debug!(
                    "Parsed table {} ({} columns)",
                    table.table,
                    table.columns.len()
                );
                tables.push(table);
            }
        }

        Ok(Self { tables })
    }

    /// Read and parse a schema file
    pub fn from_file(path: &Path) -> Result<Self> {
        let sql = std::fs::read_to_string(path)?;
        Self::parse(&sql)
    }

    pub fn tables(&self) -> &[DdlTable] {
        &self.tables
    }

    fn find(&self, table: &TableRef) -> Result<&DdlTable> {
        self.tables
            .iter()
            .find(|t| &t.table == table)
            .ok_or_else(|| CodegenError::MetadataError(format!("table {} not found", table)))
    }
}

impl DatabaseMetadata for DdlMetadata {
    fn columns(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<RawColumn>> {
        let qualifier_matches = |wanted: Option<&str>, actual: &Option<String>| match (wanted, actual)
        {
            (Some(w), Some(a)) => w.eq_ignore_ascii_case(a),
            _ => true,
        };

        Ok(self
            .tables
            .iter()
            .filter(|t| qualifier_matches(catalog, &t.table.catalog))
            .filter(|t| qualifier_matches(schema, &t.table.schema))
            .filter(|t| table_filter(&t.table.name))
            .flat_map(|t| t.columns.iter().cloned())
            .collect())
    }

    fn primary_keys(&self, table: &TableRef) -> Result<Vec<PrimaryKeyColumn>> {
        let table = self.find(table)?;
        Ok(table
            .primary_key
            .iter()
            .enumerate()
            .map(|(i, column)| PrimaryKeyColumn {
                column: column.clone(),
                key_seq: (i + 1) as u16,
            })
            .collect())
    }

    fn table_remarks(&self, table: &TableRef) -> Result<Option<String>> {
        Ok(self.find(table)?.remarks.clone())
    }
}

/// Extract table metadata from a CREATE TABLE statement
fn extract_table(create: &CreateTable) -> Result<DdlTable> {
    let table = extract_table_ref(&create.name);

    let mut columns = Vec::new();
    let mut primary_key = Vec::new();

    for col_def in &create.columns {
        let (column, col_pk) = extract_column(&table, col_def)?;
        if col_pk {
            primary_key = vec![column.name.clone()];
        }
        columns.push(column);
    }

    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey(PrimaryKeyConstraint {
            columns: pk_cols, ..
        }) = constraint
        {
            primary_key = pk_cols.iter().map(extract_ident_from_index_column).collect();
            // Mark PK columns as non-nullable
            for pk_col in &primary_key {
                if let Some(col) = columns.iter_mut().find(|c| &c.name == pk_col) {
                    col.nullable = false;
                }
            }
        }
    }

    let remarks = extract_table_comment(create);

    Ok(DdlTable {
        table,
        columns,
        primary_key,
        remarks,
    })
}

/// Extract one column row; the flag reports a column-level PRIMARY KEY
fn extract_column(
    table: &TableRef,
    col_def: &sqlparser::ast::ColumnDef,
) -> Result<(RawColumn, bool)> {
    let name = extract_ident(&col_def.name);
    let type_name = format!("{}", col_def.data_type);
    let (size, scale) = extract_size_and_scale(&type_name);

    let mut nullable = true;
    let mut default_value = None;
    let mut auto_increment = false;
    let mut generated = false;
    let mut col_is_primary = false;
    let mut remarks = None;

    for option in &col_def.options {
        match &option.option {
            ColumnOption::NotNull => {
                nullable = false;
            }
            ColumnOption::Null => {
                nullable = true;
            }
            ColumnOption::Default(expr) => {
                default_value = Some(format!("{}", expr));
            }
            ColumnOption::PrimaryKey(_) => {
                col_is_primary = true;
                nullable = false;
            }
            ColumnOption::Comment(c) => {
                remarks = Some(c.clone());
            }
            ColumnOption::Generated { .. } => {
                generated = true;
            }
            ColumnOption::DialectSpecific(tokens) => {
                let token_str = tokens
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_uppercase();
                if token_str.contains("AUTO_INCREMENT") {
                    auto_increment = true;
                }
            }
            _ => {}
        }
    }

    let column = RawColumn {
        table: table.clone(),
        name,
        type_code: mysql_type_code(&type_name),
        type_name,
        size,
        scale,
        nullable,
        remarks,
        default_value,
        auto_increment,
        generated,
    };

    Ok((column, col_is_primary))
}

/// Numeric arguments of a type such as `DECIMAL(10,2)`
fn extract_size_and_scale(type_name: &str) -> (u32, u32) {
    let args = type_name
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(args, _)| args)
        .unwrap_or_default();
    let mut numbers = args.split(',').map(|a| a.trim().parse::<u32>().ok());
    let size = numbers.next().flatten().unwrap_or(0);
    let scale = numbers.next().flatten().unwrap_or(0);
    (size, scale)
}

/// Table-level `COMMENT` option, which follows the column list
fn extract_table_comment(create: &CreateTable) -> Option<String> {
    let options: &[SqlOption] = match &create.table_options {
        CreateTableOptions::With(options)
        | CreateTableOptions::Options(options)
        | CreateTableOptions::Plain(options)
        | CreateTableOptions::TableProperties(options) => options,
        CreateTableOptions::None => &[],
    };
    options
        .iter()
        .find_map(|option| match option {
            SqlOption::Comment(comment) => Some(comment_text(comment)),
            _ => None,
        })
        .or_else(|| create.comment.as_ref().map(comment_text))
}

fn comment_text(comment: &CommentDef) -> String {
    match comment {
        CommentDef::WithEq(text) | CommentDef::WithoutEq(text) => text.clone(),
    }
}

fn extract_table_ref(name: &ObjectName) -> TableRef {
    let parts: Vec<String> = name
        .0
        .iter()
        .filter_map(|part| part.as_ident())
        .map(extract_ident)
        .collect();
    match parts.as_slice() {
        [catalog, table] => TableRef {
            catalog: Some(catalog.clone()),
            schema: None,
            name: table.clone(),
        },
        [.., table] => TableRef::new(table.clone()),
        [] => TableRef::new(String::new()),
    }
}

/// Extract a string from an Ident, removing backticks if present
fn extract_ident(ident: &Ident) -> String {
    ident.value.clone()
}

/// Extract a column name string from an IndexColumn
fn extract_ident_from_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => format!("{}", other),
    }
}
