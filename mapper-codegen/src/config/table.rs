//! Per-table configuration

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for one configured table (or table pattern)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    /// Catalog the table lives in
    #[serde(default)]
    pub catalog: Option<String>,

    /// Schema the table lives in
    #[serde(default)]
    pub schema: Option<String>,

    /// Table name; may contain SQL `%` / `_` wildcards
    pub table_name: String,

    /// Explicit domain object name (defaults to PascalCase of the table name)
    #[serde(default)]
    pub domain_object_name: Option<String>,

    #[serde(default = "default_true")]
    pub enable_insert: bool,

    #[serde(default = "default_true")]
    pub enable_batch_insert: bool,

    #[serde(default = "default_true")]
    pub enable_count: bool,

    #[serde(default = "default_true")]
    pub enable_get_by_qc: bool,

    #[serde(default = "default_true")]
    pub enable_list: bool,

    #[serde(default = "default_true")]
    pub enable_update: bool,

    #[serde(default = "default_true")]
    pub enable_batch_update: bool,

    /// Columns left out of every artifact
    #[serde(default)]
    pub ignored_columns: Vec<IgnoredColumn>,

    /// Regex-based ignore rules
    #[serde(default)]
    pub ignored_column_patterns: Vec<IgnoredColumnPattern>,

    #[serde(default)]
    pub column_overrides: Vec<ColumnOverride>,

    #[serde(default)]
    pub generated_key: Option<GeneratedKey>,

    /// Search/replace applied to the domain object name
    #[serde(default)]
    pub domain_object_renaming_rule: Option<RenamingRule>,

    /// Search/replace applied to column names before property derivation
    #[serde(default)]
    pub column_renaming_rule: Option<RenamingRule>,

    #[serde(default)]
    pub property_naming: PropertyNaming,

    /// Logical-delete column, always predicated in generated conditions
    #[serde(default)]
    pub soft_delete: Option<SoftDelete>,

    /// Creation timestamp column, defaulted to `now()` on batch insert
    #[serde(default)]
    pub gmt_create_column: Option<String>,

    /// Modification timestamp column, defaulted to `now()` on insert/update
    #[serde(default)]
    pub gmt_modified_column: Option<String>,

    /// Query-condition columns; all columns when empty
    #[serde(default)]
    pub filters: Vec<FilterColumn>,

    /// Query-condition property holding the ORDER BY expression
    #[serde(default)]
    pub order_by_field: Option<String>,

    /// Query-condition property holding the row offset
    #[serde(default)]
    pub offset_field: Option<String>,

    /// Query-condition property holding the row limit
    #[serde(default)]
    pub limit_field: Option<String>,

    /// Quote catalog/schema/table identifiers and match them case-sensitively
    #[serde(default)]
    pub delimit_identifiers: bool,

    /// Treat `%` and `_` in the table name literally
    #[serde(default)]
    pub wildcard_escaping: bool,
}

fn default_true() -> bool {
    true
}

/// How property names are derived from column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyNaming {
    /// Property name equals the (renamed) column name
    Actual,
    /// Column name, `_`, then the camel-cased column remarks
    Compound,
    /// camelCase of the (renamed) column name
    #[default]
    CamelCase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredColumn {
    pub column: String,
    /// Match case-sensitively
    #[serde(default)]
    pub delimited: bool,
}

impl IgnoredColumn {
    pub fn matches(&self, column: &str) -> bool {
        if self.delimited {
            self.column == column
        } else {
            self.column.eq_ignore_ascii_case(column)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredColumnPattern {
    pub pattern: String,
    /// Columns matching the pattern that are still kept
    #[serde(default)]
    pub except: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub column: String,
    #[serde(default)]
    pub property: Option<String>,
    /// Fully-qualified Java type
    #[serde(default)]
    pub java_type: Option<String>,
    /// JDBC type name, e.g. `VARCHAR`
    #[serde(default)]
    pub jdbc_type: Option<String>,
    #[serde(default)]
    pub type_handler: Option<String>,
    /// Column is computed by the database; excluded from insert/update lists
    #[serde(default)]
    pub generated_always: bool,
    #[serde(default)]
    pub delimited: bool,
    #[serde(default)]
    pub properties: std::collections::BTreeMap<String, String>,
}

impl ColumnOverride {
    pub fn matches(&self, column: &str) -> bool {
        if self.delimited {
            self.column == column
        } else {
            self.column.eq_ignore_ascii_case(column)
        }
    }
}

/// How a database-assigned key is read back after (or before) an insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedKey {
    pub column: String,
    /// SQL statement or one of the dialect tokens (`MySql`, `DB2`, `JDBC`, ...)
    pub statement: String,
    #[serde(default)]
    pub identity: bool,
    /// `pre` or `post`; derived from `identity` when absent
    #[serde(default)]
    pub timing: Option<String>,
    /// Match the column case-sensitively
    #[serde(default)]
    pub delimited: bool,
}

/// Token that selects JDBC `getGeneratedKeys` instead of a statement
pub const JDBC_STANDARD: &str = "JDBC";

impl GeneratedKey {
    /// Statement after resolving dialect tokens
    pub fn resolved_statement(&self) -> String {
        dialect_statement(&self.statement)
            .map(str::to_string)
            .unwrap_or_else(|| self.statement.clone())
    }

    pub fn is_jdbc_standard(&self) -> bool {
        self.statement.eq_ignore_ascii_case(JDBC_STANDARD)
    }

    /// Whether the key is produced by the insert itself
    pub fn is_identity(&self) -> bool {
        self.identity || self.is_jdbc_standard()
    }

    /// Whether the key statement runs after the insert
    pub fn runs_after_insert(&self) -> bool {
        match self.timing.as_deref() {
            Some(t) => t.eq_ignore_ascii_case("post"),
            None => self.is_identity(),
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        if self.delimited {
            self.column == column
        } else {
            self.column.eq_ignore_ascii_case(column)
        }
    }

    fn validate(&self, table: &str, errors: &mut Vec<String>) {
        if self.column.trim().is_empty() {
            errors.push(format!("table {}: generated_key.column is required", table));
        }
        if self.statement.trim().is_empty() {
            errors.push(format!(
                "table {}: generated_key.statement is required",
                table
            ));
        }
        match self.timing.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None => {}
            Some("pre") if self.is_identity() => errors.push(format!(
                "table {}: generated_key timing \"pre\" cannot be used with an identity column or JDBC keys",
                table
            )),
            Some("post") if !self.is_identity() => errors.push(format!(
                "table {}: generated_key timing \"post\" requires an identity column or JDBC keys",
                table
            )),
            Some("pre") | Some("post") => {}
            Some(other) => errors.push(format!(
                "table {}: generated_key timing must be \"pre\" or \"post\", got \"{}\"",
                table, other
            )),
        }
    }
}

/// Canonical statement for a dialect token, matched case-insensitively
pub fn dialect_statement(token: &str) -> Option<&'static str> {
    let statement = match token.to_ascii_uppercase().as_str() {
        "DB2" | "CLOUDSCAPE" | "DERBY" => "VALUES IDENTITY_VAL_LOCAL()",
        "MYSQL" => "SELECT LAST_INSERT_ID()",
        "SQLSERVER" => "SELECT SCOPE_IDENTITY()",
        "HSQLDB" => "CALL IDENTITY()",
        "SYBASE" => "SELECT @@IDENTITY",
        "DB2_MF" => "SELECT IDENTITY_VAL_LOCAL() FROM SYSIBM.SYSDUMMY1",
        "INFORMIX" => "select dbinfo('sqlca.sqlerrd1') from systables where tabid=1",
        _ => return None,
    };
    Some(statement)
}

/// Compiled ignore rules of one [`TableSpec`]
#[derive(Debug)]
pub struct IgnoreRules<'a> {
    columns: &'a [IgnoredColumn],
    patterns: Vec<(Regex, &'a [String])>,
}

impl IgnoreRules<'_> {
    pub fn is_ignored(&self, column: &str) -> bool {
        if self.columns.iter().any(|c| c.matches(column)) {
            return true;
        }
        self.patterns.iter().any(|(re, except)| {
            re.is_match(column) && !except.iter().any(|e| e.eq_ignore_ascii_case(column))
        })
    }
}

/// Regex search/replace pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamingRule {
    pub search: String,
    #[serde(default)]
    pub replace: String,
}

impl RenamingRule {
    /// Compile the rule; callers report the error as a configuration problem
    pub fn compile(&self) -> Result<Renamer, regex::Error> {
        Ok(Renamer {
            search: Regex::new(&self.search)?,
            replace: self.replace.clone(),
        })
    }
}

/// Compiled form of a [`RenamingRule`]
#[derive(Debug, Clone)]
pub struct Renamer {
    search: Regex,
    replace: String,
}

impl Renamer {
    pub fn apply(&self, name: &str) -> String {
        self.search.replace_all(name, self.replace.as_str()).into_owned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftDelete {
    pub column: String,
    /// Literal SQL value meaning "not deleted"
    pub alive_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterColumn {
    pub column: String,
    /// Render as `IN (...)` over a `List<T>` property
    #[serde(default)]
    pub multi_value: bool,
}

impl TableSpec {
    /// A spec for `table_name` with every operation enabled
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            table_name: table_name.into(),
            domain_object_name: None,
            enable_insert: true,
            enable_batch_insert: true,
            enable_count: true,
            enable_get_by_qc: true,
            enable_list: true,
            enable_update: true,
            enable_batch_update: true,
            ignored_columns: Vec::new(),
            ignored_column_patterns: Vec::new(),
            column_overrides: Vec::new(),
            generated_key: None,
            domain_object_renaming_rule: None,
            column_renaming_rule: None,
            property_naming: PropertyNaming::default(),
            soft_delete: None,
            gmt_create_column: None,
            gmt_modified_column: None,
            filters: Vec::new(),
            order_by_field: None,
            offset_field: None,
            limit_field: None,
            delimit_identifiers: false,
            wildcard_escaping: false,
        }
    }

    /// Pagination is on only when both offset and limit fields are set
    pub fn pagination_enabled(&self) -> bool {
        self.offset_field.is_some() && self.limit_field.is_some()
    }

    /// Whether `table_name` contains an unescaped SQL wildcard
    pub fn has_wildcard(&self) -> bool {
        !self.wildcard_escaping && self.table_name.contains(['%', '_'])
    }

    /// Match a physical table name against the configured name/pattern
    pub fn matches_table(&self, name: &str) -> bool {
        if self.wildcard_escaping {
            return if self.delimit_identifiers {
                self.table_name == name
            } else {
                self.table_name.eq_ignore_ascii_case(name)
            };
        }
        like_match(&self.table_name, name, !self.delimit_identifiers)
    }

    /// Compile the ignore rules once per table
    pub fn ignore_rules(&self) -> Result<IgnoreRules<'_>, regex::Error> {
        let patterns = self
            .ignored_column_patterns
            .iter()
            .map(|p| Ok((Regex::new(&p.pattern)?, p.except.as_slice())))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(IgnoreRules {
            columns: &self.ignored_columns,
            patterns,
        })
    }

    pub fn override_for(&self, column: &str) -> Option<&ColumnOverride> {
        self.column_overrides.iter().find(|o| o.matches(column))
    }

    /// Collect configuration problems for this table into `errors`
    pub fn validate(&self, errors: &mut Vec<String>) {
        let table = self.table_name.as_str();
        if table.trim().is_empty() {
            errors.push("table_name is required for every [[tables]] entry".into());
        }

        for (what, rule) in [
            ("domain_object_renaming_rule", &self.domain_object_renaming_rule),
            ("column_renaming_rule", &self.column_renaming_rule),
        ] {
            if let Some(rule) = rule {
                if rule.search.is_empty() {
                    errors.push(format!("table {}: {}.search is required", table, what));
                } else if let Err(e) = rule.compile() {
                    errors.push(format!("table {}: {} is invalid: {}", table, what, e));
                }
            }
        }

        for pattern in &self.ignored_column_patterns {
            if let Err(e) = Regex::new(&pattern.pattern) {
                errors.push(format!(
                    "table {}: ignored column pattern {:?} is invalid: {}",
                    table, pattern.pattern, e
                ));
            }
        }

        if let Some(key) = &self.generated_key {
            key.validate(table, errors);
        }

        if let Some(soft_delete) = &self.soft_delete {
            if soft_delete.alive_value.trim().is_empty() {
                errors.push(format!(
                    "table {}: soft_delete.alive_value is required",
                    table
                ));
            }
        }
    }
}

/// SQL `LIKE` matching with `%` and `_` wildcards
fn like_match(pattern: &str, text: &str, ignore_case: bool) -> bool {
    let fold = |c: char| {
        if ignore_case {
            c.to_ascii_lowercase()
        } else {
            c
        }
    };
    let p: Vec<char> = pattern.chars().map(fold).collect();
    let t: Vec<char> = text.chars().map(fold).collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((bp, bt)) = backtrack {
            pi = bp + 1;
            ti = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '%')
}
