//! JDBC type codes as reported by database metadata drivers

use serde::{Deserialize, Serialize};

/// The subset of `java.sql.Types` the generator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Array,
    Bigint,
    Binary,
    Bit,
    Blob,
    Boolean,
    Char,
    Clob,
    Datalink,
    Date,
    Decimal,
    Distinct,
    Double,
    Float,
    Integer,
    JavaObject,
    LongNVarchar,
    LongVarbinary,
    LongVarchar,
    NChar,
    NClob,
    Null,
    Numeric,
    NVarchar,
    Other,
    Real,
    Ref,
    Smallint,
    Struct,
    Time,
    TimeWithTimezone,
    Timestamp,
    TimestampWithTimezone,
    Tinyint,
    Varbinary,
    Varchar,
}

const TABLE: &[(JdbcType, i32, &str)] = &[
    (JdbcType::Array, 2003, "ARRAY"),
    (JdbcType::Bigint, -5, "BIGINT"),
    (JdbcType::Binary, -2, "BINARY"),
    (JdbcType::Bit, -7, "BIT"),
    (JdbcType::Blob, 2004, "BLOB"),
    (JdbcType::Boolean, 16, "BOOLEAN"),
    (JdbcType::Char, 1, "CHAR"),
    (JdbcType::Clob, 2005, "CLOB"),
    (JdbcType::Datalink, 70, "DATALINK"),
    (JdbcType::Date, 91, "DATE"),
    (JdbcType::Decimal, 3, "DECIMAL"),
    (JdbcType::Distinct, 2001, "DISTINCT"),
    (JdbcType::Double, 8, "DOUBLE"),
    (JdbcType::Float, 6, "FLOAT"),
    (JdbcType::Integer, 4, "INTEGER"),
    (JdbcType::JavaObject, 2000, "JAVA_OBJECT"),
    (JdbcType::LongNVarchar, -16, "LONGNVARCHAR"),
    (JdbcType::LongVarbinary, -4, "LONGVARBINARY"),
    (JdbcType::LongVarchar, -1, "LONGVARCHAR"),
    (JdbcType::NChar, -15, "NCHAR"),
    (JdbcType::NClob, 2011, "NCLOB"),
    (JdbcType::Null, 0, "NULL"),
    (JdbcType::Numeric, 2, "NUMERIC"),
    (JdbcType::NVarchar, -9, "NVARCHAR"),
    (JdbcType::Other, 1111, "OTHER"),
    (JdbcType::Real, 7, "REAL"),
    (JdbcType::Ref, 2006, "REF"),
    (JdbcType::Smallint, 5, "SMALLINT"),
    (JdbcType::Struct, 2002, "STRUCT"),
    (JdbcType::Time, 92, "TIME"),
    (JdbcType::TimeWithTimezone, 2013, "TIME_WITH_TIMEZONE"),
    (JdbcType::Timestamp, 93, "TIMESTAMP"),
    (JdbcType::TimestampWithTimezone, 2014, "TIMESTAMP_WITH_TIMEZONE"),
    (JdbcType::Tinyint, -6, "TINYINT"),
    (JdbcType::Varbinary, -3, "VARBINARY"),
    (JdbcType::Varchar, 12, "VARCHAR"),
];

impl JdbcType {
    pub fn from_code(code: i32) -> Option<JdbcType> {
        TABLE.iter().find(|(_, c, _)| *c == code).map(|(t, _, _)| *t)
    }

    pub fn from_name(name: &str) -> Option<JdbcType> {
        TABLE
            .iter()
            .find(|(_, _, n)| n.eq_ignore_ascii_case(name))
            .map(|(t, _, _)| *t)
    }

    pub fn code(self) -> i32 {
        self.entry().1
    }

    /// Name as used in MyBatis `jdbcType` attributes
    pub fn name(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> &'static (JdbcType, i32, &'static str) {
        // TABLE lists every variant
        TABLE
            .iter()
            .find(|(t, _, _)| *t == self)
            .unwrap_or(&TABLE[24])
    }

    /// Large-object types, kept out of the base column list
    pub fn is_large_object(self) -> bool {
        matches!(
            self,
            JdbcType::Binary
                | JdbcType::Blob
                | JdbcType::Clob
                | JdbcType::LongNVarchar
                | JdbcType::LongVarbinary
                | JdbcType::LongVarchar
                | JdbcType::NClob
                | JdbcType::Varbinary
        )
    }
}

/// Map a MySQL column type (`VARCHAR`, `BIGINT UNSIGNED`, ...) to a JDBC code
pub fn mysql_type_code(type_name: &str) -> i32 {
    let base = type_name
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    let jdbc = match base.as_str() {
        "BIT" => JdbcType::Bit,
        "BOOL" | "BOOLEAN" => JdbcType::Boolean,
        "TINYINT" => JdbcType::Tinyint,
        "SMALLINT" => JdbcType::Smallint,
        "MEDIUMINT" | "INT" | "INTEGER" => JdbcType::Integer,
        "BIGINT" => JdbcType::Bigint,
        "FLOAT" => JdbcType::Real,
        "DOUBLE" | "REAL" => JdbcType::Double,
        "DECIMAL" | "DEC" | "NUMERIC" | "FIXED" => JdbcType::Decimal,
        "CHAR" | "ENUM" | "SET" => JdbcType::Char,
        "VARCHAR" => JdbcType::Varchar,
        "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "JSON" => JdbcType::LongVarchar,
        "DATE" | "YEAR" => JdbcType::Date,
        "TIME" => JdbcType::Time,
        "DATETIME" | "TIMESTAMP" => JdbcType::Timestamp,
        "BINARY" => JdbcType::Binary,
        "VARBINARY" => JdbcType::Varbinary,
        "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => JdbcType::LongVarbinary,
        _ => JdbcType::Other,
    };
    jdbc.code()
}
