//! JDBC to Java type mapping

use crate::dom::JavaType;
use crate::parser::{JdbcType, RawColumn};

/// Java type plus the JDBC type name MyBatis should bind with
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub java_type: JavaType,
    pub jdbc_type: String,
}

impl ResolvedType {
    fn new(java_type: &str, jdbc_type: JdbcType) -> Self {
        Self {
            java_type: JavaType::new(java_type),
            jdbc_type: jdbc_type.name().to_string(),
        }
    }

    /// Fallback for columns whose type code has no mapping
    pub fn untyped() -> Self {
        Self::new("java.lang.Object", JdbcType::Other)
    }
}

/// Resolve JDBC type codes to Java types
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaTypeResolver {
    /// Never narrow DECIMAL/NUMERIC to integral types
    pub force_big_decimals: bool,
    /// Use `java.time` instead of `java.util.Date`
    pub use_java_time: bool,
}

impl JavaTypeResolver {
    pub fn new(force_big_decimals: bool, use_java_time: bool) -> Self {
        Self {
            force_big_decimals,
            use_java_time,
        }
    }

    /// Resolve a column's type; `None` when the vendor code is not mapped
    pub fn resolve(&self, column: &RawColumn) -> Option<ResolvedType> {
        let jdbc = JdbcType::from_code(column.type_code)?;

        let java = match jdbc {
            JdbcType::Bigint => "java.lang.Long",
            JdbcType::Binary
            | JdbcType::Blob
            | JdbcType::LongVarbinary
            | JdbcType::Varbinary => "byte[]",
            JdbcType::Bit | JdbcType::Boolean => "java.lang.Boolean",
            JdbcType::Char
            | JdbcType::Clob
            | JdbcType::LongNVarchar
            | JdbcType::LongVarchar
            | JdbcType::NChar
            | JdbcType::NClob
            | JdbcType::NVarchar
            | JdbcType::Varchar => "java.lang.String",
            JdbcType::Date if self.use_java_time => "java.time.LocalDate",
            JdbcType::Time if self.use_java_time => "java.time.LocalTime",
            JdbcType::Timestamp if self.use_java_time => "java.time.LocalDateTime",
            JdbcType::Date | JdbcType::Time | JdbcType::Timestamp => "java.util.Date",
            JdbcType::TimeWithTimezone if self.use_java_time => "java.time.OffsetTime",
            JdbcType::TimestampWithTimezone if self.use_java_time => "java.time.OffsetDateTime",
            JdbcType::Decimal | JdbcType::Numeric => self.decimal_type(column),
            JdbcType::Double | JdbcType::Float => "java.lang.Double",
            JdbcType::Real => "java.lang.Float",
            JdbcType::Integer | JdbcType::Tinyint => "java.lang.Integer",
            JdbcType::Smallint => "java.lang.Short",
            JdbcType::Array
            | JdbcType::Datalink
            | JdbcType::Distinct
            | JdbcType::JavaObject
            | JdbcType::Null
            | JdbcType::Ref
            | JdbcType::Struct => "java.lang.Object",
            JdbcType::Other | JdbcType::TimeWithTimezone | JdbcType::TimestampWithTimezone => {
                return None
            }
        };

        Some(ResolvedType::new(java, jdbc))
    }

    fn decimal_type(&self, column: &RawColumn) -> &'static str {
        if column.scale > 0 || column.size > 18 || self.force_big_decimals {
            "java.math.BigDecimal"
        } else if column.size > 9 {
            "java.lang.Long"
        } else if column.size > 4 {
            "java.lang.Integer"
        } else {
            "java.lang.Short"
        }
    }
}
