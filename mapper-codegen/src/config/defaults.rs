//! Default configuration values - single source of truth

/// Default root directory for generated Java sources
pub const TARGET_PROJECT: &str = "./generated/java";

/// Default root directory for generated mapper XML
pub const SQLMAP_TARGET_PROJECT: &str = "./generated/resources";

/// Default package for record classes
pub const MODEL_PACKAGE: &str = "com.example.model";

/// Default package for query-condition classes
pub const QUERY_PACKAGE: &str = "com.example.query";

/// Default package for mapper interfaces
pub const CLIENT_PACKAGE: &str = "com.example.mapper";

/// Default package (directory) for mapper XML documents
pub const SQLMAP_PACKAGE: &str = "mapper";

/// Suffix appended to the domain object name for query-condition classes
pub const QUERY_SUFFIX: &str = "QC";

/// Suffix appended to the domain object name for mapper interfaces
pub const MAPPER_SUFFIX: &str = "Mapper";

/// Javadoc tag marking members the generator owns
pub const RETENTION_TAG: &str = "@mapper.generated";

/// Merge regenerated files into existing ones by default
pub const MERGE: bool = true;

/// Overwrite existing files when merging is not possible
pub const OVERWRITE: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Value written by the batch-insert default branch for timestamp columns
pub const TIMESTAMP_DEFAULT: &str = "now()";

/// Highest `name.N` suffix tried before giving up on a file
pub const MAX_UNIQUE_SUFFIX: u32 = 999;
