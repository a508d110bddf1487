// Course Extraction - Core Library
// Document store → fee-schedule normalization → spreadsheet tabs.
// Shared by the CLI, the HTTP trigger and the tests.

pub mod config;
pub mod error;
pub mod extract;
pub mod fees;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod store;
pub mod text;

// Re-export commonly used types
pub use config::{build_config, CliOverrides, ConfigError, ExtractConfig, LogLevel, TabNames};
pub use error::ExtractError;
pub use extract::ExtractionModule;
pub use fees::{
    aggregate, classify, expand, retain_billable, DurationShape, ExpansionMode, FeeGroup,
    FeeGroups, FeeKind, FeePeriod, Location, NodeMarker, PeriodMarker, FEE_HEADER,
};
pub use pipeline::{run_extraction, ExtractionRequest, ModuleOutcome, RunReport};
pub use sink::{workbook_dir_name, CsvWorkbook, MemoryWorkbook, ModuleStatus, RowSink};
pub use source::{
    CourseDetail, CourseSource, DisciplineRecord, EntryRequirementRecord, FeeLineItem, FeeScope,
    PartnerTerms,
};
pub use store::{
    collections, count_documents, import_export, load_export, normalize_documents, setup_database,
    ImportStats, SqliteCourseStore,
};
pub use text::html_to_text;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
