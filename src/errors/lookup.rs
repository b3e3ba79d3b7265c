use thiserror::Error;

/// Table lookups distinguish a missing data source from a missing table on it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Data source {0} not found")]
    SourceNotFound(String),

    #[error("Table '{table}' not found in data source {source_id}")]
    TableNotFound { source_id: String, table: String },
}

impl LookupError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LookupError::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            LookupError::TableNotFound { .. } => "TABLE_NOT_FOUND",
        }
    }
}
