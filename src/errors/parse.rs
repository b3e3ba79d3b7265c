//! Upload parsing error types

use thiserror::Error;

/// Errors raised while turning an uploaded file into tables
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file parsed to zero rows
    #[error("No data found in file: {0}")]
    EmptyInput(String),

    /// The extension is not one of csv, xlsx, xls
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Delimited text could not be tokenised
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or a sheet could not be read
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    /// Reading the file from disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Spreadsheet(err.to_string())
    }
}

impl ParseError {
    /// Check if the caller supplied something unusable (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ParseError::EmptyInput(_)
                | ParseError::UnsupportedFileType(_)
                | ParseError::Csv(_)
                | ParseError::Spreadsheet(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ParseError::EmptyInput(_) => "EMPTY_INPUT",
            ParseError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            ParseError::Csv(_) => "CSV_ERROR",
            ParseError::Spreadsheet(_) => "SPREADSHEET_ERROR",
            ParseError::Io(_) => "IO_ERROR",
        }
    }
}
