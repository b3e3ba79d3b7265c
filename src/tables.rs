use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single cell as read from an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Header coercion: `Null` becomes an empty string
    pub fn to_header(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

pub type Row = Vec<CellValue>;

/// Header row plus data rows.
///
/// `row_count` and `column_count` are derived at construction. Rows are not
/// forced to `column_count` cells; see [`ParsedTable::ragged_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub column_count: usize,
}

impl ParsedTable {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        let column_count = headers.len();
        Self {
            headers,
            rows,
            row_count,
            column_count,
        }
    }

    /// Indexes of rows whose length differs from the header width
    pub fn ragged_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != self.column_count)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.column_count)
    }
}

/// Table name to table, in file order
pub type ParsedFile = IndexMap<String, ParsedTable>;

/// A file handed over by the upload widget
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Csv,
    Excel,
}

impl DataSourceKind {
    /// Any name containing "csv" counts as csv, everything else as excel
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("csv") {
            DataSourceKind::Csv
        } else {
            DataSourceKind::Excel
        }
    }
}

/// A client-side upload registered in the data source manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub tables: ParsedFile,
    pub uploaded_at: DateTime<Utc>,
    pub file_name: String,
    pub file_size: u64,
}

impl DataSource {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub data_source_id: String,
    pub data_source_name: String,
    pub table_name: String,
}
