use chrono::Utc;
use tracing::info;

use crate::errors::{LookupError, LookupResult};
use crate::tables::{DataSource, DataSourceKind, ParsedFile, ParsedTable, Row, TableRef, UploadedFile};

/// In-memory registry of uploaded data sources.
///
/// Ids are `ds_<n>` with `n` counting up from 1 and never reused.
#[derive(Debug)]
pub struct DataSourceManager {
    data_sources: Vec<DataSource>,
    next_id: u64,
}

impl Default for DataSourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceManager {
    pub fn new() -> Self {
        Self {
            data_sources: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add_data_source(&mut self, file: &UploadedFile, tables: ParsedFile) -> &DataSource {
        let id = format!("ds_{}", self.next_id);
        self.next_id += 1;

        let data_source = DataSource {
            id,
            name: file.name.clone(),
            kind: DataSourceKind::from_file_name(&file.name),
            tables,
            uploaded_at: Utc::now(),
            file_name: file.name.clone(),
            file_size: file.size(),
        };
        info!(
            "Registered data source {} ({}, {} tables)",
            data_source.id,
            data_source.name,
            data_source.table_count()
        );

        self.data_sources.push(data_source);
        &self.data_sources[self.data_sources.len() - 1]
    }

    /// The live registry, in insertion order
    pub fn get_data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn get_data_source(&self, id: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|ds| ds.id == id)
    }

    pub fn get_table(&self, id: &str, table_name: &str) -> LookupResult<&ParsedTable> {
        let data_source = self
            .get_data_source(id)
            .ok_or_else(|| LookupError::SourceNotFound(id.to_string()))?;
        data_source
            .tables
            .get(table_name)
            .ok_or_else(|| LookupError::TableNotFound {
                source_id: id.to_string(),
                table: table_name.to_string(),
            })
    }

    pub fn get_table_data(&self, id: &str, table_name: &str) -> LookupResult<&[Row]> {
        self.get_table(id, table_name).map(|table| table.rows.as_slice())
    }

    pub fn get_table_headers(&self, id: &str, table_name: &str) -> LookupResult<&[String]> {
        self.get_table(id, table_name)
            .map(|table| table.headers.as_slice())
    }

    pub fn remove_data_source(&mut self, id: &str) -> bool {
        match self.data_sources.iter().position(|ds| ds.id == id) {
            Some(index) => {
                let removed = self.data_sources.remove(index);
                info!("Removed data source {} ({})", removed.id, removed.name);
                true
            }
            None => false,
        }
    }

    /// Every table of every source, registry order first, then table order
    pub fn get_all_table_names(&self) -> Vec<TableRef> {
        self.data_sources
            .iter()
            .flat_map(|ds| {
                ds.tables.keys().map(move |table_name| TableRef {
                    data_source_id: ds.id.clone(),
                    data_source_name: ds.name.clone(),
                    table_name: table_name.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data_sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CellValue;

    fn sample_tables(names: &[&str]) -> ParsedFile {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    ParsedTable::new(
                        vec!["id".to_string()],
                        vec![vec![CellValue::from("1")]],
                    ),
                )
            })
            .collect()
    }

    #[test]
    fn same_file_twice_yields_two_sources() {
        let mut manager = DataSourceManager::new();
        let file = UploadedFile::new("sales.csv", b"id\n1\n".to_vec());

        let first = manager.add_data_source(&file, sample_tables(&["sales"])).id.clone();
        let second = manager.add_data_source(&file, sample_tables(&["sales"])).id.clone();

        assert_eq!(first, "ds_1");
        assert_eq!(second, "ds_2");
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut manager = DataSourceManager::new();
        let file = UploadedFile::new("a.csv", Vec::new());
        manager.add_data_source(&file, sample_tables(&["a"]));
        assert!(manager.remove_data_source("ds_1"));
        let id = manager.add_data_source(&file, sample_tables(&["a"])).id.clone();
        assert_eq!(id, "ds_2");
    }

    #[test]
    fn remove_reports_true_exactly_once() {
        let mut manager = DataSourceManager::new();
        let file = UploadedFile::new("a.csv", Vec::new());
        manager.add_data_source(&file, sample_tables(&["a"]));

        assert!(!manager.remove_data_source("ds_9"));
        assert!(manager.remove_data_source("ds_1"));
        assert!(!manager.remove_data_source("ds_1"));
        assert!(manager.is_empty());
    }

    #[test]
    fn lookups_distinguish_missing_source_from_missing_table() {
        let mut manager = DataSourceManager::new();
        let file = UploadedFile::new("book.xlsx", vec![0u8; 4]);
        manager.add_data_source(&file, sample_tables(&["Sheet1"]));

        assert_eq!(manager.get_table_headers("ds_1", "Sheet1").unwrap(), ["id"]);
        assert_eq!(manager.get_table_data("ds_1", "Sheet1").unwrap().len(), 1);
        assert_eq!(
            manager.get_table_data("ds_7", "Sheet1").unwrap_err(),
            LookupError::SourceNotFound("ds_7".to_string())
        );
        assert_eq!(
            manager.get_table_headers("ds_1", "Sheet2").unwrap_err(),
            LookupError::TableNotFound {
                source_id: "ds_1".to_string(),
                table: "Sheet2".to_string()
            }
        );
    }

    #[test]
    fn records_upload_metadata() {
        let mut manager = DataSourceManager::new();
        let file = UploadedFile::new("book.xlsx", vec![0u8; 42]);
        let ds = manager.add_data_source(&file, sample_tables(&["Sheet1"]));
        assert_eq!(ds.kind, DataSourceKind::Excel);
        assert_eq!(ds.file_size, 42);
        assert_eq!(ds.file_name, "book.xlsx");
    }

    #[test]
    fn all_table_names_flatten_in_order() {
        let mut manager = DataSourceManager::new();
        manager.add_data_source(
            &UploadedFile::new("book.xlsx", Vec::new()),
            sample_tables(&["Q1", "Q2"]),
        );
        manager.add_data_source(
            &UploadedFile::new("sales.csv", Vec::new()),
            sample_tables(&["sales"]),
        );

        let names: Vec<(String, String)> = manager
            .get_all_table_names()
            .into_iter()
            .map(|t| (t.data_source_id, t.table_name))
            .collect();
        assert_eq!(
            names,
            vec![
                ("ds_1".to_string(), "Q1".to_string()),
                ("ds_1".to_string(), "Q2".to_string()),
                ("ds_2".to_string(), "sales".to_string()),
            ]
        );
    }
}
