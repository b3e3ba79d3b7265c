//! Upload parsing and data source registry tests
//!
//! Spreadsheet fixtures are generated in memory with rust_xlsxwriter and read
//! back through the same path an upload takes.

use anyhow::Result;
use datamantri::errors::ParseError;
use datamantri::tables::{CellValue, DataSourceKind};
use datamantri::{parse_file, DataSourceManager, UploadedFile};
use rust_xlsxwriter::Workbook;
use std::io::Write;
use tempfile::NamedTempFile;

fn workbook_bytes() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let orders = workbook.add_worksheet();
    orders.set_name("Orders")?;
    orders.write_string(0, 0, "id")?;
    orders.write_string(0, 1, "customer")?;
    orders.write_string(0, 2, "total")?;
    orders.write_number(1, 0, 1.0)?;
    orders.write_string(1, 1, "Acme")?;
    orders.write_number(1, 2, 100.0)?;
    orders.write_number(2, 0, 2.0)?;
    // customer left blank
    orders.write_number(2, 2, 250.5)?;

    let empty = workbook.add_worksheet();
    empty.set_name("Empty")?;

    let header_only = workbook.add_worksheet();
    header_only.set_name("Headers")?;
    header_only.write_string(0, 0, "region")?;
    header_only.write_boolean(0, 1, true)?;

    Ok(workbook.save_to_buffer()?)
}

#[tokio::test]
async fn test_workbook_sheets_become_tables() -> Result<()> {
    let file = UploadedFile::new("Quarterly.XLSX", workbook_bytes()?);
    let parsed = parse_file(&file).await?;

    let names: Vec<&str> = parsed.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Orders", "Headers"]);

    let orders = &parsed["Orders"];
    assert_eq!(orders.headers, vec!["id", "customer", "total"]);
    assert_eq!(orders.row_count, 2);
    assert_eq!(orders.column_count, 3);
    assert_eq!(orders.rows[0][1], CellValue::from("Acme"));
    assert_eq!(orders.rows[0][2].to_string(), "100");
    assert_eq!(orders.rows[1][1], CellValue::Null);
    assert_eq!(orders.rows[1][2].to_string(), "250.5");

    let headers = &parsed["Headers"];
    assert_eq!(headers.headers, vec!["region", "true"]);
    assert_eq!(headers.row_count, 0);

    Ok(())
}

#[tokio::test]
async fn test_csv_from_disk() -> Result<()> {
    let mut temp = NamedTempFile::new()?;
    write!(temp, "id\tname\tscore\n1\tAda\t9\n2\tGrace\t10\n\n3\tLinus\t7\n")?;

    let mut file = UploadedFile::from_path(temp.path())?;
    file.name = "scores.csv".to_string();
    let parsed = parse_file(&file).await?;

    let table = &parsed["scores"];
    assert_eq!(table.headers, vec!["id", "name", "score"]);
    assert_eq!(table.row_count + 1, 4);
    assert_eq!(table.column_count, table.headers.len());
    assert_eq!(table.rows[2][1], CellValue::from("Linus"));
    Ok(())
}

#[tokio::test]
async fn test_failures_surface_as_errors() {
    let err = parse_file(&UploadedFile::new("empty.csv", Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ParseError::EmptyInput(_)));

    let err = parse_file(&UploadedFile::new("data.json", b"{}".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported file type: json");
}

#[tokio::test]
async fn test_uploads_flow_into_manager() -> Result<()> {
    let mut manager = DataSourceManager::new();

    let csv = UploadedFile::new("sales.csv", b"id,amount\n1,100\n".to_vec());
    let parsed = parse_file(&csv).await?;
    let csv_id = manager.add_data_source(&csv, parsed).id.clone();

    let xlsx = UploadedFile::new("quarterly.xlsx", workbook_bytes()?);
    let parsed = parse_file(&xlsx).await?;
    let xlsx_source = manager.add_data_source(&xlsx, parsed);
    assert_eq!(xlsx_source.kind, DataSourceKind::Excel);
    let xlsx_id = xlsx_source.id.clone();

    let total_tables: usize = manager
        .get_data_sources()
        .iter()
        .map(|ds| ds.table_count())
        .sum();
    assert_eq!(manager.get_all_table_names().len(), total_tables);
    assert_eq!(total_tables, 3);

    assert_eq!(
        manager.get_table_data(&csv_id, "sales")?,
        &[vec![CellValue::from("1"), CellValue::from("100")]]
    );
    assert!(manager.get_table_headers(&xlsx_id, "Empty").is_err());

    assert!(manager.remove_data_source(&csv_id));
    assert_eq!(manager.get_all_table_names().len(), 2);
    Ok(())
}
