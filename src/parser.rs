use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::errors::{ParseError, ParseResult};
use crate::tables::{CellValue, ParsedFile, ParsedTable, Row, UploadedFile};

/// Candidate delimiters, in tie-break order
const DELIMITER_CANDIDATES: &[u8] = &[b',', b'\t', b'|', b';'];

/// Number of non-empty lines inspected when sniffing the delimiter
const SNIFF_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Delimited,
    Spreadsheet,
}

impl FileKind {
    /// Classify by the text after the last dot, case-insensitively
    pub fn from_name(name: &str) -> ParseResult<Self> {
        let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
        match extension.as_str() {
            "csv" => Ok(FileKind::Delimited),
            "xlsx" | "xls" => Ok(FileKind::Spreadsheet),
            _ => Err(ParseError::UnsupportedFileType(extension)),
        }
    }
}

/// Parse an upload, dispatching on its extension
pub async fn parse_file(file: &UploadedFile) -> ParseResult<ParsedFile> {
    let kind = FileKind::from_name(&file.name)?;
    info!("Parsing {} ({} bytes) as {:?}", file.name, file.size(), kind);
    match kind {
        FileKind::Delimited => parse_delimited_text(file),
        FileKind::Spreadsheet => parse_spreadsheet(file),
    }
}

/// Table name for a delimited upload: the file name without its final extension
pub fn table_name_for(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name.to_string(),
    }
}

/// Pick the delimiter that splits the leading lines most consistently.
///
/// Each candidate is scored by its modal field count over the sample and how
/// many lines hit that count, so a few ragged rows do not disqualify it.
pub fn detect_delimiter(text: &str) -> u8 {
    let sample = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    // (delimiter, lines matching the modal width, modal width)
    let mut best: Option<(u8, usize, usize)> = None;
    for &candidate in DELIMITER_CANDIDATES {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(candidate)
            .from_reader(sample.as_bytes());

        let mut widths: BTreeMap<usize, usize> = BTreeMap::new();
        for record in reader.records().filter_map(|record| record.ok()) {
            *widths.entry(record.len()).or_default() += 1;
        }

        let Some((width, matching)) = widths
            .into_iter()
            .max_by_key(|&(width, count)| (count, width))
        else {
            continue;
        };
        if width < 2 {
            continue;
        }
        let better = best.map_or(true, |(_, best_matching, best_width)| {
            (matching, width) > (best_matching, best_width)
        });
        if better {
            best = Some((candidate, matching, width));
        }
    }

    best.map(|(delimiter, _, _)| delimiter).unwrap_or(b',')
}

/// Parse delimited text into a single table keyed by the file stem
pub fn parse_delimited_text(file: &UploadedFile) -> ParseResult<ParsedFile> {
    let text = String::from_utf8_lossy(&file.bytes);
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(text);
    debug!("Detected delimiter {:?} for {}", delimiter as char, file.name);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        records.push(record);
    }

    let mut records = records.into_iter();
    let headers: Vec<String> = match records.next() {
        Some(first) => first.iter().map(str::to_string).collect(),
        None => return Err(ParseError::EmptyInput(file.name.clone())),
    };
    let rows: Vec<Row> = records
        .map(|record| record.iter().map(CellValue::from).collect())
        .collect();

    let table = ParsedTable::new(headers, rows);
    report_ragged(&file.name, &table);

    let mut parsed = ParsedFile::new();
    parsed.insert(table_name_for(&file.name), table);
    Ok(parsed)
}

/// Parse every sheet of a workbook; sheets with no rows at all are left out
pub fn parse_spreadsheet(file: &UploadedFile) -> ParseResult<ParsedFile> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.bytes.as_slice()))?;
    let sheet_names = workbook.sheet_names();
    debug!("Found {} sheets in {}", sheet_names.len(), file.name);

    let mut parsed = ParsedFile::new();
    for sheet_name in sheet_names {
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect::<Row>());
        let Some(header_row) = rows.next() else {
            debug!("Skipping empty sheet: {}", sheet_name);
            continue;
        };

        let headers = header_row.iter().map(CellValue::to_header).collect();
        let table = ParsedTable::new(headers, rows.collect());
        report_ragged(&sheet_name, &table);
        parsed.insert(sheet_name, table);
    }

    Ok(parsed)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        other => CellValue::String(other.to_string()),
    }
}

// Ragged rows pass through unchanged.
fn report_ragged(name: &str, table: &ParsedTable) {
    let ragged = table.ragged_rows();
    if !ragged.is_empty() {
        warn!(
            "{}: {} of {} rows do not match the {} header columns",
            name,
            ragged.len(),
            table.row_count,
            table.column_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_file(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    #[test]
    fn parses_sales_example() {
        let parsed = parse_delimited_text(&csv_file("sales.csv", "id,amount\n1,100\n"))
            .expect("Should parse");
        let table = &parsed["sales"];
        assert_eq!(table.headers, vec!["id", "amount"]);
        assert_eq!(table.rows, vec![vec![CellValue::from("1"), CellValue::from("100")]]);
        assert_eq!(table.row_count, 1);
        assert_eq!(table.column_count, 2);
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = parse_delimited_text(&csv_file("blank.csv", "")).unwrap_err();
        assert!(matches!(err, ParseError::EmptyInput(name) if name == "blank.csv"));

        let err = parse_delimited_text(&csv_file("blank.csv", "\n\n\n")).unwrap_err();
        assert!(matches!(err, ParseError::EmptyInput(_)));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let parsed = parse_delimited_text(&csv_file("h.csv", "a,b,c\n")).unwrap();
        assert_eq!(parsed["h"].row_count, 0);
        assert_eq!(parsed["h"].column_count, 3);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let parsed =
            parse_delimited_text(&csv_file("gaps.csv", "a,b\n\n1,2\n\n3,4\n")).unwrap();
        assert_eq!(parsed["gaps"].row_count, 2);
    }

    #[test]
    fn ragged_rows_pass_through() {
        let parsed = parse_delimited_text(&csv_file("r.csv", "a,b\n1\n1,2,3\n")).unwrap();
        let table = &parsed["r"];
        assert_eq!(table.rows[0].len(), 1);
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.ragged_rows(), vec![0, 1]);
    }

    #[test]
    fn detects_common_delimiters() {
        assert_eq!(detect_delimiter("a,b\n1,2"), b',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(detect_delimiter("a;b\n1;2"), b';');
        assert_eq!(detect_delimiter("a|b\n1|2"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn ragged_lines_do_not_defeat_detection() {
        assert_eq!(detect_delimiter("id;name;amount\n1;Ada\n2;Bob;7"), b';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\n3\t4\t5\t6\n7\t8\t9"), b'\t');
        // The most consistent candidate wins over one that also splits
        assert_eq!(detect_delimiter("a;b,c\n1;2,3\n4;5"), b';');
    }

    #[tokio::test]
    async fn ragged_semicolon_file_keeps_its_columns() {
        let parsed = parse_file(&csv_file("eu.csv", "id;name;amount\n1;Ada\n2;Bob;7\n"))
            .await
            .unwrap();
        let table = &parsed["eu"];
        assert_eq!(table.headers, vec!["id", "name", "amount"]);
        assert_eq!(table.column_count, 3);
        assert_eq!(table.rows[0], vec![CellValue::from("1"), CellValue::from("Ada")]);
        assert_eq!(table.rows[1][2], CellValue::from("7"));
        assert_eq!(table.ragged_rows(), vec![0]);
    }

    #[test]
    fn quoted_commas_do_not_confuse_semicolon_files() {
        let text = "name;note\n\"Smith, J\";ok\n\"Doe, A\";late";
        assert_eq!(detect_delimiter(text), b';');
        let parsed = parse_delimited_text(&csv_file("people.csv", text)).unwrap();
        assert_eq!(parsed["people"].rows[0][0], CellValue::from("Smith, J"));
    }

    #[test]
    fn table_name_strips_final_extension_only() {
        assert_eq!(table_name_for("report.2024.csv"), "report.2024");
        assert_eq!(table_name_for("plain"), "plain");
    }

    #[test]
    fn file_kind_is_case_insensitive() {
        assert_eq!(FileKind::from_name("A.CSV").unwrap(), FileKind::Delimited);
        assert_eq!(FileKind::from_name("b.Xlsx").unwrap(), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("c.xls").unwrap(), FileKind::Spreadsheet);
    }

    #[tokio::test]
    async fn unsupported_extension_is_named() {
        let err = parse_file(&csv_file("notes.TXT", "hello")).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFileType(ext) if ext == "txt"));
    }

    #[test]
    fn extensionless_name_is_its_own_extension() {
        let err = FileKind::from_name("README").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFileType(ext) if ext == "readme"));
    }

    #[tokio::test]
    async fn malformed_workbook_is_a_spreadsheet_error() {
        let file = UploadedFile::new("broken.xlsx", b"not a zip".to_vec());
        let err = parse_file(&file).await.unwrap_err();
        assert!(matches!(err, ParseError::Spreadsheet(_)));
    }
}
