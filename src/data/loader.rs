use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::clean::{clean_table, CleanSummary};
use super::error::LoadError;
use super::model::{CellValue, ObservationTable};

/// Cell texts read as a missing value, matching what spreadsheet tools export.
const MISSING_MARKERS: &[&str] = &[
    "", "NaN", "nan", "NAN", "NA", "N/A", "n/a", "null", "NULL", "None", "#N/A",
];

/// Tabular formats the loader understands, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `.csv` – comma-delimited text
    Csv,
    /// `.tbl` – tab-delimited text (AstroImageJ measurement tables)
    Tbl,
    /// `.xlsx` / `.xls` – first worksheet of a workbook
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "tbl" => Ok(TableFormat::Tbl),
            "xlsx" | "xls" => Ok(TableFormat::Spreadsheet),
            other => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }
}

/// A successfully loaded file.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: ObservationTable,
    /// Column name → value list, for ad-hoc access to any column.
    pub column_lists: BTreeMap<String, Vec<CellValue>>,
    /// Present when cleaning was requested.
    pub cleaning: Option<CleanSummary>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an observation table, optionally dropping rows with missing values.
pub fn load_table(path: &Path, clean: bool) -> Result<LoadedTable, LoadError> {
    let mut table = read_table(path)?;
    log::debug!(
        "Read {} rows with columns {:?} from {}",
        table.len(),
        table.column_names().collect::<Vec<_>>(),
        path.display()
    );

    let cleaning = if clean {
        let name = path.display().to_string();
        let summary = clean_table(&mut table, &name).map_err(|source| LoadError::Schema {
            path: path.to_path_buf(),
            source,
        })?;
        Some(summary)
    } else {
        None
    };

    let column_lists = table.column_lists();
    Ok(LoadedTable {
        table,
        column_lists,
        cleaning,
    })
}

/// Read a file into a table without any cleaning. Dispatch by extension.
pub fn read_table(path: &Path) -> Result<ObservationTable, LoadError> {
    let format = TableFormat::from_path(path)?;

    if let Err(e) = std::fs::metadata(path) {
        return Err(io_error(path, e));
    }

    match format {
        TableFormat::Csv => read_delimited(path, b','),
        TableFormat::Tbl => read_delimited(path, b'\t'),
        TableFormat::Spreadsheet => read_spreadsheet(path),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn parse_error(path: &Path, message: impl ToString) -> LoadError {
    LoadError::Parse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader (.csv / .tbl)
// ---------------------------------------------------------------------------

/// Header row with column names, one observation per following line.
fn read_delimited(path: &Path, delimiter: u8) -> Result<ObservationTable, LoadError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if raw_headers.is_empty() {
        return Err(parse_error(path, "no columns to parse from file"));
    }
    let headers = normalize_headers(raw_headers);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_error(path, e))?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(row_no as u64 + 2);
            return Err(parse_error(
                path,
                format!(
                    "expected {} fields in line {line}, saw {}",
                    headers.len(),
                    record.len()
                ),
            ));
        }
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(ObservationTable::from_rows(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if MISSING_MARKERS.contains(&s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

/// Name blank headers `Unnamed: <i>` and suffix repeated names with `.1`, `.2`, ...
/// skipping any suffix that is already taken by another header.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, h)| if h.is_empty() { format!("Unnamed: {i}") } else { h })
        .collect();

    let mut used: HashSet<String> = HashSet::with_capacity(named.len());
    let mut headers = Vec::with_capacity(named.len());
    for base in &named {
        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        used.insert(name.clone());
        headers.push(name);
    }
    headers
}

// ---------------------------------------------------------------------------
// Spreadsheet loader (.xlsx / .xls)
// ---------------------------------------------------------------------------

/// First worksheet only; its first row is the header.
fn read_spreadsheet(path: &Path) -> Result<ObservationTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| parse_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error(path, "workbook has no worksheets"))?
        .map_err(|e| parse_error(path, e))?;

    table_from_range(&range).ok_or_else(|| parse_error(path, "no columns to parse from worksheet"))
}

/// Blank rows are dropped. `None` when the sheet has no header row.
fn table_from_range(range: &Range<Data>) -> Option<ObservationTable> {
    let mut sheet_rows = range.rows();
    let header_row = sheet_rows.next()?;
    let headers = normalize_headers(
        header_row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
    );

    let rows = sheet_rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Some(ObservationTable::from_rows(headers, rows))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => {
            if MISSING_MARKERS.contains(&s.trim()) {
                CellValue::Missing
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::TIMESTAMP_COLUMN;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn dispatches_by_extension_case_insensitively() {
        assert_eq!(TableFormat::from_path(Path::new("a.CSV")).unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("a.tbl")).unwrap(), TableFormat::Tbl);
        assert_eq!(
            TableFormat::from_path(Path::new("a.xls")).unwrap(),
            TableFormat::Spreadsheet
        );
        assert!(matches!(
            TableFormat::from_path(Path::new("a.json")),
            Err(LoadError::UnsupportedFormat { extension, .. }) if extension == "json"
        ));
    }

    #[test]
    fn reads_csv_with_types_and_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "obs.csv",
            "BJD_TDB,Source_AMag_T1,Filter\n2459000.1,12.5,V\n2459000.2,NaN,V\n2459000.3,,\n",
        );
        let loaded = load_table(&path, false).unwrap();
        assert_eq!(loaded.table.len(), 3);
        assert!(loaded.cleaning.is_none());

        let mags = loaded.table.column("Source_AMag_T1").unwrap();
        assert_eq!(mags[0], CellValue::Float(12.5));
        assert_eq!(mags[1], CellValue::Missing);
        assert_eq!(mags[2], CellValue::Missing);
        assert_eq!(loaded.column_lists["Filter"][0], CellValue::Text("V".into()));
    }

    #[test]
    fn reads_tab_delimited_tbl_with_unnamed_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "obs.tbl",
            "\tBJD_TDB\tSource_AMag_T1\n1\t2459000.1\t12.5\n2\t2459000.2\t12.6\n",
        );
        let table = read_table(&path).unwrap();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["Unnamed: 0", TIMESTAMP_COLUMN, "Source_AMag_T1"]);
        assert_eq!(table.column("Unnamed: 0").unwrap()[1], CellValue::Integer(2));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = normalize_headers(vec!["a".into(), "a".into(), "".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn suffixed_headers_never_collide_with_existing_names() {
        let headers = normalize_headers(vec!["a".into(), "a".into(), "a.1".into()]);
        assert_eq!(headers, vec!["a", "a.1", "a.1.1"]);

        let headers = normalize_headers(vec!["a.1".into(), "a".into(), "a".into(), "a".into()]);
        assert_eq!(headers, vec!["a.1", "a", "a.2", "a.3"]);

        let unique: HashSet<&String> = headers.iter().collect();
        assert_eq!(unique.len(), headers.len());
    }

    #[test]
    fn overlong_row_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.csv", "BJD_TDB,mag\n1.0,2.0\n1.0,2.0,3.0\n");
        assert!(matches!(load_table(&path, false), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(load_table(&path, false), Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn unsupported_extension_is_reported_before_touching_the_disk() {
        let err = load_table(Path::new("/definitely/not/here.txt"), false).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn clean_flag_drops_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "obs.csv", "BJD_TDB,mag\n1.0,2.0\n1.5,\n2.0,2.1\n");
        let loaded = load_table(&path, true).unwrap();
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.cleaning.unwrap().removed_rows, 1);
        assert_eq!(loaded.column_lists["mag"].len(), 2);
    }

    #[test]
    fn clean_flag_without_timestamp_fails_with_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "obs.csv", "time,mag\n1.0,2.0\n");
        assert!(matches!(load_table(&path, true), Err(LoadError::Schema { .. })));
        // Loading without cleaning does not look at the columns.
        assert!(load_table(&path, false).is_ok());
    }

    #[test]
    fn spreadsheet_cells_map_to_cell_values() {
        assert_eq!(spreadsheet_cell(&Data::Int(4)), CellValue::Integer(4));
        assert_eq!(spreadsheet_cell(&Data::Empty), CellValue::Missing);
        assert_eq!(spreadsheet_cell(&Data::String("#N/A".into())), CellValue::Missing);
        assert_eq!(
            spreadsheet_cell(&Data::String("V".into())),
            CellValue::Text("V".into())
        );
    }

    #[test]
    fn worksheet_range_becomes_a_table() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((0, 1), Data::String("BJD_TDB".into()));
        range.set_value((0, 2), Data::String("BJD_TDB".into()));
        range.set_value((1, 0), Data::Int(1));
        range.set_value((1, 1), Data::Float(2459000.1));
        // Row 2 stays blank.
        range.set_value((3, 0), Data::Int(2));
        range.set_value((3, 2), Data::String("NaN".into()));

        let table = table_from_range(&range).unwrap();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["Unnamed: 0", TIMESTAMP_COLUMN, "BJD_TDB.1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column(TIMESTAMP_COLUMN).unwrap()[0], CellValue::Float(2459000.1));
        assert_eq!(table.column(TIMESTAMP_COLUMN).unwrap()[1], CellValue::Missing);
        assert_eq!(table.column("BJD_TDB.1").unwrap()[1], CellValue::Missing);
    }

    #[test]
    fn empty_worksheet_has_no_table() {
        let range: Range<Data> = Range::empty();
        assert!(table_from_range(&range).is_none());
    }

    #[test]
    fn reads_first_worksheet_of_an_xlsx_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/night.xlsx");
        let loaded = load_table(&path, false).unwrap();
        let table = &loaded.table;

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["Unnamed: 0", TIMESTAMP_COLUMN, "Source_AMag_T1", "Filter"]);
        // The blank fourth sheet row is skipped.
        assert_eq!(table.len(), 3);

        let timestamps = table.column(TIMESTAMP_COLUMN).unwrap();
        assert_eq!(timestamps[0], CellValue::Float(2459000.1));
        assert_eq!(timestamps[2], CellValue::Float(2459000.3));

        let mags = table.column("Source_AMag_T1").unwrap();
        assert_eq!(mags[0], CellValue::Float(12.5));
        assert_eq!(mags[1], CellValue::Missing);

        let filters = table.column("Filter").unwrap();
        assert_eq!(filters[0], CellValue::Text("V".into()));
        assert_eq!(filters[2], CellValue::Missing);

        let cleaned = load_table(&path, true).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.cleaning.unwrap().removed_rows, 2);
    }

    #[test]
    fn corrupt_spreadsheet_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.xlsx", "this is not a zip archive");
        assert!(matches!(read_table(&path), Err(LoadError::Parse { .. })));
    }
}
