use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, ProjectRecord, ProjectTable};
use super::schema::{normalize_label, Field, FieldKind, UNKNOWN};
use crate::config::DataSourceConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The project source could not be turned into a table. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("worksheet '{sheet}' not found (available: {available:?})")]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("no header row after skipping {skip_rows} rows")]
    MissingHeader { skip_rows: usize },

    #[error("required column '{0}' not found")]
    MissingColumn(&'static str),

    #[error("invalid JSON layout: {0}")]
    JsonLayout(&'static str),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Raw table – what every format reader produces
// ---------------------------------------------------------------------------

/// Header row plus data rows, exactly as read from the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

static TABLE_CACHE: OnceLock<Mutex<HashMap<DataSourceConfig, Arc<ProjectTable>>>> = OnceLock::new();

/// Load the project table, reusing the result of an earlier load with the
/// same path, sheet and skip-rows. Failed loads are not cached.
pub fn load_projects(source: &DataSourceConfig) -> Result<Arc<ProjectTable>, DataSourceError> {
    let cache = TABLE_CACHE.get_or_init(Default::default);

    if let Some(table) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(source)
    {
        debug!("Using cached table for {}", source.path.display());
        return Ok(Arc::clone(table));
    }

    let table = Arc::new(load_file(source)?);
    cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(source.clone(), Arc::clone(&table));
    Ok(table)
}

/// Read and clean a project table without consulting the cache.
pub fn load_file(source: &DataSourceConfig) -> Result<ProjectTable, DataSourceError> {
    let raw = read_raw(&source.path, &source.sheet, source.skip_rows)?;
    let table = clean(raw)?;
    info!(
        "Loaded {} projects from {} ({} of {} known columns)",
        table.len(),
        source.path.display(),
        table.columns.len(),
        Field::ALL.len()
    );
    Ok(table)
}

/// Read a source into a [`RawTable`]. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` `.xlsm` `.xlsb` `.xls` `.ods` – worksheet `sheet`, after `skip_rows` title rows
/// * `.csv`     – header after `skip_rows` lines
/// * `.json`    – `[{ "Project ID": "VCS1", "Country": "Peru", ... }, ...]`
/// * `.parquet` – one column per field
pub fn read_raw(path: &Path, sheet: &str, skip_rows: usize) -> Result<RawTable, DataSourceError> {
    std::fs::metadata(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet, skip_rows),
        "csv" => load_csv(path, skip_rows),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataSourceError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Cleaning pipeline
// ---------------------------------------------------------------------------

/// Turn a raw table into project records:
///
/// 1. normalise header labels
/// 2. rename known labels to canonical fields
/// 3. keep only canonical fields
/// 4. drop rows without a project id
/// 5. coerce measures (anything unparsable becomes 0)
/// 6. fill empty categories with [`UNKNOWN`]
pub fn clean(raw: RawTable) -> Result<ProjectTable, DataSourceError> {
    let mut columns = BTreeSet::new();
    let mut column_map: Vec<(usize, Field)> = Vec::new();

    for (idx, header) in raw.headers.iter().enumerate() {
        let label = normalize_label(header);
        match Field::from_label(&label) {
            Some(field) if columns.insert(field) => column_map.push((idx, field)),
            Some(field) => debug!("Ignoring duplicate column '{label}' for {}", field.key()),
            None => debug!("Dropping unrecognised column '{label}'"),
        }
    }

    let id_idx = column_map
        .iter()
        .find(|(_, f)| *f == Field::ProjectId)
        .map(|(idx, _)| *idx)
        .ok_or(DataSourceError::MissingColumn(Field::ProjectId.key()))?;

    for gap in Field::ALL.iter().filter(|f| !columns.contains(f)) {
        warn!("Column '{}' missing from source; treated as empty", gap.raw_label());
    }

    let null = CellValue::Null;
    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = 0usize;

    for row in &raw.rows {
        let cell = |idx: usize| row.get(idx).unwrap_or(&null);

        let Some(project_id) = cell(id_idx).as_text() else {
            dropped += 1;
            continue;
        };

        let mut record = ProjectRecord::new(project_id.trim());
        for &(idx, field) in &column_map {
            let value = cell(idx);
            record = match field.kind() {
                FieldKind::Identifier => record,
                FieldKind::Text => match value.as_text() {
                    Some(text) => record.with_attribute(field, text),
                    None => record,
                },
                FieldKind::Category => record.with_attribute(
                    field,
                    value.as_text().unwrap_or_else(|| UNKNOWN.to_string()),
                ),
                FieldKind::Measure => record.with_measure(field, coerce_measure(value)),
                FieldKind::Year => match value.as_year() {
                    Some(year) => record.with_vintage_year(year),
                    None => record,
                },
            };
        }
        records.push(record);
    }

    if dropped > 0 {
        debug!("Dropped {dropped} rows without a project id");
    }

    Ok(ProjectTable::new(records, columns))
}

/// Credit quantities are non-negative; anything else reads as zero.
pub fn coerce_measure(value: &CellValue) -> f64 {
    value
        .as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, sheet: &str, skip_rows: usize) -> Result<RawTable, DataSourceError> {
    let mut workbook = open_workbook_auto(path)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(DataSourceError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet)?;

    // The range starts at the first used cell, but skip_rows counts from
    // the top of the sheet.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows().skip(skip_rows.saturating_sub(first_row));

    let header = rows
        .next()
        .ok_or(DataSourceError::MissingHeader { skip_rows })?;
    let headers = header.iter().map(|c| workbook_cell(c).to_string()).collect();
    let rows = rows
        .map(|r| r.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn workbook_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: `skip_rows` free-form lines, a header row, then data rows.
/// Short rows are padded with nulls.
fn load_csv(path: &Path, skip_rows: usize) -> Result<RawTable, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records().skip(skip_rows);
    let headers: Vec<String> = records
        .next()
        .ok_or(DataSourceError::MissingHeader { skip_rows })??
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        let mut row: Vec<CellValue> = record.iter().map(CellValue::from_csv).collect();
        row.resize(headers.len().max(row.len()), CellValue::Null);
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Project ID": "VCS902", "Country": "Peru", "Total Credits Issued": 1200 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable, DataSourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or(DataSourceError::JsonLayout("expected top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec
            .as_object()
            .ok_or(DataSourceError::JsonLayout("every row must be a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field. Works with files written
/// by **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable, DataSourceError> {
    let file = std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut table = RawTable::default();

    for batch_result in reader {
        let batch = batch_result?;
        if table.headers.is_empty() {
            table.headers = batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
        }

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect();
            table.rows.push(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            CellValue::Float(col.as_primitive::<UInt64Type>().value(row) as f64)
        }
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row).into())
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Strings, dates and everything else go through Arrow's formatter.
        _ => match array_value_to_string(col, row) {
            Ok(s) => CellValue::Text(s),
            Err(e) => {
                debug!("Unreadable {:?} cell at row {row}: {e}", col.data_type());
                CellValue::Null
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn create_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_numeric_coercion() {
        let raw = RawTable {
            headers: vec!["Project ID".into(), "Total Credits\nIssued".into()],
            rows: vec![
                vec![text("P1"), CellValue::Integer(100)],
                vec![text("P2"), text("bad")],
                vec![text("P3"), CellValue::Null],
                vec![text("P4"), CellValue::Float(50.0)],
            ],
        };
        let table = clean(raw).unwrap();
        let issued: Vec<f64> = (0..table.len())
            .map(|row| table.measure(row, Field::TotalCreditsIssued))
            .collect();
        assert_eq!(issued, vec![100.0, 0.0, 0.0, 50.0]);
    }

    #[test]
    fn test_negative_and_non_finite_measures_read_as_zero() {
        assert_eq!(coerce_measure(&CellValue::Integer(-5)), 0.0);
        assert_eq!(coerce_measure(&CellValue::Float(f64::NAN)), 0.0);
        assert_eq!(coerce_measure(&text("inf")), 0.0);
        assert_eq!(coerce_measure(&text(" 12.5 ")), 12.5);
    }

    #[test]
    fn test_null_project_id_dropped_and_unknown_filled() {
        let raw = RawTable {
            headers: vec!["Project ID".into(), "Country".into(), "State".into()],
            rows: vec![
                vec![CellValue::Null, text("Peru"), text("Cusco")],
                vec![text("P1"), CellValue::Null, CellValue::Null],
                vec![text("   "), text("Chile"), CellValue::Null],
            ],
        };
        let table = clean(raw).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].project_id, "P1");
        assert_eq!(table.category(0, Field::Country), Some(UNKNOWN));
        // Text fields are not filled.
        assert_eq!(table.records[0].attribute(Field::State), None);
    }

    #[test]
    fn test_unknown_columns_dropped_and_gaps_recorded() {
        let raw = RawTable {
            headers: vec!["Project ID".into(), "Notes".into(), " Voluntary\nRegistry ".into()],
            rows: vec![vec![text("P1"), text("free text"), text("VCS")]],
        };
        let table = clean(raw).unwrap();
        assert_eq!(
            table.columns,
            BTreeSet::from([Field::ProjectId, Field::VoluntaryRegistry])
        );
        assert_eq!(table.category(0, Field::VoluntaryRegistry), Some("VCS"));
        assert!(table.schema_gaps.contains(&Field::Country));
    }

    #[test]
    fn test_missing_project_id_column_is_an_error() {
        let raw = RawTable {
            headers: vec!["Country".into()],
            rows: vec![vec![text("Peru")]],
        };
        assert!(matches!(
            clean(raw),
            Err(DataSourceError::MissingColumn("Project ID"))
        ));
    }

    #[test]
    fn test_integral_float_ids_and_years() {
        let raw = RawTable {
            headers: vec!["Project ID".into(), "First Year of Project (Vintage)".into()],
            rows: vec![
                vec![CellValue::Float(902.0), CellValue::Float(2012.0)],
                vec![text("ACR1"), text("n/a")],
            ],
        };
        let table = clean(raw).unwrap();
        assert_eq!(table.records[0].project_id, "902");
        assert_eq!(table.records[0].first_vintage_year, Some(2012));
        assert_eq!(table.records[1].first_vintage_year, None);
    }

    #[test]
    fn test_csv_with_title_rows() {
        let file = create_file(
            ".csv",
            "Voluntary Registry Offsets Database\nVersion 2025-06\nSource: registry export\n\
             Project ID,Voluntary Registry,\"Total Credits\nIssued\",Country\n\
             VCS1,VCS,100,Peru\n\
             ,,,\n\
             GS2,GOLD,bad\n",
        );
        let source = DataSourceConfig::new(file.path()).with_skip_rows(3);
        let table = load_file(&source).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].project_id, "VCS1");
        assert_eq!(table.measure(0, Field::TotalCreditsIssued), 100.0);
        assert_eq!(table.measure(1, Field::TotalCreditsIssued), 0.0);
        assert_eq!(table.category(1, Field::Country), Some(UNKNOWN));
    }

    #[test]
    fn test_csv_keeps_numeric_looking_text() {
        let file = create_file(
            ".csv",
            "Project ID,Methodology Version,Type,Total Credits Issued\n\
             007,1.0,1e3,12\n\
             P2,4.10,REDD+,7.5\n",
        );
        let table = load_file(&DataSourceConfig::new(file.path()).with_skip_rows(0)).unwrap();

        assert_eq!(table.records[0].project_id, "007");
        assert_eq!(table.records[0].attribute(Field::MethodologyVersion), Some("1.0"));
        assert_eq!(table.category(0, Field::Type), Some("1e3"));
        assert_eq!(table.records[1].attribute(Field::MethodologyVersion), Some("4.10"));
        // Measures are still parsed from the text.
        assert_eq!(table.measure(0, Field::TotalCreditsIssued), 12.0);
        assert_eq!(table.measure(1, Field::TotalCreditsIssued), 7.5);
    }

    /// A `PROJECTS` sheet laid out like a registry export: a blank first
    /// row, two title rows, a wrapped header on row 3, then data.
    fn registry_workbook() -> NamedTempFile {
        use rust_xlsxwriter::Workbook;

        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("PROJECTS").unwrap();

        sheet.write(1, 0, "Voluntary Registry Offsets Database").unwrap();
        sheet.write(2, 0, "Source: registry export").unwrap();

        let headers = ["Project ID", "Total Credits\nIssued", "Country", "Voluntary\nRegistry"];
        for (col, label) in headers.iter().enumerate() {
            sheet.write(3, col as u16, *label).unwrap();
        }

        sheet.write(4, 0, 1234.0).unwrap();
        sheet.write(4, 1, "bad").unwrap();
        sheet.write(4, 3, "VCS").unwrap();

        sheet.write(5, 0, "P2").unwrap();
        sheet.write(5, 1, 50.0).unwrap();
        sheet.write(5, 2, "Brazil").unwrap();
        sheet.write(5, 3, "GOLD").unwrap();

        workbook.save(file.path()).unwrap();
        file
    }

    #[test]
    fn test_workbook_with_title_rows() {
        let file = registry_workbook();
        let table = load_file(&DataSourceConfig::new(file.path())).unwrap();

        let ids: Vec<&str> = table.records.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(ids, vec!["1234", "P2"]);
        assert_eq!(table.measure(0, Field::TotalCreditsIssued), 0.0);
        assert_eq!(table.measure(1, Field::TotalCreditsIssued), 50.0);
        assert_eq!(table.category(0, Field::Country), Some(UNKNOWN));
        assert_eq!(table.category(1, Field::Country), Some("Brazil"));
        assert_eq!(table.category(1, Field::VoluntaryRegistry), Some("GOLD"));
    }

    #[test]
    fn test_workbook_sheet_not_found() {
        let file = registry_workbook();
        let err = read_raw(file.path(), "Nope", 3).unwrap_err();
        match err {
            DataSourceError::SheetNotFound { sheet, available } => {
                assert_eq!(sheet, "Nope");
                assert_eq!(available, vec!["PROJECTS".to_string()]);
            }
            other => panic!("expected SheetNotFound, got {other}"),
        }
    }

    #[test]
    fn test_csv_skip_past_end_has_no_header() {
        let file = create_file(".csv", "only one line\n");
        let err = read_raw(file.path(), "", 5).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingHeader { skip_rows: 5 }));
    }

    #[test]
    fn test_json_records() {
        let file = create_file(
            ".json",
            r#"[
                {"Project ID": "P1", "Region": "Asia", "Total_Credits_Retired": 7},
                {"Project ID": null, "Region": "Europe"},
                {"Project ID": "P3", "Region": null}
            ]"#,
        );
        let table = load_file(&DataSourceConfig::new(file.path())).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.measure(0, Field::TotalCreditsRetired), 7.0);
        assert_eq!(table.category(1, Field::Region), Some(UNKNOWN));
    }

    #[test]
    fn test_json_must_be_array() {
        let file = create_file(".json", r#"{"Project ID": "P1"}"#);
        assert!(matches!(
            read_raw(file.path(), "", 0),
            Err(DataSourceError::JsonLayout(_))
        ));
    }

    #[test]
    fn test_parquet_columns() {
        use arrow::array::{Float64Array, StringArray};
        use arrow::datatypes::{Field as ArrowField, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("Project ID", DataType::Utf8, true),
            ArrowField::new("Total Credits Issued", DataType::Float64, true),
            ArrowField::new("Country", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("P1"), None, Some("P3")])),
                Arc::new(Float64Array::from(vec![Some(5.0), Some(1.0), None])),
                Arc::new(StringArray::from(vec![Some("Brazil"), Some("Peru"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&DataSourceConfig::new(file.path())).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.category(0, Field::Country), Some("Brazil"));
        assert_eq!(table.measure(1, Field::TotalCreditsIssued), 0.0);
        assert_eq!(table.category(1, Field::Country), Some(UNKNOWN));
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        let file = create_file(".txt", "Project ID\nP1\n");
        assert!(matches!(
            read_raw(file.path(), "", 0),
            Err(DataSourceError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(matches!(
            read_raw(Path::new("/nonexistent/projects.xlsx"), "PROJECTS", 3),
            Err(DataSourceError::Io { .. })
        ));
    }

    #[test]
    fn test_cache_returns_same_table() {
        let file = create_file(".csv", "Project ID,Scope\nP1,Forestry\n");
        let source = DataSourceConfig::new(file.path()).with_skip_rows(0);

        let first = load_projects(&source).unwrap();
        let second = load_projects(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A different skip-rows is a different cache entry.
        let other = load_projects(&source.clone().with_skip_rows(1));
        assert!(other.is_err() || !Arc::ptr_eq(&first, &other.unwrap()));
    }
}
