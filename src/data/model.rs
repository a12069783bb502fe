use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::schema::Field;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell, before cleaning
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a workbook, CSV, JSON or Parquet
/// source. The cleaning pipeline turns these into typed record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Workbooks store integral ids as floats; print them without `.0`.
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// A CSV cell. Kept as text so ids and versions like "007" or "1.0"
    /// survive; measures are parsed later per field. Empty cells are null.
    pub fn from_csv(s: &str) -> CellValue {
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// Text form of a non-null cell. Blank strings count as missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Numeric interpretation, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Null => None,
        }
    }

    /// Interpret the cell as a calendar year (`2015`, `2015.0`, `"2015"`).
    pub fn as_year(&self) -> Option<i32> {
        let v = self.as_f64()?;
        if v.is_finite() && v.fract() == 0.0 && (1000.0..=9999.0).contains(&v) {
            Some(v as i32)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectRecord – one cleaned row
// ---------------------------------------------------------------------------

/// One carbon-offset project. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    /// Never empty.
    pub project_id: String,
    /// Text and category columns. Absent key = null text cell; category
    /// columns present in the table always have a value.
    attributes: BTreeMap<Field, String>,
    /// Credit measures, finite and non-negative.
    measures: BTreeMap<Field, f64>,
    pub first_vintage_year: Option<i32>,
}

impl ProjectRecord {
    pub fn new(project_id: impl Into<String>) -> Self {
        ProjectRecord {
            project_id: project_id.into(),
            attributes: BTreeMap::new(),
            measures: BTreeMap::new(),
            first_vintage_year: None,
        }
    }

    pub fn with_attribute(mut self, field: Field, value: impl Into<String>) -> Self {
        self.attributes.insert(field, value.into());
        self
    }

    pub fn with_measure(mut self, field: Field, value: f64) -> Self {
        self.measures.insert(field, value);
        self
    }

    pub fn with_vintage_year(mut self, year: i32) -> Self {
        self.first_vintage_year = Some(year);
        self
    }

    /// Text value of a field; the project id is returned for
    /// [`Field::ProjectId`].
    pub fn attribute(&self, field: Field) -> Option<&str> {
        if field == Field::ProjectId {
            return Some(&self.project_id);
        }
        self.attributes.get(&field).map(String::as_str)
    }

    pub fn measure(&self, field: Field) -> f64 {
        self.measures.get(&field).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// ProjectTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The cleaned, immutable project table shared by every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTable {
    pub records: Vec<ProjectRecord>,
    /// Canonical fields that were present in the source.
    pub columns: BTreeSet<Field>,
    /// Expected fields the source did not provide.
    pub schema_gaps: Vec<Field>,
}

impl ProjectTable {
    pub fn new(records: Vec<ProjectRecord>, columns: BTreeSet<Field>) -> Self {
        let schema_gaps = Field::ALL
            .into_iter()
            .filter(|f| !columns.contains(f))
            .collect();
        ProjectTable {
            records,
            columns,
            schema_gaps,
        }
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    /// Category value of a row, `None` when the column is absent.
    pub fn category(&self, row: usize, field: Field) -> Option<&str> {
        if !self.has_column(field) {
            return None;
        }
        self.records.get(row)?.attribute(field)
    }

    /// Measure value of a row, `0.0` when the column is absent.
    pub fn measure(&self, row: usize, field: Field) -> f64 {
        self.records.get(row).map_or(0.0, |r| r.measure(field))
    }

    /// Sorted distinct values of a category over the whole table.
    pub fn distinct_values(&self, field: Field) -> BTreeSet<String> {
        (0..self.len())
            .filter_map(|row| self.category(row, field))
            .map(str::to_owned)
            .collect()
    }
}
