//! Workbook document gateway.
//!
//! Wraps the `umya-spreadsheet` codec behind the handful of primitives the
//! tool handlers need: path-shape validation, create/open/save by path,
//! sheet lookup, a metadata snapshot and the cell scalar model.
//!
//! Every tool call opens the file fresh, mutates the in-memory document and
//! overwrites the same path on save. There is no cross-call caching and no
//! locking; two concurrent calls racing on one path are unsupported by
//! design.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use umya_spreadsheet::{Cell, CellRawValue, Spreadsheet, Worksheet};

use crate::error::{WorkbookError, WorkbookResult};

/// File extensions the codec can actually parse.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Sentinel reported for workbook metadata fields absent from the file.
pub const UNKNOWN_METADATA: &str = "unknown";

/// Validates the shape of a workbook path: absolute, with a supported
/// extension. The file itself is not touched.
///
/// # Errors
///
/// Returns [`WorkbookError::InvalidArgument`] when the path is empty,
/// relative or has an unsupported extension.
pub fn validate_workbook_path(raw: &str) -> WorkbookResult<PathBuf> {
    if raw.trim().is_empty() {
        return Err(WorkbookError::invalid_argument("file path is empty"));
    }

    let path = Path::new(raw);

    let extension_ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        });
    if !extension_ok {
        return Err(WorkbookError::invalid_argument(format!(
            "file extension must be one of: .{} (got '{raw}')",
            SUPPORTED_EXTENSIONS.join(", .")
        )));
    }

    if !path.is_absolute() {
        return Err(WorkbookError::invalid_argument(format!(
            "file path must be absolute (got '{raw}')"
        )));
    }

    Ok(path.to_path_buf())
}

/// Creates a brand-new, zero-sheet workbook at `path`, silently overwriting
/// any existing file.
///
/// # Errors
///
/// Returns an error if the path shape is invalid or the write fails.
pub fn create(raw_path: &str) -> WorkbookResult<PathBuf> {
    let path = validate_workbook_path(raw_path)?;
    let book = umya_spreadsheet::new_file_empty_worksheet();
    save(&book, &path)?;
    Ok(path)
}

/// Opens the workbook at `path`, reading the file fresh.
///
/// # Errors
///
/// Returns [`WorkbookError::InvalidArgument`] on path-shape violations and
/// [`WorkbookError::FileNotFound`] when the file is missing or the codec
/// cannot parse it.
pub fn open(raw_path: &str) -> WorkbookResult<(PathBuf, Spreadsheet)> {
    let path = validate_workbook_path(raw_path)?;

    if !path.exists() {
        return Err(WorkbookError::FileNotFound { path });
    }

    match umya_spreadsheet::reader::xlsx::read(&path) {
        Ok(book) => Ok((path, book)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "workbook parse failed");
            Err(WorkbookError::FileNotFound { path })
        }
    }
}

/// Persists the document, overwriting `path`.
///
/// # Errors
///
/// Returns [`WorkbookError::FileWrite`] on any write failure.
pub fn save(book: &Spreadsheet, path: &Path) -> WorkbookResult<()> {
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(|e| WorkbookError::FileWrite {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Returns the workbook's sheet names in document order (insertion order,
/// not sorted).
#[must_use]
pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

/// Comma-joined sheet name listing for error messages.
#[must_use]
pub fn sheet_names_joined(book: &Spreadsheet) -> String {
    sheet_names(book).join(", ")
}

/// Looks up a worksheet by exact, case-sensitive name.
///
/// # Errors
///
/// Returns [`WorkbookError::SheetNotFound`] embedding the available sheet
/// names when no sheet matches.
pub fn require_sheet<'a>(book: &'a Spreadsheet, name: &str) -> WorkbookResult<&'a Worksheet> {
    let available = sheet_names_joined(book);
    book.get_sheet_by_name(name)
        .ok_or_else(move || WorkbookError::sheet_not_found(name, available))
}

/// Mutable variant of [`require_sheet`].
///
/// # Errors
///
/// Returns [`WorkbookError::SheetNotFound`] embedding the available sheet
/// names when no sheet matches.
pub fn require_sheet_mut<'a>(
    book: &'a mut Spreadsheet,
    name: &str,
) -> WorkbookResult<&'a mut Worksheet> {
    let available = sheet_names_joined(book);
    book.get_sheet_by_name_mut(name)
        .ok_or_else(move || WorkbookError::sheet_not_found(name, available))
}

/// Read-only workbook metadata snapshot.
#[derive(Debug, Serialize)]
pub struct WorkbookInfo {
    /// Path the workbook was read from.
    pub path: String,
    /// Number of worksheets.
    pub sheet_count: usize,
    /// Sheet names in document order.
    pub sheet_names: Vec<String>,
    /// Document creator, or `"unknown"`.
    pub creator: String,
    /// Last modifier, or `"unknown"`.
    pub last_modified_by: String,
    /// Creation timestamp (RFC 3339 when parseable), or `"unknown"`.
    pub created: String,
    /// Modification timestamp (RFC 3339 when parseable), or `"unknown"`.
    pub modified: String,
}

impl WorkbookInfo {
    /// Builds the snapshot from an opened document.
    #[must_use]
    pub fn from_book(path: &Path, book: &Spreadsheet) -> Self {
        let names = sheet_names(book);
        let properties = book.get_properties();

        Self {
            path: path.to_string_lossy().into_owned(),
            sheet_count: names.len(),
            sheet_names: names,
            creator: metadata_or_unknown(properties.get_creator()),
            last_modified_by: metadata_or_unknown(properties.get_last_modified_by()),
            created: timestamp_or_unknown(properties.get_created()),
            modified: timestamp_or_unknown(properties.get_modified()),
        }
    }
}

fn metadata_or_unknown(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN_METADATA.to_string()
    } else {
        value.to_string()
    }
}

/// Normalises a stored timestamp to RFC 3339. Unparseable but non-empty
/// values pass through as-is.
fn timestamp_or_unknown(value: &str) -> String {
    if value.is_empty() {
        return UNKNOWN_METADATA.to_string();
    }
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| value.to_string(),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// A plain scalar cell value as it appears on the wire: text, number or
/// boolean. Formulas are a distinct value kind handled separately.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellScalar {
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl CellScalar {
    /// Writes this scalar into a cell, preserving whatever formatting the
    /// cell already carries (value and style are orthogonal).
    pub fn write_to(&self, cell: &mut Cell) {
        match self {
            Self::Bool(b) => {
                cell.set_value_bool(*b);
            }
            Self::Number(n) => {
                cell.set_value_number(*n);
            }
            Self::Text(t) => {
                cell.set_value_string(t.clone());
            }
        }
    }
}

impl fmt::Display for CellScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

/// A search needle for `find_data`: text or number, matched with exact
/// type-and-value equality (a number never matches numeric-looking text).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SearchScalar {
    /// Numeric needle.
    Number(f64),
    /// Text needle.
    Text(String),
}

impl fmt::Display for SearchScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

impl SearchScalar {
    /// Tests a cell for an exact type-and-value match.
    #[must_use]
    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Self::Number(needle) => {
                matches!(cell.get_raw_value(), CellRawValue::Numeric(v) if *v == *needle)
            }
            Self::Text(needle) => {
                !matches!(
                    cell.get_raw_value(),
                    CellRawValue::Numeric(_) | CellRawValue::Bool(_) | CellRawValue::Empty
                ) && cell.get_value() == needle.as_str()
            }
        }
    }
}

/// Renders a cell's stored value as a typed JSON value: numbers as numbers,
/// booleans as booleans, everything else as text, empty cells as `null`.
#[must_use]
pub fn cell_json_value(cell: &Cell) -> serde_json::Value {
    match cell.get_raw_value() {
        CellRawValue::Numeric(n) => serde_json::Number::from_f64(*n)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        CellRawValue::Bool(b) => serde_json::Value::Bool(*b),
        CellRawValue::Empty => serde_json::Value::Null,
        _ => serde_json::Value::String(cell.get_value().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_relative_path() {
        let err = validate_workbook_path("report.xlsx").unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidArgument { .. }));
    }

    #[test]
    fn reject_wrong_extension() {
        for raw in ["/tmp/report.csv", "/tmp/report", "/tmp/report.xls"] {
            let err = validate_workbook_path(raw).unwrap_err();
            assert!(
                matches!(err, WorkbookError::InvalidArgument { .. }),
                "path {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn reject_empty_path() {
        assert!(validate_workbook_path("").is_err());
        assert!(validate_workbook_path("   ").is_err());
    }

    #[test]
    fn accept_supported_extensions() {
        assert!(validate_workbook_path("/tmp/report.xlsx").is_ok());
        assert!(validate_workbook_path("/tmp/report.xlsm").is_ok());
        assert!(validate_workbook_path("/tmp/REPORT.XLSX").is_ok());
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let err = open("/nonexistent/dir/report.xlsx").unwrap_err();
        assert!(matches!(err, WorkbookError::FileNotFound { .. }));
    }

    #[test]
    fn sheet_lookup_is_case_sensitive() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet("Data").unwrap();

        assert!(require_sheet(&book, "Data").is_ok());
        let err = require_sheet(&book, "data").unwrap_err();
        assert!(matches!(err, WorkbookError::SheetNotFound { .. }));
        assert!(err.to_string().contains("Data"));
    }

    #[test]
    fn sheet_names_preserve_insertion_order() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet("Zulu").unwrap();
        book.new_sheet("Alpha").unwrap();
        book.new_sheet("Mike").unwrap();

        assert_eq!(sheet_names(&book), vec!["Zulu", "Alpha", "Mike"]);
    }

    #[test]
    fn scalar_display() {
        assert_eq!(CellScalar::Text("hi".into()).to_string(), "hi");
        assert_eq!(CellScalar::Number(42.0).to_string(), "42");
        assert_eq!(CellScalar::Bool(true).to_string(), "true");
    }

    #[test]
    fn scalar_deserialises_untagged() {
        let v: CellScalar = serde_json::from_str("true").unwrap();
        assert_eq!(v, CellScalar::Bool(true));
        let v: CellScalar = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, CellScalar::Number(1.5));
        let v: CellScalar = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(v, CellScalar::Text("42".into()));
    }

    #[test]
    fn number_needle_ignores_numeric_text() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet("S").unwrap();
        sheet.get_cell_mut("A1").set_value_string("42");
        sheet.get_cell_mut("A2").set_value_number(42);

        let needle = SearchScalar::Number(42.0);
        assert!(!needle.matches(sheet.get_cell("A1").unwrap()));
        assert!(needle.matches(sheet.get_cell("A2").unwrap()));

        let needle = SearchScalar::Text("42".into());
        assert!(needle.matches(sheet.get_cell("A1").unwrap()));
        assert!(!needle.matches(sheet.get_cell("A2").unwrap()));
    }

    #[test]
    fn timestamp_normalisation() {
        assert_eq!(timestamp_or_unknown(""), UNKNOWN_METADATA);
        assert_eq!(
            timestamp_or_unknown("2015-06-05T18:17:20+00:00"),
            "2015-06-05T18:17:20Z"
        );
        assert_eq!(timestamp_or_unknown("yesterday"), "yesterday");
    }
}
