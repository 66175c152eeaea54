//! The workbook operation set.
//!
//! One handler per exposed tool. Every handler follows the same template:
//! validate domain-specific arguments, open the workbook fresh from disk,
//! locate the target sheet (reporting the available sheet names when it is
//! missing), perform the effect, persist by overwriting the same path when
//! mutating, and answer with a human-readable confirmation (or a labelled
//! JSON payload for reads).
//!
//! Handlers are deliberately stateless: nothing is cached between calls,
//! so back-to-back calls on the same file always observe what the previous
//! call persisted.

pub mod format;

use serde::Deserialize;
use serde_json::Value;

use crate::address::{CellRef, RangeRef};
use crate::error::{WorkbookError, WorkbookResult};
use crate::workbook::{self, CellScalar, SearchScalar, WorkbookInfo};

use format::CellFormat;

/// Sentinel rendered by `get_cell_value` for unset or empty cells.
pub const EMPTY_CELL_SENTINEL: &str = "(empty)";

/// Arguments for `create_workbook`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkbookParams {
    /// Absolute path for the new workbook.
    pub file_path: String,
}

/// Arguments for `get_workbook_info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorkbookInfoParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
}

/// Arguments for `add_worksheet`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWorksheetParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Name for the new worksheet.
    pub sheet_name: String,
}

/// Arguments for `set_cell_value`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCellValueParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Cell position in A1 form.
    pub cell: String,
    /// Text, number or boolean to store.
    pub value: CellScalar,
}

/// Arguments for `get_cell_value`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCellValueParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Cell position in A1 form.
    pub cell: String,
}

/// Arguments for `set_range_values`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRangeValuesParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Top-left anchor cell in A1 form.
    pub start_cell: String,
    /// Rows of scalars. Rows may have differing lengths; each row starts
    /// at the anchor column.
    pub values: Vec<Value>,
}

/// Arguments for `get_range_values`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRangeValuesParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Range in `A1:C3` form.
    pub range: String,
}

/// Arguments for `format_cell`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCellParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Cell position in A1 form.
    pub cell: String,
    /// Formatting directives.
    pub format: CellFormat,
}

/// Arguments for `add_formula`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFormulaParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Cell position in A1 form.
    pub cell: String,
    /// Formula text, e.g. `=SUM(A1:A10)`.
    pub formula: String,
}

/// Arguments for `find_data`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindDataParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Target worksheet name.
    pub sheet_name: String,
    /// Text or number to search for (matched by exact type and value).
    pub search_value: SearchScalar,
}

/// Arguments for `export_to_csv`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportToCsvParams {
    /// Absolute path of an existing workbook.
    pub file_path: String,
    /// Worksheet to export.
    pub sheet_name: String,
    /// Output path for the CSV file.
    pub csv_path: String,
}

/// Creates a brand-new, zero-sheet workbook, overwriting silently.
///
/// # Errors
///
/// Fails on path-shape violations or write failure.
pub fn create_workbook(params: &CreateWorkbookParams) -> WorkbookResult<String> {
    let path = workbook::create(&params.file_path)?;
    Ok(format!("Created workbook '{}'.", path.display()))
}

/// Returns the workbook metadata snapshot as a labelled JSON payload.
///
/// # Errors
///
/// Fails when the file is missing or unreadable.
pub fn get_workbook_info(params: &GetWorkbookInfoParams) -> WorkbookResult<String> {
    let (path, book) = workbook::open(&params.file_path)?;
    let info = WorkbookInfo::from_book(&path, &book);
    Ok(format!("Workbook info:\n{}", to_pretty_json(&info)))
}

/// Appends a new, empty worksheet at the end of the sheet sequence.
///
/// # Errors
///
/// Fails when the name is empty, a sheet of that name exists, or the file
/// cannot be read or written.
pub fn add_worksheet(params: &AddWorksheetParams) -> WorkbookResult<String> {
    if params.sheet_name.trim().is_empty() {
        return Err(WorkbookError::invalid_argument("worksheet name is empty"));
    }
    let name = &params.sheet_name;

    let (path, mut book) = workbook::open(&params.file_path)?;
    if book.get_sheet_by_name(name).is_some() {
        return Err(WorkbookError::SheetExists { name: name.clone() });
    }

    book.new_sheet(name)
        .map_err(|e| WorkbookError::invalid_argument(format!("cannot create worksheet: {e}")))?;
    workbook::save(&book, &path)?;

    Ok(format!("Added worksheet '{name}'."))
}

/// Stores a scalar in one cell. Existing formatting on the cell is left
/// untouched; value and style are orthogonal.
///
/// # Errors
///
/// Fails on bad cell tokens, missing file or sheet, or write failure.
pub fn set_cell_value(params: &SetCellValueParams) -> WorkbookResult<String> {
    let cell_ref = CellRef::parse(&params.cell)?;
    let (path, mut book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet_mut(&mut book, &params.sheet_name)?;

    params
        .value
        .write_to(sheet.get_cell_mut((cell_ref.col, cell_ref.row)));
    workbook::save(&book, &path)?;

    Ok(format!("Set cell {cell_ref} to '{}'.", params.value))
}

/// Reads one cell, rendering its raw value as text. Unset cells render as
/// [`EMPTY_CELL_SENTINEL`].
///
/// # Errors
///
/// Fails on bad cell tokens or a missing file or sheet.
pub fn get_cell_value(params: &GetCellValueParams) -> WorkbookResult<String> {
    let cell_ref = CellRef::parse(&params.cell)?;
    let (_, book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet(&book, &params.sheet_name)?;

    let rendered = sheet
        .get_cell((cell_ref.col, cell_ref.row))
        .map(|cell| cell.get_value().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| EMPTY_CELL_SENTINEL.to_string());

    Ok(format!("Cell {cell_ref} value: {rendered}"))
}

/// Writes a block of rows anchored at `startCell`. Rows need not be
/// rectangular; cell `(startRow + i, startCol + j)` receives `values[i][j]`.
///
/// # Errors
///
/// Fails when `values` is empty or a row is not an array of scalars, and on
/// the usual file and sheet failures.
pub fn set_range_values(params: &SetRangeValuesParams) -> WorkbookResult<String> {
    let start = CellRef::parse(&params.start_cell)?;
    let rows = decode_rows(&params.values)?;

    let (path, mut book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet_mut(&mut book, &params.sheet_name)?;

    for (i, row) in rows.iter().enumerate() {
        for (j, scalar) in row.iter().enumerate() {
            let col = start.col + u32::try_from(j).unwrap_or(u32::MAX);
            let row_num = start.row + u32::try_from(i).unwrap_or(u32::MAX);
            scalar.write_to(sheet.get_cell_mut((col, row_num)));
        }
    }
    workbook::save(&book, &path)?;

    let width = rows.first().map_or(0, Vec::len);
    Ok(format!(
        "Wrote {} row(s) x {} column(s) starting at {start}.",
        rows.len(),
        width
    ))
}

fn decode_rows(values: &[Value]) -> WorkbookResult<Vec<Vec<CellScalar>>> {
    if values.is_empty() {
        return Err(WorkbookError::invalid_argument(
            "values must be a non-empty two-dimensional array",
        ));
    }

    let mut rows = Vec::with_capacity(values.len());
    for (i, raw_row) in values.iter().enumerate() {
        if !raw_row.is_array() {
            return Err(WorkbookError::invalid_argument(format!(
                "row {} is not an array; values must be a two-dimensional array",
                i + 1
            )));
        }
        let row: Vec<CellScalar> = serde_json::from_value(raw_row.clone()).map_err(|_| {
            WorkbookError::invalid_argument(format!(
                "row {} contains a value that is not text, number or boolean",
                i + 1
            ))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Reads a rectangular block, row-major, inclusive on both axes. Each cell
/// is rendered as its typed raw value (numbers as numbers, booleans as
/// booleans, unset cells as `null`).
///
/// # Errors
///
/// Fails on bad range tokens or a missing file or sheet.
pub fn get_range_values(params: &GetRangeValuesParams) -> WorkbookResult<String> {
    let range = RangeRef::parse(&params.range)?.normalized();
    let (_, book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet(&book, &params.sheet_name)?;

    let mut grid = Vec::new();
    for row in range.start.row..=range.end.row {
        let mut row_values = Vec::new();
        for col in range.start.col..=range.end.col {
            let value = sheet
                .get_cell((col, row))
                .map_or(Value::Null, workbook::cell_json_value);
            row_values.push(value);
        }
        grid.push(Value::Array(row_values));
    }

    Ok(format!(
        "Values in range {}:\n{}",
        params.range,
        to_pretty_json(&Value::Array(grid))
    ))
}

/// Applies font, fill and border formatting to one cell. Font fields merge
/// onto the existing font; fill and border replace wholesale (see
/// [`format::apply_format`] for the contract).
///
/// # Errors
///
/// Fails on bad cell tokens, missing file or sheet, or write failure.
pub fn format_cell(params: &FormatCellParams) -> WorkbookResult<String> {
    let cell_ref = CellRef::parse(&params.cell)?;
    let (path, mut book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet_mut(&mut book, &params.sheet_name)?;

    format::apply_format(
        sheet.get_cell_mut((cell_ref.col, cell_ref.row)),
        &params.format,
    );
    workbook::save(&book, &path)?;

    Ok(format!("Formatted cell {cell_ref}."))
}

/// Stores formula text as a formula-kind value. The formula is not
/// evaluated and its syntax is not checked here.
///
/// # Errors
///
/// Fails on bad cell tokens, missing file or sheet, or write failure.
pub fn add_formula(params: &AddFormulaParams) -> WorkbookResult<String> {
    let cell_ref = CellRef::parse(&params.cell)?;
    let (path, mut book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet_mut(&mut book, &params.sheet_name)?;

    sheet
        .get_cell_mut((cell_ref.col, cell_ref.row))
        .set_formula(params.formula.clone());
    workbook::save(&book, &path)?;

    Ok(format!(
        "Set formula '{}' in cell {cell_ref}.",
        params.formula
    ))
}

/// Scans the sheet's cells in file order for an exact type-and-value match
/// and reports the matching addresses, comma-joined. No matches is an
/// empty list, not an error.
///
/// # Errors
///
/// Fails on a missing file or sheet.
pub fn find_data(params: &FindDataParams) -> WorkbookResult<String> {
    let (_, book) = workbook::open(&params.file_path)?;
    let sheet = workbook::require_sheet(&book, &params.sheet_name)?;

    let mut matches = Vec::new();
    for cell in sheet.get_cell_collection() {
        if params.search_value.matches(cell) {
            let coordinate = cell.get_coordinate();
            let cell_ref = CellRef {
                col: *coordinate.get_col_num(),
                row: *coordinate.get_row_num(),
            };
            matches.push(cell_ref.to_string());
        }
    }

    Ok(format!(
        "Found '{}' in cells: {}",
        params.search_value,
        matches.join(", ")
    ))
}

/// Serialises one worksheet's grid to CSV at `csvPath`, delegating
/// delimiter and quoting rules to the codec's CSV writer. An empty sheet
/// produces an empty (zero-byte) file.
///
/// # Errors
///
/// Fails on a missing file or sheet, or on CSV write failure.
pub fn export_to_csv(params: &ExportToCsvParams) -> WorkbookResult<String> {
    let (_, mut book) = workbook::open(&params.file_path)?;

    let index = book
        .get_sheet_collection()
        .iter()
        .position(|sheet| sheet.get_name() == params.sheet_name)
        .ok_or_else(|| {
            WorkbookError::sheet_not_found(&params.sheet_name, workbook::sheet_names_joined(&book))
        })?;

    // The CSV writer serialises the active sheet.
    book.set_active_sheet(u32::try_from(index).unwrap_or(0));
    umya_spreadsheet::writer::csv::write(&book, &params.csv_path, None).map_err(|e| {
        WorkbookError::FileWrite {
            path: params.csv_path.clone().into(),
            detail: e.to_string(),
        }
    })?;

    Ok(format!(
        "Exported worksheet '{}' to '{}'.",
        params.sheet_name, params.csv_path
    ))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("tool payloads serialise to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_values_reject_empty_rows() {
        let err = decode_rows(&[]).unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidArgument { .. }));
    }

    #[test]
    fn range_values_reject_non_array_row() {
        let values = vec![json!(["a", "b"]), json!("c")];
        let err = decode_rows(&values).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2"), "message was: {msg}");
    }

    #[test]
    fn range_values_allow_ragged_rows() {
        let values = vec![json!(["a", "b", "c"]), json!([1]), json!([true, false])];
        let rows = decode_rows(&values).unwrap();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1], vec![CellScalar::Number(1.0)]);
        assert_eq!(rows[2].len(), 2);
    }

    #[test]
    fn worksheet_name_must_not_be_blank() {
        let params = AddWorksheetParams {
            file_path: "/tmp/unused.xlsx".into(),
            sheet_name: "   ".into(),
        };
        let err = add_worksheet(&params).unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidArgument { .. }));
    }

    #[test]
    fn bad_cell_token_fails_before_any_io() {
        let params = GetCellValueParams {
            file_path: "/nonexistent/never-touched.xlsx".into(),
            sheet_name: "Sheet1".into(),
            cell: "1A".into(),
        };
        let err = get_cell_value(&params).unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidAddress { .. }));
    }

    #[test]
    fn wire_params_use_camel_case() {
        let params: SetCellValueParams = serde_json::from_value(json!({
            "filePath": "/tmp/book.xlsx",
            "sheetName": "Sheet1",
            "cell": "B2",
            "value": 42
        }))
        .unwrap();
        assert_eq!(params.cell, "B2");
        assert_eq!(params.value, CellScalar::Number(42.0));
    }
}
