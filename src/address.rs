//! A1-style cell and range address parsing.
//!
//! Addresses arrive from clients as uppercase tokens like `B7` or `A1:C3`.
//! Parsing validates the token shape and decodes it into 1-based
//! column/row coordinates; columns use bijective base-26 numbering
//! (A=1 … Z=26, AA=27 …). This module performs no I/O.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{WorkbookError, WorkbookResult};

/// Grammar for a single cell token: column letters then a row number with
/// no leading zero.
const CELL_PATTERN: &str = r"^[A-Z]+[1-9][0-9]*$";

/// Grammar for a range token: two cell tokens joined by a colon.
const RANGE_PATTERN: &str = r"^[A-Z]+[1-9][0-9]*:[A-Z]+[1-9][0-9]*$";

fn cell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CELL_PATTERN).expect("cell pattern is valid"))
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RANGE_PATTERN).expect("range pattern is valid"))
}

/// A single cell coordinate, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Column number (A=1).
    pub col: u32,
    /// Row number.
    pub row: u32,
}

impl CellRef {
    /// Parses an A1-style cell token.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::InvalidAddress`] if the token does not match
    /// the cell grammar (lowercase letters, a leading zero in the row or a
    /// missing row all fail).
    pub fn parse(token: &str) -> WorkbookResult<Self> {
        if !cell_regex().is_match(token) {
            return Err(WorkbookError::invalid_cell(token));
        }

        let split = token
            .find(|c: char| c.is_ascii_digit())
            .expect("grammar guarantees a digit");
        let (letters, digits) = token.split_at(split);

        let col = column_number(letters);
        let row: u32 = digits
            .parse()
            .map_err(|_| WorkbookError::invalid_cell(token))?;

        Ok(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// A rectangular range between two cell coordinates.
///
/// Only the token shape is validated at parse time; `start` and `end` are
/// stored exactly as written. [`RangeRef::normalized`] reorders the corners
/// for callers that iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    /// Top-left corner as written.
    pub start: CellRef,
    /// Bottom-right corner as written.
    pub end: CellRef,
}

impl RangeRef {
    /// Parses an A1-style range token (`A1:C3`).
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::InvalidAddress`] if the token does not match
    /// the range grammar.
    pub fn parse(token: &str) -> WorkbookResult<Self> {
        if !range_regex().is_match(token) {
            return Err(WorkbookError::invalid_range(token));
        }

        let (first, second) = token
            .split_once(':')
            .expect("grammar guarantees a colon");
        let start = CellRef::parse(first).map_err(|_| WorkbookError::invalid_range(token))?;
        let end = CellRef::parse(second).map_err(|_| WorkbookError::invalid_range(token))?;

        Ok(Self { start, end })
    }

    /// Returns the range with corners reordered so that
    /// `start.col <= end.col` and `start.row <= end.row`.
    ///
    /// Inverted tokens like `C3:A1` are accepted by the grammar; readers
    /// normalise rather than reject them.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            start: CellRef {
                col: self.start.col.min(self.end.col),
                row: self.start.row.min(self.end.row),
            },
            end: CellRef {
                col: self.start.col.max(self.end.col),
                row: self.start.row.max(self.end.row),
            },
        }
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Converts a column number to its letter name (1 → `A`, 27 → `AA`).
#[must_use]
pub fn column_name(column: u32) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

/// Converts uppercase column letters to the column number (`A` → 1,
/// `AA` → 27). The caller guarantees the input matches `[A-Z]+`.
fn column_number(letters: &str) -> u32 {
    letters
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A') + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_letter_cell() {
        let cell = CellRef::parse("A1").unwrap();
        assert_eq!(cell, CellRef { col: 1, row: 1 });
    }

    #[test]
    fn parse_multi_letter_cell() {
        let cell = CellRef::parse("AA10").unwrap();
        assert_eq!(cell, CellRef { col: 27, row: 10 });
    }

    #[test]
    fn parse_large_column() {
        // Z=26, AZ=52, ZZ=702
        assert_eq!(CellRef::parse("Z1").unwrap().col, 26);
        assert_eq!(CellRef::parse("AZ1").unwrap().col, 52);
        assert_eq!(CellRef::parse("ZZ1").unwrap().col, 702);
        assert_eq!(CellRef::parse("AAA1").unwrap().col, 703);
    }

    #[test]
    fn cell_round_trips_through_display() {
        for token in ["A1", "B2", "Z99", "AA10", "AZ52", "ZZ702", "ABC123"] {
            let cell = CellRef::parse(token).unwrap();
            assert_eq!(cell.to_string(), token);
        }
    }

    #[test]
    fn reject_malformed_cell_tokens() {
        for token in [
            "", "A", "1", "a1", "A0", "A01", "1A", "A1:B2", "A-1", " A1", "A1 ", "A1.5",
        ] {
            let err = CellRef::parse(token).unwrap_err();
            assert!(
                matches!(err, WorkbookError::InvalidAddress { .. }),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_cell_message_echoes_token() {
        let err = CellRef::parse("b2").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'b2'"));
        assert!(msg.contains("A1"));
    }

    #[test]
    fn parse_range() {
        let range = RangeRef::parse("B2:C3").unwrap();
        assert_eq!(range.start, CellRef { col: 2, row: 2 });
        assert_eq!(range.end, CellRef { col: 3, row: 3 });
    }

    #[test]
    fn reject_malformed_range_tokens() {
        for token in ["A1", "A1:", ":B2", "A1:B2:C3", "a1:B2", "A1:b2", "A0:B2", "A1-B2"] {
            assert!(
                RangeRef::parse(token).is_err(),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn inverted_range_parses_and_normalises() {
        let range = RangeRef::parse("C3:A1").unwrap();
        assert_eq!(range.start, CellRef { col: 3, row: 3 });
        let norm = range.normalized();
        assert_eq!(norm.start, CellRef { col: 1, row: 1 });
        assert_eq!(norm.end, CellRef { col: 3, row: 3 });
    }

    #[test]
    fn column_name_round_trip() {
        for col in [1, 2, 25, 26, 27, 51, 52, 701, 702, 703, 16384] {
            let name = column_name(col);
            assert_eq!(column_number(&name), col);
        }
    }
}
