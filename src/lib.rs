//! excel-mcp: MCP server for Excel workbook manipulation
//!
//! This library exposes spreadsheet operations (create workbooks, read and
//! write cells and ranges, format cells, add formulas, search, export to
//! CSV) as MCP tools, so AI assistants can work on `.xlsx` files without
//! direct file-system or library access.
//!
//! # Architecture
//!
//! Every tool call is a stateless pass-through to the workbook codec: open
//! the file fresh, mutate or read one structure, write the file back,
//! format a textual result. The engineering lives in the dispatch layer,
//! an ordered registry of schema-validated tools with a uniform error
//! translation contract. The spreadsheet semantics themselves are
//! delegated to `umya-spreadsheet`.
//!
//! # Modules
//!
//! - [`address`] — A1 cell/range token parsing
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation
//! - [`tools`] — The workbook operation set
//! - [`workbook`] — Document gateway over the workbook codec

pub mod address;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod workbook;
