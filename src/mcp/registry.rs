//! Tool registry and dispatcher.
//!
//! Every exposed operation is registered once at startup as a
//! [`ToolDefinition`] (name, description, hand-written JSON input schema)
//! in an insertion-ordered map, so `tools/list` always reports tools in
//! registration order.
//!
//! Dispatch walks one fixed path per request: look the tool up by name,
//! validate the arguments against its schema, enforce the path allowlist,
//! then run the handler. Each stage has its own terminal error so the
//! server can map failures onto the right JSON-RPC code.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::WorkbookError;
use crate::mcp::schema::{self, SchemaViolation};
use crate::tools;

/// A tool definition for the tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Why a dispatch failed. Each variant maps onto one JSON-RPC error class.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested tool name is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments violated the tool's input schema.
    #[error("{}", schema::violations_message(.0))]
    InvalidParams(Vec<SchemaViolation>),

    /// The handler ran and failed with a domain error.
    #[error(transparent)]
    Execution(#[from] WorkbookError),
}

/// Restricts which file-system paths tools may touch.
///
/// An empty allowlist means no restriction. Paths are canonicalised before
/// comparison; for files that do not exist yet, the parent directory is
/// canonicalised instead so that create-style tools still work.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    allowed: Vec<PathBuf>,
}

impl PathPolicy {
    /// Creates a policy from the configured allowlist.
    #[must_use]
    pub fn new(allowed: Vec<PathBuf>) -> Self {
        Self { allowed }
    }

    /// Checks that `raw` lies within one of the allowed directories.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::InvalidArgument`] when the path escapes the
    /// allowlist or cannot be resolved.
    pub fn check(&self, raw: &str) -> Result<(), WorkbookError> {
        if self.allowed.is_empty() {
            return Ok(());
        }

        let path = Path::new(raw);

        let canonical = if path.exists() {
            path.canonicalize().map_err(|e| {
                WorkbookError::invalid_argument(format!("cannot resolve path '{raw}': {e}"))
            })?
        } else {
            let parent = path.parent().ok_or_else(|| {
                WorkbookError::invalid_argument(format!("path '{raw}' has no parent directory"))
            })?;
            let file_name = path.file_name().ok_or_else(|| {
                WorkbookError::invalid_argument(format!("path '{raw}' has no file name"))
            })?;
            let canonical_parent = parent.canonicalize().map_err(|e| {
                WorkbookError::invalid_argument(format!(
                    "parent directory of '{raw}' does not exist or is inaccessible: {e}"
                ))
            })?;
            canonical_parent.join(file_name)
        };

        for allowed in &self.allowed {
            let Ok(canonical_allowed) = allowed.canonicalize() else {
                continue; // Skip non-existent allowed paths
            };
            if canonical.starts_with(&canonical_allowed) {
                return Ok(());
            }
        }

        // Do not echo the configured directories back to the client.
        Err(WorkbookError::invalid_argument(
            "access denied: path is outside the configured allowed directories",
        ))
    }
}

/// Argument keys that name file-system paths and fall under the policy.
const PATH_ARGUMENT_KEYS: [&str; 2] = ["filePath", "csvPath"];

/// The ordered registry of exposed tools.
pub struct ToolRegistry {
    tools: IndexMap<&'static str, ToolDefinition>,
}

impl ToolRegistry {
    /// Builds the registry with every workbook tool, in the order they are
    /// reported by `tools/list`.
    #[must_use]
    pub fn standard() -> Self {
        let mut tools = IndexMap::new();
        for definition in tool_definitions() {
            tools.insert(definition.name, definition);
        }
        Self { tools }
    }

    /// Returns the registered definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty (it never is in practice).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validates and executes one tool call, returning the handler's
    /// confirmation text.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownTool`] when `name` is not registered
    /// - [`DispatchError::InvalidParams`] when the arguments violate the
    ///   tool's schema
    /// - [`DispatchError::Execution`] when the handler fails
    pub fn dispatch(
        &self,
        policy: &PathPolicy,
        name: &str,
        arguments: &Value,
    ) -> Result<String, DispatchError> {
        let definition = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let violations = schema::validate_arguments(arguments, &definition.input_schema);
        if !violations.is_empty() {
            return Err(DispatchError::InvalidParams(violations));
        }

        for key in PATH_ARGUMENT_KEYS {
            if let Some(raw) = arguments.get(key).and_then(Value::as_str) {
                policy.check(raw)?;
            }
        }

        let result = match name {
            "create_workbook" => tools::create_workbook(&decode(arguments)?),
            "get_workbook_info" => tools::get_workbook_info(&decode(arguments)?),
            "add_worksheet" => tools::add_worksheet(&decode(arguments)?),
            "set_cell_value" => tools::set_cell_value(&decode(arguments)?),
            "get_cell_value" => tools::get_cell_value(&decode(arguments)?),
            "set_range_values" => tools::set_range_values(&decode(arguments)?),
            "get_range_values" => tools::get_range_values(&decode(arguments)?),
            "format_cell" => tools::format_cell(&decode(arguments)?),
            "add_formula" => tools::add_formula(&decode(arguments)?),
            "find_data" => tools::find_data(&decode(arguments)?),
            "export_to_csv" => tools::export_to_csv(&decode(arguments)?),
            _ => return Err(DispatchError::UnknownTool(name.to_string())),
        }?;

        Ok(result)
    }
}

/// Deserialises schema-validated arguments into a typed parameter struct.
/// Failures here mean the schema and the struct disagree; they surface as
/// an invalid-params response rather than a crash.
fn decode<T: DeserializeOwned>(arguments: &Value) -> Result<T, DispatchError> {
    serde_json::from_value(arguments.clone()).map_err(|e| {
        DispatchError::InvalidParams(vec![SchemaViolation {
            path: String::new(),
            message: e.to_string(),
        }])
    })
}

#[allow(clippy::too_many_lines)]
fn tool_definitions() -> Vec<ToolDefinition> {
    let path_property = json!({
        "type": "string",
        "description": "Absolute path to the Excel file (e.g. /home/user/report.xlsx). Must end in .xlsx or .xlsm"
    });
    let sheet_property = json!({
        "type": "string",
        "description": "Name of an existing worksheet in the workbook"
    });
    let cell_property = json!({
        "type": "string",
        "description": "Cell position in A1 form (e.g. A1, B2, AA10). Ranges like A1:B2 are not accepted here"
    });

    vec![
        ToolDefinition {
            name: "create_workbook",
            description: "Create a new, empty Excel workbook at the given absolute path, \
                          overwriting any existing file. Args: filePath",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                },
                "required": ["filePath"]
            }),
        },
        ToolDefinition {
            name: "get_workbook_info",
            description: "Read workbook metadata: sheet count, sheet names, creator and \
                          timestamps. Args: filePath (existing file)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                },
                "required": ["filePath"]
            }),
        },
        ToolDefinition {
            name: "add_worksheet",
            description: "Append a new worksheet to an existing workbook. Args: filePath \
                          (existing file), sheetName (unique name)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": {
                        "type": "string",
                        "description": "Name for the new worksheet; must not already exist"
                    },
                },
                "required": ["filePath", "sheetName"]
            }),
        },
        ToolDefinition {
            name: "set_cell_value",
            description: "Set a single cell to a text, number or boolean value. Existing \
                          formatting on the cell is preserved. Args: filePath, sheetName, \
                          cell (A1 form), value",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "cell": cell_property.clone(),
                    "value": {
                        "type": ["string", "number", "boolean"],
                        "description": "Value to store in the cell"
                    },
                },
                "required": ["filePath", "sheetName", "cell", "value"]
            }),
        },
        ToolDefinition {
            name: "get_cell_value",
            description: "Read a single cell's value as text. Unset cells report (empty). \
                          Args: filePath, sheetName, cell (A1 form)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "cell": cell_property.clone(),
                },
                "required": ["filePath", "sheetName", "cell"]
            }),
        },
        ToolDefinition {
            name: "set_range_values",
            description: "Write a two-dimensional array of values starting at an anchor \
                          cell; rows fill rightwards, the array fills downwards. Args: \
                          filePath, sheetName, startCell (A1 form), values (array of rows)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "startCell": {
                        "type": "string",
                        "description": "Top-left cell of the block, in A1 form"
                    },
                    "values": {
                        "type": "array",
                        "description": "Rows of values; the outer array is rows, the inner arrays are columns. Example: [[\"Item\", \"Price\"], [\"Widget\", 1000]]",
                        "items": {
                            "type": "array",
                            "items": { "type": ["string", "number", "boolean"] }
                        }
                    },
                },
                "required": ["filePath", "sheetName", "startCell", "values"]
            }),
        },
        ToolDefinition {
            name: "get_range_values",
            description: "Read a rectangular range of cells as a two-dimensional array. \
                          Args: filePath, sheetName, range (A1:C3 form)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "range": {
                        "type": "string",
                        "description": "Range to read, in A1:C3 form (e.g. A1:C10, B2:D5)"
                    },
                },
                "required": ["filePath", "sheetName", "range"]
            }),
        },
        ToolDefinition {
            name: "format_cell",
            description: "Apply font, fill and border formatting to a cell. Font fields \
                          merge onto the existing font; fill and border replace any \
                          previous fill or border entirely. Args: filePath, sheetName, \
                          cell (A1 form), format",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "cell": cell_property.clone(),
                    "format": {
                        "type": "object",
                        "description": "Formatting directives",
                        "properties": {
                            "font": {
                                "type": "object",
                                "properties": {
                                    "bold": { "type": "boolean" },
                                    "italic": { "type": "boolean" },
                                    "size": { "type": "number" },
                                    "color": {
                                        "type": "string",
                                        "description": "ARGB color token, e.g. FFFF0000"
                                    },
                                },
                            },
                            "fill": {
                                "type": "object",
                                "properties": {
                                    "type": {
                                        "type": "string",
                                        "description": "Fill kind; 'pattern' for a pattern fill"
                                    },
                                    "pattern": {
                                        "type": "string",
                                        "description": "Pattern name, e.g. solid"
                                    },
                                    "fgColor": {
                                        "type": "string",
                                        "description": "Foreground ARGB color token"
                                    },
                                    "bgColor": {
                                        "type": "string",
                                        "description": "Background ARGB color token"
                                    },
                                },
                                "required": ["type"]
                            },
                            "border": {
                                "type": "object",
                                "properties": {
                                    "top": border_side_schema(),
                                    "left": border_side_schema(),
                                    "bottom": border_side_schema(),
                                    "right": border_side_schema(),
                                },
                            },
                        },
                    },
                },
                "required": ["filePath", "sheetName", "cell", "format"]
            }),
        },
        ToolDefinition {
            name: "add_formula",
            description: "Store a formula in a cell (e.g. =SUM(A1:A10)). The formula is \
                          not evaluated by this server. Args: filePath, sheetName, cell \
                          (A1 form), formula",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "cell": cell_property.clone(),
                    "formula": {
                        "type": "string",
                        "description": "Formula text, e.g. =SUM(A1:A10)"
                    },
                },
                "required": ["filePath", "sheetName", "cell", "formula"]
            }),
        },
        ToolDefinition {
            name: "find_data",
            description: "Search a worksheet for cells whose value equals the search \
                          value exactly (numbers never match numeric-looking text). Args: \
                          filePath, sheetName, searchValue",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "searchValue": {
                        "type": ["string", "number"],
                        "description": "Value to search for"
                    },
                },
                "required": ["filePath", "sheetName", "searchValue"]
            }),
        },
        ToolDefinition {
            name: "export_to_csv",
            description: "Export one worksheet's grid to a CSV file. Args: filePath \
                          (existing file), sheetName (existing sheet), csvPath (output \
                          path)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": path_property.clone(),
                    "sheetName": sheet_property.clone(),
                    "csvPath": {
                        "type": "string",
                        "description": "Output path for the CSV file"
                    },
                },
                "required": ["filePath", "sheetName", "csvPath"]
            }),
        },
    ]
}

fn border_side_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "style": {
                "type": "string",
                "description": "Border style token, e.g. thin, medium, dashed"
            },
            "color": {
                "type": "string",
                "description": "ARGB color token"
            },
        },
        "required": ["style", "color"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_lists_tools_in_registration_order() {
        let registry = ToolRegistry::standard();
        let names: Vec<&str> = registry.definitions().map(|def| def.name).collect();
        assert_eq!(
            names,
            vec![
                "create_workbook",
                "get_workbook_info",
                "add_worksheet",
                "set_cell_value",
                "get_cell_value",
                "set_range_values",
                "get_range_values",
                "format_cell",
                "add_formula",
                "find_data",
                "export_to_csv",
            ]
        );
    }

    #[test]
    fn tool_names_are_unique() {
        let registry = ToolRegistry::standard();
        assert_eq!(registry.len(), 11);
        assert!(!registry.is_empty());
    }

    #[test]
    fn definitions_serialise_with_camel_case_schema_key() {
        let registry = ToolRegistry::standard();
        let first = registry.definitions().next().unwrap();
        let value = serde_json::to_value(first).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn unknown_tool_is_reported() {
        let registry = ToolRegistry::standard();
        let err = registry
            .dispatch(&PathPolicy::default(), "sort_data", &json!({}))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownTool(_)));
        assert!(err.to_string().contains("sort_data"));
    }

    #[test]
    fn missing_required_argument_names_the_field() {
        let registry = ToolRegistry::standard();
        let err = registry
            .dispatch(
                &PathPolicy::default(),
                "set_cell_value",
                &json!({ "filePath": "/tmp/book.xlsx", "sheetName": "S", "cell": "A1" }),
            )
            .unwrap_err();
        let DispatchError::InvalidParams(violations) = err else {
            panic!("expected InvalidParams, got {err:?}");
        };
        assert!(violations.iter().any(|v| v.path == "value"));
    }

    #[test]
    fn wrong_argument_type_is_invalid_params() {
        let registry = ToolRegistry::standard();
        let err = registry
            .dispatch(
                &PathPolicy::default(),
                "create_workbook",
                &json!({ "filePath": 42 }),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
    }

    #[test]
    fn domain_failures_surface_as_execution_errors() {
        let registry = ToolRegistry::standard();
        // Relative path: schema-valid but rejected by the gateway.
        let err = registry
            .dispatch(
                &PathPolicy::default(),
                "create_workbook",
                &json!({ "filePath": "book.xlsx" }),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::Execution(_)));
    }

    #[test]
    fn path_policy_allows_everything_when_empty() {
        let policy = PathPolicy::default();
        assert!(policy.check("/anywhere/at/all.xlsx").is_ok());
    }

    #[test]
    fn path_policy_blocks_outside_paths() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::new(vec![dir.path().to_path_buf()]);

        let inside = dir.path().join("book.xlsx");
        assert!(policy.check(&inside.to_string_lossy()).is_ok());

        let err = policy.check("/etc/passwd").unwrap_err();
        assert!(err.to_string().contains("access denied"));
    }
}
