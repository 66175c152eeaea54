//! JSON Schema validation for tool arguments.
//!
//! Tool input schemas are hand-written JSON Schema objects (see the
//! registry). Before a handler runs, its arguments are checked against the
//! declared schema; every violation is collected with its field path so the
//! client sees all problems at once, and enum mismatches list the allowed
//! values.
//!
//! Only the subset of JSON Schema the tool definitions actually use is
//! implemented: `type` (single or union), `required`, `properties`,
//! `enum` and `items`.

use serde_json::Value;

/// One schema violation, anchored to the argument path that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted/indexed path to the offending field (empty for the root).
    pub path: String,
    /// What is wrong with the value at that path.
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validates `arguments` against `schema`, returning every violation found.
/// An empty result means the arguments are acceptable.
#[must_use]
pub fn validate_arguments(arguments: &Value, schema: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    validate_value(arguments, schema, "", &mut violations);
    violations
}

/// Formats violations into the message carried by an InvalidParams error.
#[must_use]
pub fn violations_message(violations: &[SchemaViolation]) -> String {
    let lines: Vec<String> = violations.iter().map(ToString::to_string).collect();
    format!("Invalid arguments:\n{}", lines.join("\n"))
}

fn validate_value(value: &Value, schema: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let Some(schema_obj) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema_obj.get("type") {
        if !type_matches(value, expected) {
            out.push(SchemaViolation {
                path: path.to_string(),
                message: format!(
                    "expected {}, got {}",
                    describe_expected_type(expected),
                    value_type_name(value)
                ),
            });
            // Structural checks below assume the right shape.
            return;
        }
    }

    if let Some(allowed) = schema_obj.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let listing: Vec<String> = allowed.iter().map(render_enum_value).collect();
            out.push(SchemaViolation {
                path: path.to_string(),
                message: format!("value must be one of: {}", listing.join(", ")),
            });
        }
    }

    if let Some(obj) = value.as_object() {
        let required: Vec<&str> = schema_obj
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        for field in required {
            if !obj.contains_key(field) {
                out.push(SchemaViolation {
                    path: join_path(path, field),
                    message: "missing required field".to_string(),
                });
            }
        }

        if let Some(properties) = schema_obj.get("properties").and_then(Value::as_object) {
            for (key, field_value) in obj {
                if let Some(field_schema) = properties.get(key) {
                    validate_value(field_value, field_schema, &join_path(path, key), out);
                }
                // Unknown fields are tolerated, matching the original
                // server's lenient argument handling.
            }
        }
    }

    if let Some(items) = value.as_array() {
        if let Some(item_schema) = schema_obj.get("items") {
            for (index, item) in items.iter().enumerate() {
                validate_value(item, item_schema, &format!("{path}[{index}]"), out);
            }
        }
    }
}

fn join_path(base: &str, field: &str) -> String {
    if base.is_empty() {
        field.to_string()
    } else {
        format!("{base}.{field}")
    }
}

fn type_matches(value: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => value_matches_type_name(value, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| value_matches_type_name(value, name)),
        _ => true,
    }
}

fn value_matches_type_name(value: &Value, name: &str) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_expected_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => {
            let listing: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            listing.join(" or ")
        }
        _ => "value".to_string(),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_enum_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "filePath": { "type": "string" },
                "kind": { "type": "string", "enum": ["line", "bar", "pie"] },
                "value": { "type": ["string", "number", "boolean"] },
                "values": {
                    "type": "array",
                    "items": {
                        "type": "array",
                        "items": { "type": ["string", "number", "boolean"] }
                    }
                }
            },
            "required": ["filePath"]
        })
    }

    #[test]
    fn accepts_valid_arguments() {
        let args = json!({
            "filePath": "/tmp/book.xlsx",
            "value": 42,
            "values": [["a", 1], [true]]
        });
        assert!(validate_arguments(&args, &schema()).is_empty());
    }

    #[test]
    fn reports_missing_required_field_by_name() {
        let args = json!({ "value": 1 });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "filePath");
        assert!(violations[0].message.contains("missing required field"));
    }

    #[test]
    fn reports_wrong_type_with_both_types() {
        let args = json!({ "filePath": 7 });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "filePath");
        assert!(violations[0].message.contains("expected string"));
        assert!(violations[0].message.contains("got number"));
    }

    #[test]
    fn enum_mismatch_lists_allowed_values() {
        let args = json!({ "filePath": "/tmp/b.xlsx", "kind": "donut" });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 1);
        let msg = violations[0].to_string();
        assert!(msg.contains("'line'"));
        assert!(msg.contains("'bar'"));
        assert!(msg.contains("'pie'"));
    }

    #[test]
    fn union_types_accept_each_member() {
        for value in [json!("x"), json!(3.5), json!(false)] {
            let args = json!({ "filePath": "/tmp/b.xlsx", "value": value });
            assert!(validate_arguments(&args, &schema()).is_empty());
        }

        let args = json!({ "filePath": "/tmp/b.xlsx", "value": null });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("string or number or boolean"));
    }

    #[test]
    fn nested_array_violations_carry_indexed_paths() {
        let args = json!({
            "filePath": "/tmp/b.xlsx",
            "values": [["ok"], "not-a-row"]
        });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "values[1]");
        assert!(violations[0].message.contains("expected array"));
    }

    #[test]
    fn multiple_violations_all_reported() {
        let args = json!({ "kind": 9, "value": [] });
        let violations = validate_arguments(&args, &schema());
        assert_eq!(violations.len(), 3);
        let message = violations_message(&violations);
        assert!(message.contains("filePath"));
        assert!(message.contains("kind"));
        assert!(message.contains("value"));
    }
}
