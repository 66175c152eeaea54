//! Integration tests for MCP protocol handling.
//!
//! These tests verify the JSON-RPC 2.0 protocol implementation: message
//! parsing, request/notification discrimination and error serialisation.

use excel_mcp::mcp::protocol::{parse_message, IncomingMessage, JsonRpcError, RequestId};

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": {
            "name": "set_cell_value",
            "arguments": {
                "filePath": "/tmp/book.xlsx",
                "sheetName": "Sheet1",
                "cell": "B2",
                "value": 42
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "tools/call");
        assert_eq!(req.id, RequestId::Number(7));
        let params = req.params.unwrap();
        assert_eq!(params.get("name").unwrap(), "set_cell_value");
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_string_request_id() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "req-42",
        "method": "tools/list"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.id, RequestId::String("req-42".to_string()));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_invalid_json() {
    let json = "not valid json";

    let result = parse_message(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

#[test]
fn test_error_responses_serialise_with_codes() {
    let error = JsonRpcError::method_not_found(RequestId::Number(3), "no_such_tool");
    let json = serde_json::to_string(&error).unwrap();
    assert!(json.contains(r#""code":-32601"#));
    assert!(json.contains("no_such_tool"));

    let error = JsonRpcError::invalid_params(RequestId::Number(4), "filePath: missing");
    let json = serde_json::to_string(&error).unwrap();
    assert!(json.contains(r#""code":-32602"#));

    let error = JsonRpcError::internal_error(RequestId::Number(5), "boom");
    let json = serde_json::to_string(&error).unwrap();
    assert!(json.contains(r#""code":-32603"#));
}
