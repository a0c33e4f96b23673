//! Domain-specific assertions

use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

/// Assert that a string is a JSON-RPC response
///
/// # Example
/// ```rust
/// use kaku_test_helpers::assertions::valid_jsonrpc_response;
/// use predicates::prelude::*;
///
/// let response = r#"{"jsonrpc":"2.0","id":1,"result":{}}"#;
/// assert!(valid_jsonrpc_response().eval(response));
/// ```
pub fn valid_jsonrpc_response() -> impl Predicate<str> {
    contains("\"jsonrpc\"")
        .and(contains("\"id\""))
        .and(contains("\"result\"").or(contains("\"error\"")))
}

/// Assert that stderr does NOT contain any of the given strings
pub fn stderr_not_contains(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}

/// Text of the first content item of a `tools/call` result
pub fn tool_text(result: &Value) -> &str {
    result["content"][0]["text"]
        .as_str()
        .expect("tool result should carry text content")
}

/// Whether a `tools/call` result is flagged as a tool error
pub fn tool_is_error(result: &Value) -> bool {
    result["isError"].as_bool().unwrap_or(false)
}
