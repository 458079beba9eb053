//! Shared helpers for tool use cases.

use serde_json::Value;
use taskpilot_domain::{ToolCallRequest, preview};

/// Extract the `errorMessage` field from an error-report tool result.
///
/// Falls back to the raw text when the result is not a JSON object with a
/// string `errorMessage`.
pub(crate) fn extract_error_message(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.get("errorMessage") {
            Some(Value::String(message)) => message.clone(),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`message`, `title`, `errorMessage`, `action`)
/// first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCallRequest) -> String {
    let Ok(args) = call.parsed_arguments() else {
        return preview(&call.arguments, 50);
    };
    let keys = ["message", "title", "errorMessage", "action"];
    for key in &keys {
        if let Some(Value::String(s)) = args.get(*key) {
            return preview(s, 50);
        }
    }
    args.values()
        .find_map(Value::as_str)
        .map(|s| preview(s, 50))
        .unwrap_or_default()
}
