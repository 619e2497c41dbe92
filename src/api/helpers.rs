//! Response builders for API Gateway proxy responses.
//!
//! Every response carries the permissive CORS headers browsers need to call the proxy.

use serde_json::{Value, json};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// CORS headers plus a JSON content type.
#[must_use]
pub fn cors_headers() -> Value {
    json!({
        "Access-Control-Allow-Origin": ALLOW_ORIGIN,
        "Access-Control-Allow-Methods": ALLOW_METHODS,
        "Access-Control-Allow-Headers": ALLOW_HEADERS,
        "Content-Type": "application/json"
    })
}

/// Returns a response with the given status and a serialized JSON body.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": cors_headers(),
        "body": body.to_string()
    })
}

/// Returns a 200 OK response with a JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json_response(200, body)
}

/// Returns a 200 OK response with an empty body, for CORS preflight.
#[must_use]
pub fn ok_empty() -> Value {
    json!({
        "statusCode": 200,
        "headers": cors_headers(),
        "body": ""
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "error": message }))
}

/// Returns an error response that also carries a `details` payload.
#[must_use]
pub fn err_with_details(status_code: u16, message: &str, details: Value) -> Value {
    json_response(status_code, &json!({ "error": message, "details": details }))
}
