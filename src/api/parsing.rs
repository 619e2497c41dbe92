use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::ProxyError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// HTTP method of an API Gateway proxy event (HTTP API v2 first, then REST v1).
pub fn request_method(payload: &Value) -> Option<&str> {
    v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
}

/// Decodes the event body into JSON.
///
/// Accepts a JSON string body (optionally base64-encoded) or an already-parsed value.
/// Interpreting the JSON is left to `Command`.
pub fn parse_command_body(payload: &Value) -> Result<Value, ProxyError> {
    match payload.get("body") {
        None | Some(Value::Null) => Err(ProxyError::InvalidRequest("Missing body".to_string())),
        Some(Value::String(raw)) => {
            let is_base64 = payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let text = if is_base64 {
                let bytes = STANDARD.decode(raw).map_err(|e| {
                    ProxyError::InvalidRequest(format!("Failed to decode base64 body: {}", e))
                })?;
                String::from_utf8(bytes).map_err(|e| {
                    ProxyError::InvalidRequest(format!("Body is not valid UTF-8: {}", e))
                })?
            } else {
                raw.clone()
            };
            serde_json::from_str(&text)
                .map_err(|e| ProxyError::InvalidRequest(format!("Invalid JSON body: {}", e)))
        }
        Some(other) => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_method_http_api_v2() {
        let event = json!({"requestContext": {"http": {"method": "POST"}}});
        assert_eq!(request_method(&event), Some("POST"));
    }

    #[test]
    fn test_request_method_rest_v1() {
        let event = json!({"httpMethod": "OPTIONS", "requestContext": {}});
        assert_eq!(request_method(&event), Some("OPTIONS"));
    }

    #[test]
    fn test_parse_string_body() {
        let event = json!({"body": "{\"action\":\"sendMessage\",\"threadId\":\"t1\"}"});
        let body = parse_command_body(&event).unwrap();
        assert_eq!(body, json!({"action": "sendMessage", "threadId": "t1"}));
    }

    #[test]
    fn test_parse_base64_body() {
        let encoded = STANDARD.encode(r#"{"action":"createThread"}"#);
        let event = json!({"body": encoded, "isBase64Encoded": true});
        let body = parse_command_body(&event).unwrap();
        assert_eq!(body["action"], "createThread");
    }

    #[test]
    fn test_parse_object_body() {
        let event = json!({"body": {"action": "createThread"}});
        let body = parse_command_body(&event).unwrap();
        assert_eq!(body, json!({"action": "createThread"}));
    }

    #[test]
    fn test_parse_keeps_non_object_json_for_dispatch() {
        let event = json!({"body": "[\"createThread\"]"});
        assert_eq!(parse_command_body(&event).unwrap(), json!(["createThread"]));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let event = json!({"body": "action=createThread"});
        assert!(matches!(
            parse_command_body(&event),
            Err(ProxyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_missing_body() {
        let event = json!({"httpMethod": "POST"});
        assert!(parse_command_body(&event).is_err());
    }
}
