//! JSON-RPC 2.0 envelopes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code used for every failure this server reports
pub const SERVER_ERROR: i32 = -32000;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code: SERVER_ERROR,
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = RpcResponse::success(json!(7), json!({"status": "ready"}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 7, "result": {"status": "ready"}}));
    }

    #[test]
    fn test_error_envelope() {
        let response = RpcResponse::error(Value::Null, "bad");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32000, "message": "bad"}})
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: RpcRequest = serde_json::from_str(r#"{"method":"initialize"}"#).unwrap();
        assert_eq!(request.method, "initialize");
        assert!(request.id.is_null());
        assert!(request.params.is_null());
    }
}
