//! MCP (Model Context Protocol) server for Kakuyomu
//!
//! JSON-RPC 2.0 dispatch shared by the stdio and streamable HTTP transports.
//!
//! CRITICAL: on stdio, stdout is reserved EXCLUSIVELY for JSON-RPC responses.
//! All logs go to stderr.

pub mod resources;
pub mod tools;
pub mod transport;

use kaku_common::{KakuError, Result};
use kaku_config::{Config, McpConfig};
use kaku_core::KakuyomuClient;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "kakuyomu-mcp";

/// Protocol revision answered when the client does not ask for one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const RATE_LIMITED: i32 = 429;

/// JSON-RPC request
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// `None` when the member is absent, `Some(Value::Null)` for `"id": null`
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Requests without an id never get a response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Response for a line or body that is not a JSON-RPC request
    pub fn parse_error(err: &serde_json::Error) -> Self {
        Self::failure(None, JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", err)))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    /// Convert KakuError to JSON-RPC error
    pub fn from_kaku_error(err: &KakuError) -> Self {
        let code = match err {
            KakuError::RateLimit { .. } => RATE_LIMITED,
            KakuError::ValidationError(_) => INVALID_PARAMS,
            KakuError::ParseError(_) | KakuError::JsonError(_) => PARSE_ERROR,
            _ => INTERNAL_ERROR,
        };

        let data = match err {
            KakuError::RateLimit {
                current,
                limit,
                window,
                retry_after,
            } => Some(json!({
                "retry_after_seconds": retry_after,
                "limit": limit,
                "window_seconds": window,
                "current_count": current
            })),
            KakuError::HttpStatus { status, url } => Some(json!({
                "status": status,
                "url": url
            })),
            _ => None,
        };

        Self {
            code,
            message: err.to_string(),
            data,
        }
    }
}

impl From<KakuError> for JsonRpcError {
    fn from(err: KakuError) -> Self {
        Self::from_kaku_error(&err)
    }
}

/// Sliding-window limiter keyed by tool name
pub struct RateLimiter {
    limit: usize,
    window_secs: u64,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window_secs: u64) -> Self {
        Self {
            limit,
            window_secs,
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> Result<()> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<()> {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let key_requests = requests.entry(key.to_string()).or_default();

        key_requests.retain(|&time| now.duration_since(time).as_secs() < self.window_secs);

        if key_requests.len() >= self.limit {
            // Slot frees up when the oldest request leaves the window
            let elapsed = now.duration_since(key_requests[0]).as_secs();
            return Err(KakuError::RateLimit {
                current: key_requests.len(),
                limit: self.limit,
                window: self.window_secs,
                retry_after: self.window_secs.saturating_sub(elapsed),
            });
        }

        key_requests.push(now);
        Ok(())
    }
}

/// Server state shared by every transport
pub struct McpServer {
    client: KakuyomuClient,
    config: McpConfig,
    rate_limiter: RateLimiter,
}

impl McpServer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: KakuyomuClient::new(&config.http)?,
            config: config.mcp.clone(),
            rate_limiter: RateLimiter::new(config.mcp.rate_limit_per_minute, 60),
        })
    }

    pub fn client(&self) -> &KakuyomuClient {
        &self.client
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Handle a single JSON-RPC request
    ///
    /// Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::info!(target: "mcp", method = %request.method, "Handling MCP request");

        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }

        if request.id == Some(Value::Null) {
            return Some(JsonRpcResponse::failure(
                request.id,
                JsonRpcError::new(INVALID_REQUEST, "Request id must not be null"),
            ));
        }

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                request.id,
                JsonRpcError::new(
                    INVALID_REQUEST,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                ),
            ));
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::tool_definitions() })),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => Ok(json!({ "resources": resources::resource_list() })),
            "resources/read" => resources::read_resource(request.params),
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(error) => JsonRpcResponse::failure(request.id, error),
        })
    }

    fn handle_initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false, "subscribe": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": resources::SERVER_INFO
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        #[derive(Deserialize)]
        struct CallParams {
            name: String,
            #[serde(default)]
            arguments: Option<Value>,
        }

        let params: CallParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
            .and_then(|v| {
                serde_json::from_value(v)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
            })?;

        let tool = tools::Tool::from_name(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        let outcome = tools::call_tool(self, tool, params.arguments.unwrap_or(Value::Null)).await?;
        Ok(outcome.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn server() -> McpServer {
        McpServer::new(&Config::default()).unwrap()
    }

    fn request(id: Option<Value>, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let resp = server()
            .handle_request(request(Some(json!(1)), "ping", None))
            .await
            .unwrap();
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let resp = server()
            .handle_request(request(None, "notifications/initialized", None))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = server()
            .handle_request(request(Some(json!("a")), "prompts/list", None))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
        assert_eq!(resp.id, Some(json!("a")));
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let resp = server()
            .handle_request(request(
                Some(json!(1)),
                "initialize",
                Some(json!({"protocolVersion": "2024-11-05", "capabilities": {}})),
            ))
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut req = request(Some(json!(1)), "ping", None);
        req.jsonrpc = "1.0".to_string();
        let resp = server().handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_null_id_is_invalid_request() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));

        let resp = server().handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
        assert_eq!(resp.id, Some(Value::Null));
    }

    #[test]
    fn test_absent_id_is_notification() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn test_rate_limiter_retry_after_tracks_oldest_request() {
        let limiter = RateLimiter::new(2, 60);
        let start = Instant::now();
        assert!(limiter.check_at("get_rankings", start).is_ok());
        assert!(limiter
            .check_at("get_rankings", start + Duration::from_secs(20))
            .is_ok());

        let err = limiter
            .check_at("get_rankings", start + Duration::from_secs(45))
            .unwrap_err();
        assert!(matches!(err, KakuError::RateLimit { retry_after: 15, .. }));

        // oldest request has left the window
        assert!(limiter
            .check_at("get_rankings", start + Duration::from_secs(61))
            .is_ok());
    }

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check("get_top_page").is_ok());
        assert!(limiter.check("get_top_page").is_ok());
        let err = limiter.check("get_top_page").unwrap_err();
        assert!(matches!(err, KakuError::RateLimit { current: 2, limit: 2, .. }));
        assert!(limiter.check("get_rankings").is_ok());
    }

    #[test]
    fn test_error_codes() {
        let err = JsonRpcError::from_kaku_error(&KakuError::ValidationError("x".into()));
        assert_eq!(err.code, INVALID_PARAMS);

        let err = JsonRpcError::from_kaku_error(&KakuError::RateLimit {
            current: 3,
            limit: 3,
            window: 60,
            retry_after: 12,
        });
        assert_eq!(err.code, RATE_LIMITED);
        let data = err.data.unwrap();
        assert_eq!(data["limit"], 3);
        assert_eq!(data["retry_after_seconds"], 12);

        let err = JsonRpcError::from_kaku_error(&KakuError::MissingNextData);
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
