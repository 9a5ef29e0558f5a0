//! JSON-RPC message types
//!
//! The host sends `{method, params, id}`; the `jsonrpc` field is accepted but
//! not required. Responses always carry `"jsonrpc": "2.0"` and echo `id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RpcError};

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

/// Inbound request. Only the envelope is validated up front so the `id`
/// survives a mistyped `method` or `params`.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    /// Correlation ID, echoed verbatim; `null` if absent
    pub id: Value,

    fields: Map<String, Value>,
}

impl RpcRequest {
    /// Parse a request body. Fails only when the body is not a JSON object.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|e| RpcError::InvalidRequest {
            message: e.to_string(),
        })?;

        let Value::Object(mut fields) = value else {
            return Err(RpcError::InvalidRequest {
                message: "request must be a JSON object".to_string(),
            }
            .into());
        };

        let id = fields.remove("id").unwrap_or(Value::Null);
        Ok(Self { id, fields })
    }

    /// Method name
    pub fn method(&self) -> Result<&str> {
        match self.fields.get("method") {
            None | Some(Value::Null) => Err(RpcError::InvalidRequest {
                message: "missing method".to_string(),
            }
            .into()),
            Some(Value::String(method)) => Ok(method.as_str()),
            Some(_) => Err(RpcError::InvalidRequest {
                message: "method must be a string".to_string(),
            }
            .into()),
        }
    }

    /// Method parameters; absent or `null` is treated as empty
    pub fn params(&self) -> Result<Params> {
        match self.fields.get("params") {
            None | Some(Value::Null) => Ok(Params::default()),
            Some(Value::Object(params)) => Ok(Params::new(Some(params.clone()))),
            Some(_) => Err(RpcError::InvalidRequest {
                message: "params must be an object".to_string(),
            }
            .into()),
        }
    }
}

/// Outbound response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,

    pub id: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcErrorBody {
                message: message.into(),
            }),
        }
    }
}

/// Error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
}

/// Typed lookups over request params
#[derive(Debug, Default)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new(params: Option<Map<String, Value>>) -> Self {
        Self(params.unwrap_or_default())
    }

    fn required(&self, key: &str) -> Result<&Value> {
        self.0.get(key).ok_or_else(|| {
            RpcError::MissingParam {
                key: key.to_string(),
            }
            .into()
        })
    }

    pub fn str(&self, key: &str) -> Result<&str> {
        self.required(key)?.as_str().ok_or_else(|| invalid(key, "a string"))
    }

    pub fn i64(&self, key: &str) -> Result<i64> {
        self.required(key)?.as_i64().ok_or_else(|| invalid(key, "an integer"))
    }

    /// Optional integer; an explicit `null` counts as absent
    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value.as_i64().ok_or_else(|| invalid(key, "an integer")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> crate::error::BridgeError {
    RpcError::InvalidParam {
        key: key.to_string(),
        expected,
    }
    .into()
}

/// Supported methods
pub mod methods {
    pub const LIST_DOCS: &str = "list_docs";
    pub const GET_DOC: &str = "get_doc";
    pub const INSERT_TEXT: &str = "insert_text";
    pub const FORMAT_RANGE: &str = "format_range";
}
