//! JSON-RPC dispatch
//!
//! Routes a request to the matching document operation and frames the outcome.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use crate::docs::client::{DocsClient, DEFAULT_INSERT_INDEX};
use crate::docs::types::TextFormat;
use crate::error::{Result, RpcError};
use crate::mcp::types::{methods, RpcRequest, RpcResponse};

/// Stateless request dispatcher
pub struct Dispatcher {
    docs_client: Arc<DocsClient>,
}

impl Dispatcher {
    pub fn new(docs_client: Arc<DocsClient>) -> Self {
        Self { docs_client }
    }

    /// Handle a raw request body. Never fails: errors become an error
    /// envelope with the matching status.
    pub async fn handle(&self, body: &[u8]) -> (StatusCode, RpcResponse) {
        let request = match RpcRequest::parse(body) {
            Ok(request) => request,
            Err(e) => return (e.status(), RpcResponse::error(Value::Null, e.to_string())),
        };

        let id = request.id.clone();
        match self.dispatch(&request).await {
            Ok(result) => (StatusCode::OK, RpcResponse::success(id, result)),
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    tracing::error!("Request {} failed: {}", id, e);
                } else {
                    tracing::debug!("Request {} rejected: {}", id, e);
                }
                (status, RpcResponse::error(id, e.to_string()))
            }
        }
    }

    async fn dispatch(&self, request: &RpcRequest) -> Result<Value> {
        let method = request.method()?;
        let params = request.params()?;

        match method {
            methods::LIST_DOCS => Ok(serde_json::to_value(self.docs_client.list_docs().await?)?),
            methods::GET_DOC => {
                let document_id = params.str("documentId")?;
                Ok(serde_json::to_value(self.docs_client.get_doc(document_id).await?)?)
            }
            methods::INSERT_TEXT => {
                let document_id = params.str("documentId")?;
                let text = params.str("text")?;
                let index = params.i64_or("index", DEFAULT_INSERT_INDEX)?;
                let result = self
                    .docs_client
                    .insert_text(document_id, text, index)
                    .await?;
                Ok(serde_json::to_value(result)?)
            }
            methods::FORMAT_RANGE => {
                let document_id = params.str("documentId")?;
                let start_index = params.i64("start_index")?;
                let end_index = params.i64("end_index")?;
                let format: TextFormat = params.str("format")?.parse()?;
                let result = self
                    .docs_client
                    .format_range(document_id, start_index, end_index, format)
                    .await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(RpcError::UnknownMethod {
                method: other.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::docs::auth::TokenEndpoint;
    use crate::docs::credentials::CredentialManager;
    use crate::docs::store::FileCredentialStore;
    use serde_json::json;

    /// Dispatcher whose remote endpoints are unreachable and whose store is empty
    fn dispatcher(dir: &std::path::Path) -> Dispatcher {
        let config = Config {
            docs_api_base_url: "http://127.0.0.1:9/docs".to_string(),
            drive_api_base_url: "http://127.0.0.1:9/drive".to_string(),
            tokens_dir: dir.to_path_buf(),
            ..Config::default()
        };
        let http = reqwest::Client::new();
        let store = Arc::new(FileCredentialStore::new(config.token_path()));
        let manager = Arc::new(CredentialManager::new(
            store,
            Arc::new(TokenEndpoint::new(http.clone())),
        ));
        Dispatcher::new(Arc::new(DocsClient::new(&config, http, manager)))
    }

    async fn call(body: Value) -> (StatusCode, Value) {
        let dir = tempfile::tempdir().unwrap();
        let (status, response) = dispatcher(dir.path())
            .handle(body.to_string().as_bytes())
            .await;
        (status, serde_json::to_value(response).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (status, body) = call(json!({"method": "delete_doc", "id": 7})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], 7);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("delete_doc"));
    }

    #[tokio::test]
    async fn test_missing_param() {
        let (status, body) = call(json!({"method": "get_doc", "params": {}, "id": "a"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], "a");
        assert_eq!(body["error"]["message"], "missing param: documentId");

        let (status, body) = call(json!({
            "method": "format_range",
            "params": {"documentId": "X", "start_index": 1, "format": "bold"},
            "id": "b"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "missing param: end_index");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let dir = tempfile::tempdir().unwrap();
        let (status, response) = dispatcher(dir.path()).handle(b"{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.id.is_null());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_missing_method() {
        let (status, body) = call(json!({"params": {}, "id": 1})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_mistyped_fields_echo_id() {
        let (status, body) = call(json!({"method": 5, "id": "k"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], "k");
        assert!(body["error"]["message"].as_str().unwrap().contains("method"));

        let (status, body) = call(json!({"method": "get_doc", "params": [], "id": "k"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], "k");
        assert!(body["error"]["message"].as_str().unwrap().contains("params"));
    }

    #[tokio::test]
    async fn test_non_object_body_has_null_id() {
        let (status, body) = call(json!(["get_doc"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["id"].is_null());
    }

    #[tokio::test]
    async fn test_unauthorized_without_credentials() {
        let (status, body) = call(json!({"method": "list_docs", "id": "u"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["id"], "u");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("/authorize"));
    }

    #[tokio::test]
    async fn test_unsupported_format_rejected_before_auth() {
        let (status, body) = call(json!({
            "method": "format_range",
            "params": {"documentId": "X", "start_index": 1, "end_index": 3, "format": "underline"},
            "id": "f"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("underline"));
    }
}
