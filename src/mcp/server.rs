//! HTTP server
//!
//! Serves the OAuth consent routes and the JSON-RPC endpoint.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};

use crate::config::Config;
use crate::docs::auth::{load_client_secret, Authenticator, TokenEndpoint};
use crate::docs::client::DocsClient;
use crate::docs::credentials::CredentialManager;
use crate::docs::store::{CredentialStore, FileCredentialStore};
use crate::error::Result;
use crate::mcp::dispatch::Dispatcher;
use crate::mcp::types::RpcResponse;

const INDEX_HTML: &str = "<a href='/authorize'>Authorize Google Docs access</a>";
const AUTHORIZED_HTML: &str = "Authorized. You can close this tab. Server ready.";

/// Shared handler state
#[derive(Clone)]
struct AppState {
    authenticator: Arc<Authenticator>,
    dispatcher: Arc<Dispatcher>,
}

/// Bridge server
pub struct McpServer {
    state: AppState,
}

impl McpServer {
    pub fn new(authenticator: Arc<Authenticator>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            state: AppState {
                authenticator,
                dispatcher,
            },
        }
    }

    /// Wire up the store, OAuth flow, credential manager and Docs client
    pub async fn from_config(config: &Config) -> Result<Self> {
        let secret = load_client_secret(&config.client_secrets_path).await?;
        let http_client = reqwest::Client::new();
        let endpoint = TokenEndpoint::new(http_client.clone());

        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.token_path()));
        let credentials = Arc::new(CredentialManager::new(
            store.clone(),
            Arc::new(endpoint.clone()),
        ));

        let authenticator = Arc::new(Authenticator::new(config, secret, endpoint, store));
        let docs_client = Arc::new(DocsClient::new(config, http_client, credentials));

        Ok(Self::new(authenticator, Arc::new(Dispatcher::new(docs_client))))
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.state.authenticator
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/authorize", get(authorize))
            .route("/oauth2callback", get(oauth2callback))
            .route("/mcp", post(mcp))
            .with_state(self.state.clone())
    }

    /// Serve until the listener fails
    pub async fn run(&self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn authorize(State(state): State<AppState>) -> Redirect {
    tracing::info!("Redirecting to consent screen");
    Redirect::temporary(&state.authenticator.begin_authorization())
}

async fn oauth2callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let code = params.get("code").map(String::as_str);
    match state.authenticator.complete_authorization(code).await {
        Ok(_) => Html(AUTHORIZED_HTML).into_response(),
        Err(e) => {
            tracing::warn!("Authorization callback failed: {}", e);
            (e.status(), e.to_string()).into_response()
        }
    }
}

async fn mcp(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<RpcResponse>) {
    let (status, response) = state.dispatcher.handle(&body).await;
    (status, Json(response))
}
