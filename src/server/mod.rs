//! HTTP proxy endpoint
//!
//! Exposes the gateway and the dispatcher to browser-style callers so that
//! provider keys can stay on the server.

mod error;
mod handlers;

pub use error::ApiError;

use crate::api::{COMMIT_DIFFS_PATH, COMMITS_PATH, GENERATE_NOTES_PATH, HEALTH_PATH, VISIBILITY_PATH};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::dispatch::{NoteDispatcher, NotesBackend};
use crate::github::{DirectGateway, RepositoryGateway};
use crate::trace_info;
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, read-only state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn RepositoryGateway>,
    pub backend: Arc<dyn NotesBackend>,
    /// Credentials from the server's environment; they win over request bodies
    pub server_credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn RepositoryGateway>,
        backend: Arc<dyn NotesBackend>,
        server_credentials: Credentials,
    ) -> Self {
        Self {
            gateway,
            backend,
            server_credentials: Arc::new(server_credentials),
        }
    }

    /// Direct gateway and local dispatcher configured from `config`, with
    /// credentials read from the environment
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let gateway = DirectGateway::new(http.clone())
            .with_api_url(&config.gateway.github_api_url)
            .with_max_concurrent_diffs(config.gateway.max_concurrent_diffs);
        let backend = NoteDispatcher::new(http, config.providers.clone());

        Self::new(Arc::new(gateway), Arc::new(backend), Credentials::from_env())
    }

    /// Layer request credentials under the server's own
    pub fn resolve(&self, request: Credentials) -> Credentials {
        self.server_credentials.as_ref().clone().prefer(request)
    }
}

/// Answer preflight requests and tag every response with the allowed origin
async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        return response;
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(VISIBILITY_PATH, post(handlers::visibility))
        .route(COMMITS_PATH, post(handlers::commits))
        .route(COMMIT_DIFFS_PATH, post(handlers::commit_diffs))
        .route(GENERATE_NOTES_PATH, post(handlers::generate_notes))
        .with_state(state)
        .layer(from_fn(cors))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    trace_info!("Proxy endpoint listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Proxy server error")
}
