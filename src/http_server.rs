//! # HTTP Server
//!
//! The request gateway: a thin axum shell over the resolver. Deserializes the
//! two identifier fields, guards input shape, retries transient store
//! failures with backoff, and serializes the cluster view. Transport errors
//! never leak internal detail.

use crate::config::RetryTuning;
use crate::model::ClusterView;
use crate::resolver::ResolveError;
use crate::store::{ContactStore, MemoryStore};
use crate::IdentityResolver;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Shared gateway state.
pub struct AppState<S: ContactStore = MemoryStore> {
    pub resolver: Arc<IdentityResolver<S>>,
    pub retry: RetryTuning,
}

impl<S: ContactStore> AppState<S> {
    pub fn new(resolver: IdentityResolver<S>, retry: RetryTuning) -> Self {
        Self {
            resolver: Arc::new(resolver),
            retry,
        }
    }
}

impl<S: ContactStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            retry: self.retry,
        }
    }
}

/// Inbound body of `POST /identify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Successful response envelope of `POST /identify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub contact: ClusterView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Gateway-level errors, mapped onto HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("service unavailable")]
    Unavailable,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidInput => ApiError::BadRequest(err.to_string()),
            ResolveError::Store(store_err) => {
                tracing::error!(error = %store_err, "store failure during resolution");
                ApiError::Unavailable
            }
            ResolveError::EmptyCluster => {
                tracing::error!(error = %err, "invariant violation during resolution");
                ApiError::Internal
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Build the gateway router over the given state.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: ContactStore + Send + 'static,
{
    Router::new()
        .route("/identify", post(identify::<S>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn identify<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
    S: ContactStore + Send + 'static,
{
    let email = request.email.as_deref();
    let phone = request.phone_number.as_deref();

    let mut attempt = 1;
    let contact = loop {
        match state.resolver.resolve(email, phone) {
            Ok(view) => break view,
            Err(err) if err.is_transient() && attempt < state.retry.max_attempts => {
                let delay = state.retry.delay_for(attempt);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying after transient store failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(ApiError::from(err)),
        }
    };

    Ok(Json(IdentifyResponse { contact }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Bind and serve until the task ends or ctrl-c arrives.
pub async fn run_http_server<S>(addr: &str, state: AppState<S>) -> anyhow::Result<()>
where
    S: ContactStore + Send + 'static,
{
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "idlink server listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }
    Ok(())
}
