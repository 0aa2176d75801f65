//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use solveai_session::Error as SessionError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(e: tokio::task::JoinError) -> Self { ApiError::Internal(e.to_string()) }
}

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self {
    match e {
      SessionError::ConceptNotFound(_) | SessionError::ReportNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      SessionError::Busy => ApiError::Conflict(e.to_string()),
      SessionError::Solver(_) => ApiError::Upstream(e.to_string()),
      SessionError::Store(inner) => ApiError::Store(inner),
      SessionError::NothingToSave
      | SessionError::NoAnalysis
      | SessionError::NoConceptSelected
      | SessionError::AlreadyAnalyzed
      | SessionError::EmptyMessage
      | SessionError::Invalid(_) => ApiError::BadRequest(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    if status.is_server_error() {
      tracing::warn!(%status, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
