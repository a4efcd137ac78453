//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use syllabus_engine::{
  LoadError, ProgressWriteError, ReconcileError, ReconcileOp,
};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A reconciliation stopped partway. The operations in `applied` are
  /// committed and stay committed; the client must refetch the outline
  /// before retrying.
  #[error("partial synchronization: {message}")]
  PartialSync {
    message: String,
    applied: Vec<ReconcileOp>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<LoadError> for ApiError {
  fn from(e: LoadError) -> Self {
    match e {
      LoadError::SectionNotFound(_)
      | LoadError::LessonNotInCourse(_)
      | LoadError::CourseEmpty(_) => ApiError::NotFound(e.to_string()),
      LoadError::Store(source) => ApiError::Store(source),
    }
  }
}

impl From<ProgressWriteError> for ApiError {
  fn from(e: ProgressWriteError) -> Self {
    match e {
      ProgressWriteError::Store(source) => ApiError::Store(source),
    }
  }
}

impl From<ReconcileError> for ApiError {
  fn from(e: ReconcileError) -> Self {
    match e {
      ReconcileError::InvalidWorkingCopy(inner) => {
        ApiError::BadRequest(inner.to_string())
      }
      ReconcileError::Store { op, entity, applied, source } => {
        ApiError::PartialSync {
          message: format!("{op} failed for {entity}: {source}"),
          applied,
        }
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::PartialSync { message, applied } => (
        StatusCode::CONFLICT,
        Json(json!({ "error": message, "applied": applied })),
      )
        .into_response(),
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
