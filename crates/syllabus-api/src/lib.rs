//! JSON REST API for Syllabus.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`syllabus_core::store::CourseStore`] and
//! [`syllabus_core::store::ProgressStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", syllabus_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod navigate;
pub mod outline;
pub mod progress;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use syllabus_core::store::{CourseStore, ProgressStore};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CourseStore + ProgressStore + Send + Sync + 'static,
{
  Router::new()
    // Outline
    .route(
      "/courses/{course_id}/outline",
      get(outline::get_outline::<S>).put(outline::save_outline::<S>),
    )
    .route(
      "/courses/{course_id}/sections",
      get(outline::list_sections::<S>),
    )
    .route(
      "/sections/{section_id}/lessons",
      get(outline::list_lessons::<S>),
    )
    // Progress
    .route(
      "/learners/{learner_id}/courses/{course_id}/progress",
      get(progress::get_one::<S>),
    )
    .route(
      "/learners/{learner_id}/courses/{course_id}/lessons/{lesson_id}/complete",
      post(progress::complete::<S>),
    )
    // Navigation
    .route(
      "/learners/{learner_id}/courses/{course_id}/current",
      get(navigate::current::<S>),
    )
    .route(
      "/learners/{learner_id}/courses/{course_id}/next",
      get(navigate::next::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
