//! Handlers for learner progress endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/learners/:lid/courses/:cid/progress` | Record plus percentage |
//! | `POST` | `/learners/:lid/courses/:cid/lessons/:id/complete` | Idempotent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use syllabus_core::{
  progress::ProgressRecord,
  store::{CourseStore, ProgressStore},
};
use syllabus_engine::Navigator;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Get progress ────────────────────────────────────────────────────────────

/// A progress record together with the derived completion statistics.
#[derive(Debug, Serialize)]
pub struct ProgressView {
  #[serde(flatten)]
  pub record:           ProgressRecord,
  pub completed_count:  usize,
  pub total_lessons:    usize,
  pub percent_complete: u8,
}

/// `GET /learners/:learner_id/courses/:course_id/progress`
///
/// Loads every section's lessons so the percentage is exact, not an
/// approximation over whatever happens to be cached.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((learner_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProgressView>, ApiError>
where
  S: CourseStore + ProgressStore + 'static,
{
  let mut nav =
    Navigator::start(store.clone(), store.clone(), course_id, learner_id)
      .await?;
  nav.load_all().await?;

  let view = ProgressView {
    completed_count:  nav.progress().completed_count(),
    total_lessons:    nav.known_lesson_total(),
    percent_complete: nav.percent_complete(),
    record:           nav.progress().clone(),
  };
  Ok(Json(view))
}

// ─── Mark complete ───────────────────────────────────────────────────────────

/// `POST /learners/:learner_id/courses/:course_id/lessons/:lesson_id/complete`
///
/// 404 if the lesson does not belong to the course. Completing an
/// already-complete lesson succeeds and changes nothing.
pub async fn complete<S>(
  State(store): State<Arc<S>>,
  Path((learner_id, course_id, lesson_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<ProgressRecord>, ApiError>
where
  S: CourseStore + ProgressStore + 'static,
{
  let mut nav =
    Navigator::start(store.clone(), store.clone(), course_id, learner_id)
      .await?;
  // Membership check before the write.
  nav.resolve_current_lesson(Some(lesson_id)).await?;
  let record = nav.mark_complete(lesson_id).await?.clone();
  Ok(Json(record))
}
