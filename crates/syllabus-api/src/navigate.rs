//! Handlers for learner navigation endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/learners/:lid/courses/:cid/current` | Optional `?lesson_id=` |
//! | `GET` | `/learners/:lid/courses/:cid/next?after=<uuid>` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use syllabus_core::{
  outline::Lesson,
  store::{CourseStore, ProgressStore},
};
use syllabus_engine::{Advance, LoadError, Navigator};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Current lesson ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CurrentParams {
  pub lesson_id: Option<Uuid>,
}

/// `GET /learners/:learner_id/courses/:course_id/current[?lesson_id=<uuid>]`
///
/// Resolves the lesson the learner should see: the requested lesson if one
/// is given, otherwise the last lesson they completed, otherwise the first
/// lesson of the course. 404 on an empty course or an explicitly requested
/// foreign lesson id. A stale cursor (the last-completed lesson has since
/// been removed from the outline) falls back to the first lesson instead of
/// failing.
pub async fn current<S>(
  State(store): State<Arc<S>>,
  Path((learner_id, course_id)): Path<(Uuid, Uuid)>,
  Query(params): Query<CurrentParams>,
) -> Result<Json<Lesson>, ApiError>
where
  S: CourseStore + ProgressStore + 'static,
{
  let mut nav =
    Navigator::start(store.clone(), store.clone(), course_id, learner_id)
      .await?;
  let lesson = match params.lesson_id {
    Some(wanted) => nav.resolve_current_lesson(Some(wanted)).await?,
    None => match nav.progress().last_accessed {
      Some(cursor) => match nav.resolve_current_lesson(Some(cursor)).await {
        Ok(lesson) => lesson,
        Err(LoadError::LessonNotInCourse(_)) => {
          nav.resolve_current_lesson(None).await?
        }
        Err(e) => return Err(e.into()),
      },
      None => nav.resolve_current_lesson(None).await?,
    },
  };
  Ok(Json(lesson))
}

// ─── Next lesson ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NextParams {
  pub after: Uuid,
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
  pub next:          Option<Lesson>,
  pub end_of_course: bool,
}

/// `GET /learners/:learner_id/courses/:course_id/next?after=<uuid>`
///
/// The lesson following `after` in traversal order (sections in outline
/// order, lessons in outline order within each). Empty sections are skipped.
pub async fn next<S>(
  State(store): State<Arc<S>>,
  Path((learner_id, course_id)): Path<(Uuid, Uuid)>,
  Query(params): Query<NextParams>,
) -> Result<Json<NextResponse>, ApiError>
where
  S: CourseStore + ProgressStore + 'static,
{
  let mut nav =
    Navigator::start(store.clone(), store.clone(), course_id, learner_id)
      .await?;
  let response = match nav.advance(params.after).await? {
    Advance::Next(lesson) => {
      NextResponse { next: Some(lesson), end_of_course: false }
    }
    Advance::EndOfCourse => {
      NextResponse { next: None, end_of_course: true }
    }
  };
  Ok(Json(response))
}
