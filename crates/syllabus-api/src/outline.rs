//! Handlers for course outline endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/courses/:id/outline` | Full outline, lessons included |
//! | `PUT`  | `/courses/:id/outline` | Body: `{"sections":[...]}` — reconcile |
//! | `GET`  | `/courses/:id/sections` | Section list only, lessons empty |
//! | `GET`  | `/sections/:id/lessons` | 404 if the section does not exist |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use syllabus_core::{
  outline::{CourseOutline, Lesson, Section},
  store::CourseStore,
};
use syllabus_engine::{ReconcileReport, fetch_outline, reconcile};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Get outline ─────────────────────────────────────────────────────────────

/// `GET /courses/:id/outline`
pub async fn get_outline<S>(
  State(store): State<Arc<S>>,
  Path(course_id): Path<Uuid>,
) -> Result<Json<CourseOutline>, ApiError>
where
  S: CourseStore,
{
  let outline = fetch_outline(store.as_ref(), course_id).await?;
  Ok(Json(outline))
}

// ─── Save outline ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveOutlineBody {
  pub sections: Vec<Section>,
}

/// `PUT /courses/:id/outline` — reconcile the submitted working copy against
/// the persisted outline.
///
/// The baseline is fetched server-side immediately before reconciling.
/// On partial failure the response is 409 and carries the committed
/// operations.
pub async fn save_outline<S>(
  State(store): State<Arc<S>>,
  Path(course_id): Path<Uuid>,
  Json(body): Json<SaveOutlineBody>,
) -> Result<Json<ReconcileReport>, ApiError>
where
  S: CourseStore,
{
  let baseline = fetch_outline(store.as_ref(), course_id).await?;
  let working = CourseOutline { course_id, sections: body.sections };
  let report = reconcile(store.as_ref(), &baseline, &working).await?;
  Ok(Json(report))
}

// ─── Section and lesson lists ────────────────────────────────────────────────

/// `GET /courses/:id/sections`
pub async fn list_sections<S>(
  State(store): State<Arc<S>>,
  Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Section>>, ApiError>
where
  S: CourseStore,
{
  let sections = store
    .list_sections(course_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sections))
}

/// `GET /sections/:id/lessons`
pub async fn list_lessons<S>(
  State(store): State<Arc<S>>,
  Path(section_id): Path<Uuid>,
) -> Result<Json<Vec<Lesson>>, ApiError>
where
  S: CourseStore,
{
  let lessons = store
    .list_lessons(section_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("section {section_id} not found"))
    })?;
  Ok(Json(lessons))
}
