//! Loading a full course outline from the store.

use syllabus_core::{outline::CourseOutline, store::CourseStore};
use uuid::Uuid;

use crate::error::LoadError;

/// Fetch the persisted outline for `course_id`: the section list plus every
/// section's lessons.
///
/// This is the edit-session baseline handed to
/// [`reconcile`](crate::reconcile::reconcile) — fetched once at session
/// start, discarded (and refetched) after a save. Lessons are loaded section
/// by section, sequentially, in outline order.
pub async fn fetch_outline<S: CourseStore>(
  store: &S,
  course_id: Uuid,
) -> Result<CourseOutline, LoadError> {
  let mut sections =
    store.list_sections(course_id).await.map_err(LoadError::store)?;

  for section in &mut sections {
    if let Some(id) = section.id.persisted() {
      section.lessons = store
        .list_lessons(id)
        .await
        .map_err(LoadError::store)?
        .ok_or(LoadError::SectionNotFound(id))?;
    }
  }

  Ok(CourseOutline { course_id, sections })
}
