//! The `CourseStore` and `ProgressStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `syllabus-store-sqlite`). The engine and the API layer depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  outline::{Lesson, LessonFields, Section, SectionFields},
  progress::ProgressRecord,
};

// ─── CourseStore ─────────────────────────────────────────────────────────────

/// Abstraction over persisted curriculum content for one or more courses.
///
/// Create calls return the store-assigned id; callers bind it to the node
/// they are persisting before issuing any dependent call. Deleting a section
/// deletes its lessons in the same call — child removal is delegated to the
/// backend, never issued lesson-by-lesson.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CourseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sections ──────────────────────────────────────────────────────────

  /// Create a section under `course_id` and return its persisted id.
  fn create_section(
    &self,
    course_id: Uuid,
    fields: SectionFields,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Overwrite a section's writable fields (title and position).
  fn update_section(
    &self,
    section_id: Uuid,
    fields: SectionFields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a section and, implicitly, every lesson it owns.
  fn delete_section(
    &self,
    section_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Lessons ───────────────────────────────────────────────────────────

  /// Create a lesson under `section_id` and return its persisted id.
  fn create_lesson(
    &self,
    section_id: Uuid,
    fields: LessonFields,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Overwrite a lesson's writable fields.
  fn update_lesson(
    &self,
    lesson_id: Uuid,
    fields: LessonFields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_lesson(
    &self,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// List a course's sections in outline order, without their lessons.
  fn list_sections(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Section>, Self::Error>> + Send + '_;

  /// List a section's lessons in outline order. Returns `None` if the
  /// section itself no longer exists — callers must be able to tell a
  /// deleted section apart from an empty one.
  fn list_lessons(
    &self,
    section_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<Lesson>>, Self::Error>> + Send + '_;
}

// ─── ProgressStore ───────────────────────────────────────────────────────────

/// Abstraction over per-learner completion records.
pub trait ProgressStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The completion record for a (learner, course) pair. A learner who has
  /// completed nothing yet gets an empty record, not an error.
  fn get_progress(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<ProgressRecord, Self::Error>> + Send + '_;

  /// Record a lesson as complete and return the updated record.
  ///
  /// Idempotent: completing an already-complete lesson keeps the original
  /// completion timestamp. The last-accessed cursor moves either way.
  fn record_lesson_complete(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<ProgressRecord, Self::Error>> + Send + '_;
}
