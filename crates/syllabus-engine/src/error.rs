//! Error types for the engine.
//!
//! All three families surface to the caller unmodified: the engine performs
//! no silent recovery, no automatic retry, and no partial-state repair.

use std::fmt;

use serde::Serialize;
use syllabus_core::outline::NodeId;
use thiserror::Error;
use uuid::Uuid;

use crate::reconcile::ReconcileOp;

/// Store errors are carried opaquely; the engine never inspects them.
pub type BoxedStoreError = Box<dyn std::error::Error + Send + Sync>;

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// The kind of store call that failed during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
  CreateSection,
  UpdateSection,
  DeleteSection,
  CreateLesson,
  UpdateLesson,
  DeleteLesson,
}

impl fmt::Display for OpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::CreateSection => "create-section",
      Self::UpdateSection => "update-section",
      Self::DeleteSection => "delete-section",
      Self::CreateLesson => "create-lesson",
      Self::UpdateLesson => "update-lesson",
      Self::DeleteLesson => "delete-lesson",
    };
    write!(f, "{s}")
  }
}

/// The entity a failed store call was addressing. Creates carry
/// [`NodeId::Pending`] — the node had no persisted identity yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Section(NodeId),
  Lesson(NodeId),
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Section(id) => write!(f, "section {id}"),
      Self::Lesson(id) => write!(f, "lesson {id}"),
    }
  }
}

/// A reconciliation did not run to completion.
///
/// There is no rollback: on a `Store` failure, everything in `applied` has
/// already been committed and stays committed. The caller must treat the
/// persisted state as partially synchronized ("some changes were not saved")
/// and refetch before retrying.
#[derive(Debug, Error)]
pub enum ReconcileError {
  /// The working copy failed structural validation; nothing was written.
  #[error("invalid working copy: {0}")]
  InvalidWorkingCopy(#[from] syllabus_core::Error),

  #[error(
    "{op} failed for {entity} after {n} applied operation(s): {source}",
    n = .applied.len()
  )]
  Store {
    op:      OpKind,
    entity:  Entity,
    /// Operations already committed before the failure, in issue order.
    applied: Vec<ReconcileOp>,
    #[source]
    source:  BoxedStoreError,
  },
}

impl ReconcileError {
  pub(crate) fn store_failure(
    op: OpKind,
    entity: Entity,
    applied: Vec<ReconcileOp>,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Store { op, entity, applied, source: Box::new(source) }
  }
}

// ─── Navigation ──────────────────────────────────────────────────────────────

/// A section's lessons could not be fetched, or a requested lesson does not
/// belong to the course.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("section not found: {0}")]
  SectionNotFound(Uuid),

  #[error("lesson {0} does not belong to this course")]
  LessonNotInCourse(Uuid),

  #[error("course {0} has no lessons")]
  CourseEmpty(Uuid),

  #[error("store error: {0}")]
  Store(#[source] BoxedStoreError),
}

impl LoadError {
  pub(crate) fn store(
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Store(Box::new(source))
  }
}

/// The progress store rejected a completion write. Local completion state is
/// only mutated after the write is acknowledged, so on this error the lesson
/// is still incomplete everywhere.
#[derive(Debug, Error)]
pub enum ProgressWriteError {
  #[error("progress store rejected the completion write: {0}")]
  Store(#[source] BoxedStoreError),
}

impl ProgressWriteError {
  pub(crate) fn store(
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Store(Box::new(source))
  }
}
