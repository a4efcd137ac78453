//! Error types for `syllabus-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("node has no persisted identity yet")]
  PendingIdentity,

  #[error("section title must not be empty")]
  EmptySectionTitle,

  #[error("lesson title must not be empty")]
  EmptyLessonTitle,

  #[error("duplicate persisted identity in outline: {0}")]
  DuplicateIdentity(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
