//! The reconciler: given an edit baseline and a working copy of the same
//! course outline, compute and execute the minimal ordered sequence of store
//! writes that makes persisted state match the working copy.
//!
//! Identity correlates the two trees. Nodes are matched by persisted id;
//! pending nodes are created, unmatched baseline nodes are deleted. Sibling
//! positions are renumbered from working-copy order on every pass, so order
//! survives a round-trip through the store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use syllabus_core::{
  outline::{CourseOutline, Lesson, NodeId, Section},
  store::CourseStore,
};
use uuid::Uuid;

use crate::error::{Entity, OpKind, ReconcileError};

// ─── Report ──────────────────────────────────────────────────────────────────

/// One store write committed during reconciliation. Creates carry the
/// store-assigned id so the caller can rebind pending nodes without an
/// immediate refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReconcileOp {
  CreateSection { id: Uuid },
  UpdateSection { id: Uuid },
  DeleteSection { id: Uuid },
  CreateLesson { id: Uuid, section_id: Uuid },
  UpdateLesson { id: Uuid },
  DeleteLesson { id: Uuid },
}

/// The writes committed by a successful reconciliation, in issue order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
  pub applied: Vec<ReconcileOp>,
}

impl ReconcileReport {
  /// True if baseline and working copy were already in sync.
  pub fn is_noop(&self) -> bool { self.applied.is_empty() }
}

// ─── Sequencer ───────────────────────────────────────────────────────────────

/// Issues store calls one at a time and keeps the ledger of committed writes.
/// On failure the ledger moves into the error, since those writes stay
/// committed.
struct Sequencer<'a, S: CourseStore> {
  store:   &'a S,
  applied: Vec<ReconcileOp>,
}

impl<'a, S: CourseStore> Sequencer<'a, S> {
  fn fail(
    &mut self,
    op: OpKind,
    entity: Entity,
    source: S::Error,
  ) -> ReconcileError {
    ReconcileError::store_failure(
      op,
      entity,
      std::mem::take(&mut self.applied),
      source,
    )
  }

  async fn create_section(
    &mut self,
    course_id: Uuid,
    section: &Section,
    position: u32,
  ) -> Result<Uuid, ReconcileError> {
    match self
      .store
      .create_section(course_id, section.fields(position))
      .await
    {
      Ok(id) => {
        self.applied.push(ReconcileOp::CreateSection { id });
        Ok(id)
      }
      Err(e) => {
        Err(self.fail(OpKind::CreateSection, Entity::Section(section.id), e))
      }
    }
  }

  async fn update_section(
    &mut self,
    id: Uuid,
    section: &Section,
    position: u32,
  ) -> Result<(), ReconcileError> {
    match self.store.update_section(id, section.fields(position)).await {
      Ok(()) => {
        self.applied.push(ReconcileOp::UpdateSection { id });
        Ok(())
      }
      Err(e) => Err(self.fail(
        OpKind::UpdateSection,
        Entity::Section(NodeId::Persisted(id)),
        e,
      )),
    }
  }

  async fn delete_section(&mut self, id: Uuid) -> Result<(), ReconcileError> {
    match self.store.delete_section(id).await {
      Ok(()) => {
        self.applied.push(ReconcileOp::DeleteSection { id });
        Ok(())
      }
      Err(e) => Err(self.fail(
        OpKind::DeleteSection,
        Entity::Section(NodeId::Persisted(id)),
        e,
      )),
    }
  }

  async fn create_lesson(
    &mut self,
    section_id: Uuid,
    lesson: &Lesson,
    position: u32,
  ) -> Result<Uuid, ReconcileError> {
    match self
      .store
      .create_lesson(section_id, lesson.fields(position))
      .await
    {
      Ok(id) => {
        self.applied.push(ReconcileOp::CreateLesson { id, section_id });
        Ok(id)
      }
      Err(e) => {
        Err(self.fail(OpKind::CreateLesson, Entity::Lesson(lesson.id), e))
      }
    }
  }

  async fn update_lesson(
    &mut self,
    id: Uuid,
    lesson: &Lesson,
    position: u32,
  ) -> Result<(), ReconcileError> {
    match self.store.update_lesson(id, lesson.fields(position)).await {
      Ok(()) => {
        self.applied.push(ReconcileOp::UpdateLesson { id });
        Ok(())
      }
      Err(e) => Err(self.fail(
        OpKind::UpdateLesson,
        Entity::Lesson(NodeId::Persisted(id)),
        e,
      )),
    }
  }

  async fn delete_lesson(&mut self, id: Uuid) -> Result<(), ReconcileError> {
    match self.store.delete_lesson(id).await {
      Ok(()) => {
        self.applied.push(ReconcileOp::DeleteLesson { id });
        Ok(())
      }
      Err(e) => Err(self.fail(
        OpKind::DeleteLesson,
        Entity::Lesson(NodeId::Persisted(id)),
        e,
      )),
    }
  }
}

// ─── Reconcile ───────────────────────────────────────────────────────────────

/// Execute the ordered create/update/delete sequence that makes the persisted
/// outline match `working`.
///
/// The sequence is strictly sequential: section creation precedes the
/// creation of that section's own lessons (which need the store-assigned id),
/// and deletions are issued after creations and updates. Updates are skipped
/// when no writable field changed relative to the baseline, so an untouched
/// outline produces zero writes. A lesson sitting under a different section
/// than it did in the baseline is recreated under its new section with a
/// store-assigned id; the old section's delete pass removes the original.
///
/// There is no transaction and no rollback. If a call fails, the earlier
/// calls stay committed and the returned [`ReconcileError`] carries them
/// alongside the failed operation and entity identity. Retrying is the
/// caller's responsibility, after refetching a fresh baseline.
pub async fn reconcile<S: CourseStore>(
  store: &S,
  baseline: &CourseOutline,
  working: &CourseOutline,
) -> Result<ReconcileReport, ReconcileError> {
  working.validate()?;

  let mut seq = Sequencer { store, applied: Vec::new() };

  for (index, section) in working.sections.iter().enumerate() {
    let position = index as u32;

    let section_id = match section.id {
      NodeId::Pending => {
        seq
          .create_section(working.course_id, section, position)
          .await?
      }
      NodeId::Persisted(id) => {
        let unchanged = baseline
          .section(id)
          .is_some_and(|b| b.fields(b.position) == section.fields(position));
        if !unchanged {
          seq.update_section(id, section, position).await?;
        }
        id
      }
    };

    let base_section =
      section.id.persisted().and_then(|id| baseline.section(id));

    for (lesson_index, lesson) in section.lessons.iter().enumerate() {
      let lesson_position = lesson_index as u32;
      match lesson.id {
        NodeId::Pending => {
          seq.create_lesson(section_id, lesson, lesson_position).await?;
        }
        NodeId::Persisted(id) => match base_section.and_then(|s| s.lesson(id))
        {
          Some(b) => {
            if b.fields(b.position) != lesson.fields(lesson_position) {
              seq.update_lesson(id, lesson, lesson_position).await?;
            }
          }
          // Not in this section's baseline: the lesson moved in from
          // another section (or the id is stale). Recreate it here; the
          // old section's delete pass removes the original.
          None => {
            seq.create_lesson(section_id, lesson, lesson_position).await?;
          }
        },
      }
    }

    // Lessons present in the baseline section but gone from the working copy.
    if let Some(base_section) = base_section {
      let kept: HashSet<Uuid> = section.persisted_lesson_ids().collect();
      for removed in base_section
        .persisted_lesson_ids()
        .filter(|id| !kept.contains(id))
      {
        seq.delete_lesson(removed).await?;
      }
    }
  }

  // Sections present in the baseline but gone from the working copy. Their
  // lessons go with them — child removal is delegated to the store.
  let kept: HashSet<Uuid> = working.persisted_section_ids().collect();
  for removed in baseline
    .persisted_section_ids()
    .filter(|id| !kept.contains(id))
  {
    seq.delete_section(removed).await?;
  }

  let report = ReconcileReport { applied: seq.applied };
  tracing::debug!(
    course_id = %working.course_id,
    ops = report.applied.len(),
    "reconciled outline"
  );
  Ok(report)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
