//! Curriculum outline types — the ordered tree of sections and lessons that
//! makes up one course's teachable content.
//!
//! An outline is session-scoped: it is loaded at the start of an edit or
//! learning session and discarded when the session ends. It is never cached
//! across sessions because it may be stale.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The identity of a section or lesson.
///
/// Identity is the sole correlation key between an edit baseline and a
/// working copy: a node carrying the same persisted id in both trees is
/// "existing", a `Pending` node is "new", and a baseline id absent from the
/// working copy is "removed".
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum NodeId {
  /// Not yet created in the store. The store assigns the real id on create.
  Pending,
  /// Assigned by the store once the node was created.
  Persisted(Uuid),
}

impl NodeId {
  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }

  /// The persisted id, if one has been assigned.
  pub fn persisted(&self) -> Option<Uuid> {
    match self {
      Self::Persisted(id) => Some(*id),
      Self::Pending => None,
    }
  }

  /// The persisted id, or [`Error::PendingIdentity`] if the node has not
  /// been created yet.
  pub fn require_persisted(&self) -> Result<Uuid> {
    self.persisted().ok_or(Error::PendingIdentity)
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Pending => write!(f, "pending"),
      Self::Persisted(id) => write!(f, "{id}"),
    }
  }
}

// ─── Writable field sets ─────────────────────────────────────────────────────

/// The writable fields accepted by the store's section create/update calls.
/// `position` is explicit: siblings are renumbered on every reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFields {
  pub title:    String,
  pub position: u32,
}

/// The writable fields accepted by the store's lesson create/update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonFields {
  pub title:            String,
  /// Opaque rich-text/HTML payload; passed through uninterpreted.
  pub content:          String,
  pub media_url:        Option<String>,
  pub preview_eligible: bool,
  pub position:         u32,
}

// ─── Lesson ──────────────────────────────────────────────────────────────────

/// One unit of content within a section. Exclusively owned by one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
  pub id:               NodeId,
  pub title:            String,
  /// Opaque rich-text/HTML payload; passed through uninterpreted.
  pub content:          String,
  /// e.g. a video URL.
  pub media_url:        Option<String>,
  /// Visible to non-enrolled users.
  pub preview_eligible: bool,
  pub position:         u32,
}

impl Lesson {
  /// A new, not-yet-persisted lesson with empty content.
  pub fn pending(title: impl Into<String>, position: u32) -> Self {
    Self {
      id: NodeId::Pending,
      title: title.into(),
      content: String::new(),
      media_url: None,
      preview_eligible: false,
      position,
    }
  }

  /// The writable field set for this lesson at the given sibling position.
  pub fn fields(&self, position: u32) -> LessonFields {
    LessonFields {
      title:            self.title.clone(),
      content:          self.content.clone(),
      media_url:        self.media_url.clone(),
      preview_eligible: self.preview_eligible,
      position,
    }
  }
}

// ─── Section ─────────────────────────────────────────────────────────────────

/// One labeled grouping of lessons. Exclusively owned by one outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
  pub id:       NodeId,
  pub title:    String,
  pub position: u32,
  #[serde(default)]
  pub lessons:  Vec<Lesson>,
}

impl Section {
  /// A new, not-yet-persisted section with no lessons.
  pub fn pending(title: impl Into<String>, position: u32) -> Self {
    Self {
      id: NodeId::Pending,
      title: title.into(),
      position,
      lessons: Vec::new(),
    }
  }

  /// The writable field set for this section at the given sibling position.
  pub fn fields(&self, position: u32) -> SectionFields {
    SectionFields { title: self.title.clone(), position }
  }

  /// Find a lesson by persisted id.
  pub fn lesson(&self, id: Uuid) -> Option<&Lesson> {
    self
      .lessons
      .iter()
      .find(|l| l.id.persisted() == Some(id))
  }

  /// Persisted ids of this section's lessons, in outline order.
  pub fn persisted_lesson_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
    self.lessons.iter().filter_map(|l| l.id.persisted())
  }
}

// ─── CourseOutline ───────────────────────────────────────────────────────────

/// Root aggregate for one course's teachable content: an ordered sequence of
/// sections, each owning an ordered sequence of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
  pub course_id: Uuid,
  #[serde(default)]
  pub sections:  Vec<Section>,
}

impl CourseOutline {
  pub fn new(course_id: Uuid) -> Self {
    Self { course_id, sections: Vec::new() }
  }

  /// Find a section by persisted id.
  pub fn section(&self, id: Uuid) -> Option<&Section> {
    self
      .sections
      .iter()
      .find(|s| s.id.persisted() == Some(id))
  }

  /// Persisted ids of this outline's sections, in outline order.
  pub fn persisted_section_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
    self.sections.iter().filter_map(|s| s.id.persisted())
  }

  /// Total number of lessons across all sections.
  pub fn lesson_count(&self) -> usize {
    self.sections.iter().map(|s| s.lessons.len()).sum()
  }

  /// Check the structural constraints an outline must satisfy before it can
  /// be written back: non-empty titles and no duplicate persisted identity.
  pub fn validate(&self) -> Result<()> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    for section in &self.sections {
      if section.title.trim().is_empty() {
        return Err(Error::EmptySectionTitle);
      }
      if let Some(id) = section.id.persisted()
        && !seen.insert(id)
      {
        return Err(Error::DuplicateIdentity(id));
      }
      for lesson in &section.lessons {
        if lesson.title.trim().is_empty() {
          return Err(Error::EmptyLessonTitle);
        }
        if let Some(id) = lesson.id.persisted()
          && !seen.insert(id)
        {
          return Err(Error::DuplicateIdentity(id));
        }
      }
    }
    Ok(())
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
