//! Per-learner, per-course completion state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The completion record for one (learner, course) pair.
///
/// Created on first enrollment and mutated only by the navigator's
/// mark-complete operation. The completion percentage is always derived,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub learner_id: Uuid,
  pub course_id:  Uuid,
  /// Completed lesson ids with their completion timestamps.
  #[serde(default)]
  pub completed:  BTreeMap<Uuid, DateTime<Utc>>,
  /// The lesson the learner most recently completed.
  pub last_accessed: Option<Uuid>,
}

impl ProgressRecord {
  /// An empty record for a learner who has completed nothing yet.
  pub fn empty(learner_id: Uuid, course_id: Uuid) -> Self {
    Self {
      learner_id,
      course_id,
      completed: BTreeMap::new(),
      last_accessed: None,
    }
  }

  pub fn is_complete(&self, lesson_id: Uuid) -> bool {
    self.completed.contains_key(&lesson_id)
  }

  pub fn completed_count(&self) -> usize { self.completed.len() }

  /// Completion percentage over `known_total` lessons, rounded down.
  /// Returns 0 when no lessons are known.
  pub fn percent_complete(&self, known_total: usize) -> u8 {
    if known_total == 0 {
      return 0;
    }
    let pct = self.completed.len() * 100 / known_total;
    pct.min(100) as u8
  }
}
