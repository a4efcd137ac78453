//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use syllabus_core::outline::{Lesson, NodeId, Section};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// A `sections` row as read from the database, before decoding.
pub struct RawSection {
  pub section_id: String,
  pub title:      String,
  pub position:   i64,
}

impl RawSection {
  pub fn into_section(self) -> Result<Section> {
    Ok(Section {
      id:       NodeId::Persisted(decode_uuid(&self.section_id)?),
      title:    self.title,
      position: self.position as u32,
      lessons:  Vec::new(),
    })
  }
}

/// A `lessons` row as read from the database, before decoding.
pub struct RawLesson {
  pub lesson_id:        String,
  pub title:            String,
  pub content:          String,
  pub media_url:        Option<String>,
  pub preview_eligible: bool,
  pub position:         i64,
}

impl RawLesson {
  pub fn into_lesson(self) -> Result<Lesson> {
    Ok(Lesson {
      id:               NodeId::Persisted(decode_uuid(&self.lesson_id)?),
      title:            self.title,
      content:          self.content,
      media_url:        self.media_url,
      preview_eligible: self.preview_eligible,
      position:         self.position as u32,
    })
  }
}

/// A `lesson_completions` row as read from the database, before decoding.
pub struct RawCompletion {
  pub lesson_id:    String,
  pub completed_at: String,
}

impl RawCompletion {
  pub fn into_pair(self) -> Result<(Uuid, DateTime<Utc>)> {
    Ok((decode_uuid(&self.lesson_id)?, decode_dt(&self.completed_at)?))
  }
}
