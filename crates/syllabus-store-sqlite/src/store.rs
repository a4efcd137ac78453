//! [`SqliteStore`] — the SQLite implementation of [`CourseStore`] and
//! [`ProgressStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use syllabus_core::{
  outline::{Lesson, LessonFields, Section, SectionFields},
  progress::ProgressRecord,
  store::{CourseStore, ProgressStore},
};

use crate::{
  Error, Result,
  encode::{
    RawCompletion, RawLesson, RawSection, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Syllabus store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CourseStore impl ────────────────────────────────────────────────────────

impl CourseStore for SqliteStore {
  type Error = Error;

  // ── Sections ──────────────────────────────────────────────────────────────

  async fn create_section(
    &self,
    course_id: Uuid,
    fields: SectionFields,
  ) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let course_str = encode_uuid(course_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sections (section_id, course_id, title, position)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, course_str, fields.title, fields.position],
        )?;
        Ok(())
      })
      .await?;

    Ok(id)
  }

  async fn update_section(
    &self,
    section_id: Uuid,
    fields: SectionFields,
  ) -> Result<()> {
    let id_str = encode_uuid(section_id);

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE sections SET title = ?2, position = ?3 WHERE section_id = ?1",
          rusqlite::params![id_str, fields.title, fields.position],
        )?;
        Ok(n)
      })
      .await?;

    if updated == 0 {
      return Err(Error::SectionNotFound(section_id));
    }
    Ok(())
  }

  async fn delete_section(&self, section_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(section_id);

    // Lessons go with the section via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM sections WHERE section_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::SectionNotFound(section_id));
    }
    Ok(())
  }

  // ── Lessons ───────────────────────────────────────────────────────────────

  async fn create_lesson(
    &self,
    section_id: Uuid,
    fields: LessonFields,
  ) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let section_str = encode_uuid(section_id);

    let parent_exists = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM sections WHERE section_id = ?1",
            rusqlite::params![section_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          conn.execute(
            "INSERT INTO lessons (
               lesson_id, section_id, title, content,
               media_url, preview_eligible, position
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
              id_str,
              section_str,
              fields.title,
              fields.content,
              fields.media_url,
              fields.preview_eligible,
              fields.position,
            ],
          )?;
        }
        Ok(exists)
      })
      .await?;

    if !parent_exists {
      return Err(Error::SectionNotFound(section_id));
    }
    Ok(id)
  }

  async fn update_lesson(
    &self,
    lesson_id: Uuid,
    fields: LessonFields,
  ) -> Result<()> {
    let id_str = encode_uuid(lesson_id);

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE lessons SET
             title = ?2, content = ?3, media_url = ?4,
             preview_eligible = ?5, position = ?6
           WHERE lesson_id = ?1",
          rusqlite::params![
            id_str,
            fields.title,
            fields.content,
            fields.media_url,
            fields.preview_eligible,
            fields.position,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if updated == 0 {
      return Err(Error::LessonNotFound(lesson_id));
    }
    Ok(())
  }

  async fn delete_lesson(&self, lesson_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(lesson_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM lessons WHERE lesson_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::LessonNotFound(lesson_id));
    }
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_sections(&self, course_id: Uuid) -> Result<Vec<Section>> {
    let course_str = encode_uuid(course_id);

    let raws: Vec<RawSection> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT section_id, title, position
           FROM sections WHERE course_id = ?1
           ORDER BY position, section_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![course_str], |row| {
            Ok(RawSection {
              section_id: row.get(0)?,
              title:      row.get(1)?,
              position:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSection::into_section).collect()
  }

  async fn list_lessons(
    &self,
    section_id: Uuid,
  ) -> Result<Option<Vec<Lesson>>> {
    let id_str = encode_uuid(section_id);

    let (exists, raws): (bool, Vec<RawLesson>) = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM sections WHERE section_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok((false, Vec::new()));
        }

        let mut stmt = conn.prepare(
          "SELECT lesson_id, title, content, media_url,
                  preview_eligible, position
           FROM lessons WHERE section_id = ?1
           ORDER BY position, lesson_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawLesson {
              lesson_id:        row.get(0)?,
              title:            row.get(1)?,
              content:          row.get(2)?,
              media_url:        row.get(3)?,
              preview_eligible: row.get(4)?,
              position:         row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((true, rows))
      })
      .await?;

    if !exists {
      return Ok(None);
    }
    raws
      .into_iter()
      .map(RawLesson::into_lesson)
      .collect::<Result<Vec<_>>>()
      .map(Some)
  }
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  type Error = Error;

  async fn get_progress(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<ProgressRecord> {
    let learner_str = encode_uuid(learner_id);
    let course_str = encode_uuid(course_id);

    let (raws, cursor): (Vec<RawCompletion>, Option<String>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT lesson_id, completed_at
           FROM lesson_completions
           WHERE learner_id = ?1 AND course_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![learner_str, course_str], |row| {
            Ok(RawCompletion {
              lesson_id:    row.get(0)?,
              completed_at: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let cursor: Option<String> = conn
          .query_row(
            "SELECT lesson_id FROM progress_cursors
             WHERE learner_id = ?1 AND course_id = ?2",
            rusqlite::params![learner_str, course_str],
            |row| row.get(0),
          )
          .optional()?;

        Ok((rows, cursor))
      })
      .await?;

    let mut record = ProgressRecord::empty(learner_id, course_id);
    for raw in raws {
      let (lesson_id, completed_at) = raw.into_pair()?;
      record.completed.insert(lesson_id, completed_at);
    }
    record.last_accessed = cursor
      .as_deref()
      .map(crate::encode::decode_uuid)
      .transpose()?;

    Ok(record)
  }

  async fn record_lesson_complete(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    lesson_id: Uuid,
  ) -> Result<ProgressRecord> {
    let learner_str = encode_uuid(learner_id);
    let course_str = encode_uuid(course_id);
    let lesson_str = encode_uuid(lesson_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        // OR IGNORE keeps the original completion timestamp.
        conn.execute(
          "INSERT OR IGNORE INTO lesson_completions
             (learner_id, course_id, lesson_id, completed_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![learner_str, course_str, lesson_str, at_str],
        )?;
        conn.execute(
          "INSERT INTO progress_cursors (learner_id, course_id, lesson_id)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (learner_id, course_id)
           DO UPDATE SET lesson_id = excluded.lesson_id",
          rusqlite::params![learner_str, course_str, lesson_str],
        )?;
        Ok(())
      })
      .await?;

    self.get_progress(learner_id, course_id).await
  }
}
