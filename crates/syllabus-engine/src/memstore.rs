//! A scripted in-memory store for engine tests.
//!
//! Records every call in issue order (so tests can assert on operation
//! sequences) and can be told to fail the next call of a given kind.

use std::{collections::BTreeMap, sync::Mutex};

use chrono::{DateTime, TimeZone, Utc};
use syllabus_core::{
  outline::{Lesson, LessonFields, NodeId, Section, SectionFields},
  progress::ProgressRecord,
  store::{CourseStore, ProgressStore},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("scripted failure: {0}")]
pub struct MemoryStoreError(pub &'static str);

/// One call made against the store, with the arguments tests care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  CreateSection { course_id: Uuid, title: String },
  UpdateSection { section_id: Uuid, title: String, position: u32 },
  DeleteSection { section_id: Uuid },
  CreateLesson { section_id: Uuid, title: String },
  UpdateLesson { lesson_id: Uuid, title: String, position: u32 },
  DeleteLesson { lesson_id: Uuid },
  ListSections { course_id: Uuid },
  ListLessons { section_id: Uuid },
  GetProgress,
  RecordComplete { lesson_id: Uuid },
}

impl Call {
  pub fn name(&self) -> &'static str {
    match self {
      Self::CreateSection { .. } => "create-section",
      Self::UpdateSection { .. } => "update-section",
      Self::DeleteSection { .. } => "delete-section",
      Self::CreateLesson { .. } => "create-lesson",
      Self::UpdateLesson { .. } => "update-lesson",
      Self::DeleteLesson { .. } => "delete-lesson",
      Self::ListSections { .. } => "list-sections",
      Self::ListLessons { .. } => "list-lessons",
      Self::GetProgress => "get-progress",
      Self::RecordComplete { .. } => "record-complete",
    }
  }

  pub fn is_write(&self) -> bool {
    !matches!(
      self,
      Self::ListSections { .. } | Self::ListLessons { .. } | Self::GetProgress
    )
  }
}

struct StoredSection {
  id:        Uuid,
  course_id: Uuid,
  fields:    SectionFields,
}

struct StoredLesson {
  id:         Uuid,
  section_id: Uuid,
  fields:     LessonFields,
}

#[derive(Default)]
struct Inner {
  sections:  Vec<StoredSection>,
  lessons:   Vec<StoredLesson>,
  completed: BTreeMap<(Uuid, Uuid), BTreeMap<Uuid, DateTime<Utc>>>,
  cursors:   BTreeMap<(Uuid, Uuid), Uuid>,
  clock:     i64,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:   Mutex<Inner>,
  calls:   Mutex<Vec<Call>>,
  fail_on: Mutex<Option<&'static str>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Fail the next call whose kind matches `name` (e.g. `"create-lesson"`).
  pub fn fail_on(&self, name: &'static str) {
    *self.fail_on.lock().unwrap() = Some(name);
  }

  pub fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  /// The write calls made so far, in issue order.
  pub fn writes(&self) -> Vec<Call> {
    self.calls().into_iter().filter(Call::is_write).collect()
  }

  pub fn seed_section(
    &self,
    course_id: Uuid,
    title: &str,
    position: u32,
  ) -> Uuid {
    let id = Uuid::new_v4();
    self.inner.lock().unwrap().sections.push(StoredSection {
      id,
      course_id,
      fields: SectionFields { title: title.to_string(), position },
    });
    id
  }

  pub fn seed_lesson(
    &self,
    section_id: Uuid,
    title: &str,
    position: u32,
  ) -> Uuid {
    let id = Uuid::new_v4();
    self.inner.lock().unwrap().lessons.push(StoredLesson {
      id,
      section_id,
      fields: LessonFields {
        title: title.to_string(),
        content: String::new(),
        media_url: None,
        preview_eligible: false,
        position,
      },
    });
    id
  }

  pub fn section_count(&self) -> usize {
    self.inner.lock().unwrap().sections.len()
  }

  pub fn lesson_count(&self) -> usize {
    self.inner.lock().unwrap().lessons.len()
  }

  pub fn lesson_parent(&self, lesson_id: Uuid) -> Option<Uuid> {
    self
      .inner
      .lock()
      .unwrap()
      .lessons
      .iter()
      .find(|l| l.id == lesson_id)
      .map(|l| l.section_id)
  }

  fn record(&self, call: Call) -> Result<(), MemoryStoreError> {
    let name = call.name();
    self.calls.lock().unwrap().push(call);
    let mut fail = self.fail_on.lock().unwrap();
    if *fail == Some(name) {
      *fail = None;
      return Err(MemoryStoreError(name));
    }
    Ok(())
  }

  fn snapshot(&self, learner_id: Uuid, course_id: Uuid) -> ProgressRecord {
    let inner = self.inner.lock().unwrap();
    ProgressRecord {
      learner_id,
      course_id,
      completed: inner
        .completed
        .get(&(learner_id, course_id))
        .cloned()
        .unwrap_or_default(),
      last_accessed: inner.cursors.get(&(learner_id, course_id)).copied(),
    }
  }
}

// ─── CourseStore ─────────────────────────────────────────────────────────────

impl CourseStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn create_section(
    &self,
    course_id: Uuid,
    fields: SectionFields,
  ) -> Result<Uuid, MemoryStoreError> {
    self.record(Call::CreateSection { course_id, title: fields.title.clone() })?;
    let id = Uuid::new_v4();
    self
      .inner
      .lock()
      .unwrap()
      .sections
      .push(StoredSection { id, course_id, fields });
    Ok(id)
  }

  async fn update_section(
    &self,
    section_id: Uuid,
    fields: SectionFields,
  ) -> Result<(), MemoryStoreError> {
    self.record(Call::UpdateSection {
      section_id,
      title: fields.title.clone(),
      position: fields.position,
    })?;
    let mut inner = self.inner.lock().unwrap();
    if let Some(section) =
      inner.sections.iter_mut().find(|s| s.id == section_id)
    {
      section.fields = fields;
    }
    Ok(())
  }

  async fn delete_section(
    &self,
    section_id: Uuid,
  ) -> Result<(), MemoryStoreError> {
    self.record(Call::DeleteSection { section_id })?;
    let mut inner = self.inner.lock().unwrap();
    inner.sections.retain(|s| s.id != section_id);
    // Child removal is delegated to the store.
    inner.lessons.retain(|l| l.section_id != section_id);
    Ok(())
  }

  async fn create_lesson(
    &self,
    section_id: Uuid,
    fields: LessonFields,
  ) -> Result<Uuid, MemoryStoreError> {
    self.record(Call::CreateLesson { section_id, title: fields.title.clone() })?;
    let id = Uuid::new_v4();
    self
      .inner
      .lock()
      .unwrap()
      .lessons
      .push(StoredLesson { id, section_id, fields });
    Ok(id)
  }

  async fn update_lesson(
    &self,
    lesson_id: Uuid,
    fields: LessonFields,
  ) -> Result<(), MemoryStoreError> {
    self.record(Call::UpdateLesson {
      lesson_id,
      title: fields.title.clone(),
      position: fields.position,
    })?;
    let mut inner = self.inner.lock().unwrap();
    if let Some(lesson) = inner.lessons.iter_mut().find(|l| l.id == lesson_id)
    {
      lesson.fields = fields;
    }
    Ok(())
  }

  async fn delete_lesson(
    &self,
    lesson_id: Uuid,
  ) -> Result<(), MemoryStoreError> {
    self.record(Call::DeleteLesson { lesson_id })?;
    self
      .inner
      .lock()
      .unwrap()
      .lessons
      .retain(|l| l.id != lesson_id);
    Ok(())
  }

  async fn list_sections(
    &self,
    course_id: Uuid,
  ) -> Result<Vec<Section>, MemoryStoreError> {
    self.record(Call::ListSections { course_id })?;
    let inner = self.inner.lock().unwrap();
    let mut sections: Vec<Section> = inner
      .sections
      .iter()
      .filter(|s| s.course_id == course_id)
      .map(|s| Section {
        id:       NodeId::Persisted(s.id),
        title:    s.fields.title.clone(),
        position: s.fields.position,
        lessons:  Vec::new(),
      })
      .collect();
    sections.sort_by_key(|s| s.position);
    Ok(sections)
  }

  async fn list_lessons(
    &self,
    section_id: Uuid,
  ) -> Result<Option<Vec<Lesson>>, MemoryStoreError> {
    self.record(Call::ListLessons { section_id })?;
    let inner = self.inner.lock().unwrap();
    if !inner.sections.iter().any(|s| s.id == section_id) {
      return Ok(None);
    }
    let mut lessons: Vec<Lesson> = inner
      .lessons
      .iter()
      .filter(|l| l.section_id == section_id)
      .map(|l| Lesson {
        id:               NodeId::Persisted(l.id),
        title:            l.fields.title.clone(),
        content:          l.fields.content.clone(),
        media_url:        l.fields.media_url.clone(),
        preview_eligible: l.fields.preview_eligible,
        position:         l.fields.position,
      })
      .collect();
    lessons.sort_by_key(|l| l.position);
    Ok(Some(lessons))
  }
}

// ─── ProgressStore ───────────────────────────────────────────────────────────

impl ProgressStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn get_progress(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<ProgressRecord, MemoryStoreError> {
    self.record(Call::GetProgress)?;
    Ok(self.snapshot(learner_id, course_id))
  }

  async fn record_lesson_complete(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    lesson_id: Uuid,
  ) -> Result<ProgressRecord, MemoryStoreError> {
    self.record(Call::RecordComplete { lesson_id })?;
    {
      let mut inner = self.inner.lock().unwrap();
      inner.clock += 1;
      let ts = Utc.timestamp_opt(inner.clock, 0).unwrap();
      inner
        .completed
        .entry((learner_id, course_id))
        .or_default()
        .entry(lesson_id)
        .or_insert(ts);
      inner.cursors.insert((learner_id, course_id), lesson_id);
    }
    Ok(self.snapshot(learner_id, course_id))
  }
}
