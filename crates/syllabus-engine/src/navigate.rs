//! The curriculum navigator: lazily-loaded lesson lists, a flattened
//! traversal order, and per-learner completion tracking for one learning
//! session.
//!
//! A navigator is a session-scoped object. It fetches the section list and
//! the learner's progress record once at start, then loads each section's
//! lessons on first request into an explicit per-instance cache, so
//! concurrent sessions never share state.

use std::{collections::HashMap, sync::Arc};

use syllabus_core::{
  outline::{Lesson, Section},
  progress::ProgressRecord,
  store::{CourseStore, ProgressStore},
};
use uuid::Uuid;

use crate::error::{LoadError, ProgressWriteError};

/// The result of asking for the lesson after the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
  Next(Lesson),
  /// The current lesson is the last lesson of the last section.
  EndOfCourse,
}

pub struct Navigator<C, P> {
  course_store:   Arc<C>,
  progress_store: Arc<P>,
  course_id:      Uuid,
  learner_id:     Uuid,
  /// Sections in outline order, without lessons; fetched once at start.
  sections:       Vec<Section>,
  /// Section id → loaded lesson list. Populated on demand; never persisted.
  cache:          HashMap<Uuid, Vec<Lesson>>,
  /// Fetched once at start, kept in sync after each acknowledged write.
  progress:       ProgressRecord,
}

impl<C: CourseStore, P: ProgressStore> Navigator<C, P> {
  /// Begin a learning session: fetch the section list and the learner's
  /// progress record. No lesson bodies are loaded yet.
  pub async fn start(
    course_store: Arc<C>,
    progress_store: Arc<P>,
    course_id: Uuid,
    learner_id: Uuid,
  ) -> Result<Self, LoadError> {
    let sections = course_store
      .list_sections(course_id)
      .await
      .map_err(LoadError::store)?;
    let progress = progress_store
      .get_progress(learner_id, course_id)
      .await
      .map_err(LoadError::store)?;

    Ok(Self {
      course_store,
      progress_store,
      course_id,
      learner_id,
      sections,
      cache: HashMap::new(),
      progress,
    })
  }

  pub fn course_id(&self) -> Uuid { self.course_id }

  /// Sections in outline order, as fetched at session start (lessons empty).
  pub fn sections(&self) -> &[Section] { &self.sections }

  pub fn progress(&self) -> &ProgressRecord { &self.progress }

  /// Lessons counted across the sections loaded so far. This is the
  /// denominator for [`percent_complete`](Self::percent_complete): an
  /// approximation until every section has been loaded (use
  /// [`load_all`](Self::load_all) first for the true total).
  pub fn known_lesson_total(&self) -> usize {
    self.cache.values().map(Vec::len).sum()
  }

  pub fn percent_complete(&self) -> u8 {
    self.progress.percent_complete(self.known_lesson_total())
  }

  /// Fetch a section's lessons on first request; cached afterwards for the
  /// rest of the session.
  pub async fn load_lessons(
    &mut self,
    section_id: Uuid,
  ) -> Result<&[Lesson], LoadError> {
    if !self.cache.contains_key(&section_id) {
      let lessons = match self.course_store.list_lessons(section_id).await {
        Ok(Some(lessons)) => lessons,
        Ok(None) => return Err(LoadError::SectionNotFound(section_id)),
        Err(e) => return Err(LoadError::store(e)),
      };
      self.cache.insert(section_id, lessons);
    }
    // Present by construction at this point.
    Ok(
      self
        .cache
        .get(&section_id)
        .map(Vec::as_slice)
        .unwrap_or_default(),
    )
  }

  /// Load every section's lessons. Afterwards the completion percentage is
  /// exact rather than an over-the-known-lessons approximation.
  pub async fn load_all(&mut self) -> Result<(), LoadError> {
    for section_id in self.section_ids() {
      self.load_lessons(section_id).await?;
    }
    Ok(())
  }

  /// Locate the lesson a learner should see: the given lesson if an id is
  /// supplied (searching sections one at a time, in outline order), or the
  /// first lesson of the first non-empty section.
  pub async fn resolve_current_lesson(
    &mut self,
    lesson_id: Option<Uuid>,
  ) -> Result<Lesson, LoadError> {
    let section_ids = self.section_ids();
    match lesson_id {
      Some(wanted) => {
        for section_id in section_ids {
          let lessons = self.load_lessons(section_id).await?;
          if let Some(lesson) =
            lessons.iter().find(|l| l.id.persisted() == Some(wanted))
          {
            return Ok(lesson.clone());
          }
        }
        Err(LoadError::LessonNotInCourse(wanted))
      }
      None => {
        for section_id in section_ids {
          let lessons = self.load_lessons(section_id).await?;
          if let Some(first) = lessons.first() {
            return Ok(first.clone());
          }
        }
        Err(LoadError::CourseEmpty(self.course_id))
      }
    }
  }

  /// Record a lesson as complete.
  ///
  /// Idempotent: a lesson that is already complete is a no-op that still
  /// reports success, without touching the store. Local state is updated
  /// only after the store acknowledges the write, so a failure never leaves
  /// the session claiming a completion the store does not have.
  pub async fn mark_complete(
    &mut self,
    lesson_id: Uuid,
  ) -> Result<&ProgressRecord, ProgressWriteError> {
    if self.progress.is_complete(lesson_id) {
      return Ok(&self.progress);
    }
    let updated = self
      .progress_store
      .record_lesson_complete(self.learner_id, self.course_id, lesson_id)
      .await
      .map_err(ProgressWriteError::store)?;
    self.progress = updated;
    Ok(&self.progress)
  }

  /// The lesson immediately following `current` in the flattened traversal
  /// order (sections in outline order, lessons in outline order within
  /// each). Sections not yet cached are loaded as the traversal reaches
  /// them.
  pub async fn advance(
    &mut self,
    current: Uuid,
  ) -> Result<Advance, LoadError> {
    let section_ids = self.section_ids();

    let mut current_section: Option<usize> = None;
    for (index, section_id) in section_ids.iter().enumerate() {
      let lessons = self.load_lessons(*section_id).await?;
      if let Some(at) =
        lessons.iter().position(|l| l.id.persisted() == Some(current))
      {
        if let Some(next) = lessons.get(at + 1) {
          return Ok(Advance::Next(next.clone()));
        }
        current_section = Some(index);
        break;
      }
    }

    let Some(index) = current_section else {
      return Err(LoadError::LessonNotInCourse(current));
    };

    // Last lesson of its section: the next lesson is the first lesson of
    // the next non-empty section.
    for section_id in &section_ids[index + 1..] {
      let lessons = self.load_lessons(*section_id).await?;
      if let Some(first) = lessons.first() {
        return Ok(Advance::Next(first.clone()));
      }
    }
    Ok(Advance::EndOfCourse)
  }

  fn section_ids(&self) -> Vec<Uuid> {
    self.sections.iter().filter_map(|s| s.id.persisted()).collect()
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memstore::{Call, MemoryStore};

  struct Fixture {
    store:      Arc<MemoryStore>,
    course_id:  Uuid,
    learner_id: Uuid,
    sections:   Vec<Uuid>,
    lessons:    Vec<Vec<Uuid>>,
  }

  /// Seed a course whose shape is given as lessons-per-section counts.
  fn seed(shape: &[usize]) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let course_id = Uuid::new_v4();
    let mut sections = Vec::new();
    let mut lessons = Vec::new();
    for (i, &count) in shape.iter().enumerate() {
      let section_id =
        store.seed_section(course_id, &format!("Section {i}"), i as u32);
      let mut ids = Vec::new();
      for j in 0..count {
        ids.push(store.seed_lesson(
          section_id,
          &format!("Lesson {i}.{j}"),
          j as u32,
        ));
      }
      sections.push(section_id);
      lessons.push(ids);
    }
    Fixture {
      store,
      course_id,
      learner_id: Uuid::new_v4(),
      sections,
      lessons,
    }
  }

  async fn navigator(
    fx: &Fixture,
  ) -> Navigator<MemoryStore, MemoryStore> {
    Navigator::start(
      fx.store.clone(),
      fx.store.clone(),
      fx.course_id,
      fx.learner_id,
    )
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn lessons_are_fetched_once_per_section() {
    let fx = seed(&[2]);
    let mut nav = navigator(&fx).await;

    nav.load_lessons(fx.sections[0]).await.unwrap();
    nav.load_lessons(fx.sections[0]).await.unwrap();

    let list_calls = fx
      .store
      .calls()
      .iter()
      .filter(|c| matches!(c, Call::ListLessons { .. }))
      .count();
    assert_eq!(list_calls, 1);
  }

  #[tokio::test]
  async fn loading_a_deleted_section_fails() {
    let fx = seed(&[1]);
    let mut nav = navigator(&fx).await;

    let gone = Uuid::new_v4();
    let err = nav.load_lessons(gone).await.unwrap_err();
    assert!(matches!(err, LoadError::SectionNotFound(id) if id == gone));
  }

  #[tokio::test]
  async fn resolve_by_id_searches_sections_in_order() {
    let fx = seed(&[2, 2]);
    let mut nav = navigator(&fx).await;

    let wanted = fx.lessons[1][0];
    let lesson = nav.resolve_current_lesson(Some(wanted)).await.unwrap();
    assert_eq!(lesson.id.persisted(), Some(wanted));

    // Both sections had to be loaded, first section first.
    let listed: Vec<Uuid> = fx
      .store
      .calls()
      .iter()
      .filter_map(|c| match c {
        Call::ListLessons { section_id } => Some(*section_id),
        _ => None,
      })
      .collect();
    assert_eq!(listed, fx.sections);
  }

  #[tokio::test]
  async fn resolve_unknown_lesson_is_an_error() {
    let fx = seed(&[2, 2]);
    let mut nav = navigator(&fx).await;

    let missing = Uuid::new_v4();
    let err = nav.resolve_current_lesson(Some(missing)).await.unwrap_err();
    assert!(matches!(err, LoadError::LessonNotInCourse(id) if id == missing));
  }

  #[tokio::test]
  async fn resolve_without_id_skips_empty_sections() {
    let fx = seed(&[0, 2]);
    let mut nav = navigator(&fx).await;

    let lesson = nav.resolve_current_lesson(None).await.unwrap();
    assert_eq!(lesson.id.persisted(), Some(fx.lessons[1][0]));
  }

  #[tokio::test]
  async fn resolve_without_id_on_lessonless_course_is_an_error() {
    let fx = seed(&[0, 0]);
    let mut nav = navigator(&fx).await;

    let err = nav.resolve_current_lesson(None).await.unwrap_err();
    assert!(matches!(err, LoadError::CourseEmpty(id) if id == fx.course_id));
  }

  #[tokio::test]
  async fn mark_complete_is_idempotent() {
    let fx = seed(&[2]);
    let mut nav = navigator(&fx).await;
    let lesson = fx.lessons[0][0];

    nav.mark_complete(lesson).await.unwrap();
    let after_first: Vec<Uuid> =
      nav.progress().completed.keys().copied().collect();

    nav.mark_complete(lesson).await.unwrap();
    let after_second: Vec<Uuid> =
      nav.progress().completed.keys().copied().collect();

    assert_eq!(after_first, after_second);
    // The second call never reached the store.
    let write_calls = fx
      .store
      .calls()
      .iter()
      .filter(|c| matches!(c, Call::RecordComplete { .. }))
      .count();
    assert_eq!(write_calls, 1);
    assert_eq!(nav.progress().last_accessed, Some(lesson));
  }

  #[tokio::test]
  async fn failed_completion_write_leaves_local_state_untouched() {
    let fx = seed(&[2]);
    let mut nav = navigator(&fx).await;
    let lesson = fx.lessons[0][0];

    fx.store.fail_on("record-complete");
    let err = nav.mark_complete(lesson).await.unwrap_err();
    assert!(matches!(err, ProgressWriteError::Store(_)));
    assert!(!nav.progress().is_complete(lesson));
    assert_eq!(nav.progress().completed_count(), 0);
  }

  #[tokio::test]
  async fn percentage_counts_only_loaded_sections() {
    // Two sections of two lessons each; only section 1 loaded. Completing
    // one lesson reads as 50% (1 of 2 known lessons), not 25%.
    let fx = seed(&[2, 2]);
    let mut nav = navigator(&fx).await;

    nav.load_lessons(fx.sections[0]).await.unwrap();
    nav.mark_complete(fx.lessons[0][0]).await.unwrap();
    assert_eq!(nav.percent_complete(), 50);

    // Loading the rest corrects the denominator.
    nav.load_all().await.unwrap();
    assert_eq!(nav.percent_complete(), 25);
  }

  #[tokio::test]
  async fn advance_walks_the_full_traversal_order() {
    let fx = seed(&[2, 1, 3]);
    let mut nav = navigator(&fx).await;
    let flat: Vec<Uuid> =
      fx.lessons.iter().flatten().copied().collect();

    // N lessons: N-1 forward steps, then the end-of-course signal.
    let mut current = flat[0];
    for expected in &flat[1..] {
      match nav.advance(current).await.unwrap() {
        Advance::Next(lesson) => {
          assert_eq!(lesson.id.persisted(), Some(*expected));
          current = *expected;
        }
        Advance::EndOfCourse => panic!("ended early at {current}"),
      }
    }
    assert_eq!(nav.advance(current).await.unwrap(), Advance::EndOfCourse);
  }

  #[tokio::test]
  async fn advance_loads_the_next_section_on_demand() {
    let fx = seed(&[1, 1]);
    let mut nav = navigator(&fx).await;

    let next = nav.advance(fx.lessons[0][0]).await.unwrap();
    assert_eq!(
      next,
      Advance::Next(
        nav.load_lessons(fx.sections[1]).await.unwrap()[0].clone()
      )
    );
  }

  #[tokio::test]
  async fn advance_from_unknown_lesson_is_an_error() {
    let fx = seed(&[1]);
    let mut nav = navigator(&fx).await;

    let missing = Uuid::new_v4();
    let err = nav.advance(missing).await.unwrap_err();
    assert!(matches!(err, LoadError::LessonNotInCourse(id) if id == missing));
  }

  #[tokio::test]
  async fn advance_skips_an_empty_middle_section() {
    let fx = seed(&[1, 0, 1]);
    let mut nav = navigator(&fx).await;

    match nav.advance(fx.lessons[0][0]).await.unwrap() {
      Advance::Next(lesson) => {
        assert_eq!(lesson.id.persisted(), Some(fx.lessons[2][0]));
      }
      Advance::EndOfCourse => panic!("expected a next lesson"),
    }
  }
}
