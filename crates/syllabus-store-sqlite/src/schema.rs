//! SQL schema for the Syllabus SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sections (
    section_id TEXT PRIMARY KEY,
    course_id  TEXT NOT NULL,
    title      TEXT NOT NULL,
    position   INTEGER NOT NULL   -- ordinal among siblings; renumbered on save
);

-- Deleting a section takes its lessons with it: child removal is the
-- store's responsibility, never issued lesson-by-lesson by callers.
CREATE TABLE IF NOT EXISTS lessons (
    lesson_id        TEXT PRIMARY KEY,
    section_id       TEXT NOT NULL REFERENCES sections(section_id) ON DELETE CASCADE,
    title            TEXT NOT NULL,
    content          TEXT NOT NULL DEFAULT '',  -- opaque HTML payload
    media_url        TEXT,
    preview_eligible INTEGER NOT NULL DEFAULT 0,
    position         INTEGER NOT NULL
);

-- One row per completed lesson. The UNIQUE constraint makes completion
-- writes idempotent: re-completing keeps the original timestamp.
CREATE TABLE IF NOT EXISTS lesson_completions (
    learner_id   TEXT NOT NULL,
    course_id    TEXT NOT NULL,
    lesson_id    TEXT NOT NULL,
    completed_at TEXT NOT NULL,   -- ISO 8601 UTC
    UNIQUE (learner_id, course_id, lesson_id)
);

-- The lesson a learner most recently completed.
CREATE TABLE IF NOT EXISTS progress_cursors (
    learner_id TEXT NOT NULL,
    course_id  TEXT NOT NULL,
    lesson_id  TEXT NOT NULL,
    PRIMARY KEY (learner_id, course_id)
);

CREATE INDEX IF NOT EXISTS sections_course_idx     ON sections(course_id);
CREATE INDEX IF NOT EXISTS lessons_section_idx     ON lessons(section_id);
CREATE INDEX IF NOT EXISTS completions_learner_idx ON lesson_completions(learner_id, course_id);

PRAGMA user_version = 1;
";
