//! SQLite backend for the Syllabus curriculum engine.
//!
//! Implements both [`syllabus_core::store::CourseStore`] and
//! [`syllabus_core::store::ProgressStore`] over a single database file.

mod encode;
pub mod error;
mod schema;
mod store;


pub use error::{Error, Result};
pub use store::SqliteStore;
