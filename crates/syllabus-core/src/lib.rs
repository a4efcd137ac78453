//! Core types and trait definitions for the Syllabus curriculum engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod outline;
pub mod progress;
pub mod store;

pub use error::{Error, Result};
