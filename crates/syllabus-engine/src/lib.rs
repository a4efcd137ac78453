//! The Syllabus curriculum engine.
//!
//! Two cooperating components over the store traits in `syllabus-core`:
//!
//! - [`reconcile`](reconcile::reconcile) turns an instructor's edited
//!   working copy of a course outline into the minimal ordered sequence of
//!   store calls that makes persisted state match it.
//! - [`Navigator`](navigate::Navigator) flattens the lazily-loaded outline
//!   into a traversal order for a learner, tracks completion state, and
//!   resolves next-lesson navigation.
//!
//! Both operate on behalf of a single logical actor and perform no internal
//! retries: store failures surface to the caller as typed errors.

pub mod error;
pub mod navigate;
pub mod outline;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod memstore;

pub use error::{Entity, LoadError, OpKind, ProgressWriteError, ReconcileError};
pub use navigate::{Advance, Navigator};
pub use outline::fetch_outline;
pub use reconcile::{ReconcileOp, ReconcileReport, reconcile};
