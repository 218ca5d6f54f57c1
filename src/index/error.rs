//! Validation errors for index mutations.

use thiserror::Error;

/// Errors returned by index CRUD operations.
///
/// These are validation failures surfaced to the immediate caller; the
/// reconciler logs and skips, the admin layer turns `NotFound` into an
/// explicit response.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("entry id cannot be empty")]
    EmptyId,

    #[error("entry with id {id} already exists")]
    DuplicateId { id: String },

    #[error("entry with id {id} does not exist")]
    NotFound { id: String },
}
