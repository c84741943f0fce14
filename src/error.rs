//! Error types shared by the validator and the store.

use std::path::PathBuf;

use crate::validate::Field;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required form field was left blank.
    #[error("Field '{0}' is required!")]
    MissingField(Field),

    /// An age field did not parse as an integer. Carries the field label or
    /// member name so the caller can say which one.
    #[error("{0} must be a valid number!")]
    InvalidAge(String),

    /// A staged family member failed age validation while preparing a submission.
    #[error("Invalid age for {name}!")]
    MemberAgeInvalid { name: String },

    /// A staged family member failed validation while preparing a submission.
    /// `position` counts from 1 in staging order.
    #[error("Family member #{position} ({name}): {source}")]
    MemberInvalid {
        position: usize,
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// More member photos were supplied than members.
    #[error("{photos} member photo(s) supplied for {members} member(s)")]
    PhotoCountMismatch { members: usize, photos: usize },

    #[error("Address ID '{0}' already exists!")]
    DuplicateKey(String),

    #[error("No household found with Address ID '{0}'")]
    NotFound(String),

    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Background lookup failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// True for errors caused by the submitted values rather than by storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_)
                | Error::InvalidAge(_)
                | Error::MemberAgeInvalid { .. }
                | Error::MemberInvalid { .. }
                | Error::PhotoCountMismatch { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
