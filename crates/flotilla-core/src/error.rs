//! Error types shared by the flotilla crates.
//!
//! Every failure is a single [`Error`] carrying a closed [`ErrorKind`] plus
//! the subject it concerns. Callers branch on `err.kind()`.

use std::fmt;

use thiserror::Error;

/// Result type alias for flotilla operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `targetStep` is negative or past the end of the strategy.
    InvalidStepIndex,
    /// A step carries a capacity/traffic value that is not an integer in 0..=100.
    InvalidStepValue,
    /// The application has no releases at all.
    ContenderNotFound,
    MissingInstallationTarget,
    MissingCapacityTarget,
    MissingTrafficTarget,
    /// A patch names an object that is not in the catalog.
    MissingTarget,
    /// `flotilla.toml` could not be read or parsed.
    Config,
    /// A catalog snapshot could not be read or parsed.
    Snapshot,
}

impl ErrorKind {
    /// Configuration errors are fatal for the evaluation and must not be
    /// retried until the offending object is edited.
    pub fn is_configuration(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidStepIndex | ErrorKind::InvalidStepValue | ErrorKind::Config
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidStepIndex => "invalid step index",
            ErrorKind::InvalidStepValue => "invalid step value",
            ErrorKind::ContenderNotFound => "contender not found",
            ErrorKind::MissingInstallationTarget => "missing installation target",
            ErrorKind::MissingCapacityTarget => "missing capacity target",
            ErrorKind::MissingTrafficTarget => "missing traffic target",
            ErrorKind::MissingTarget => "missing target",
            ErrorKind::Config => "config error",
            ErrorKind::Snapshot => "snapshot error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure of kind `kind` concerning `subject` (usually a `namespace/name` key).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} for {subject}: {detail}")]
pub struct Error {
    kind: ErrorKind,
    subject: String,
    detail: String,
}

impl Error {
    pub fn new(kind: ErrorKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}
