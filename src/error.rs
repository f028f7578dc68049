//! Error types.
//!
//! Internally the crate uses `anyhow` through the `Res` alias. At the public boundary (library
//! functions and command handlers) errors are converted into `Error`, which carries an `ErrorType`
//! so that callers can distinguish, for example, a missing income source from a database failure.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Result type used inside the crate.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// Result type returned from public functions.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a public error.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A referenced record does not exist (or is inactive where an active record is required).
    NotFound,
    /// The store rejected a write because of a CHECK, UNIQUE or FOREIGN KEY constraint.
    Constraint,
    /// An invariant of the calculation was violated, e.g. an unknown deduction kind was read.
    Logic,
    /// Any other failure while talking to SQLite.
    Database,
    /// The home directory or its configuration file is missing or invalid.
    Config,
    /// Filesystem failures outside of the database.
    Io,
    /// A value supplied by the user could not be interpreted.
    Input,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It wraps an `anyhow::Error` together with its `ErrorType`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// The category of this error.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Returns true if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        self.error_type == ErrorType::NotFound
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

// `Display` already prints the whole chain, so no `source` is reported.
impl std::error::Error for Error {}

/// The root error for failures that the crate detects itself, tagged with their `ErrorType`.
#[derive(Debug, Clone)]
struct TaggedError {
    error_type: ErrorType,
    message: String,
}

impl Display for TaggedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TaggedError {}

/// Creates an `anyhow::Error` tagged with `ErrorType::NotFound`.
pub(crate) fn not_found(message: impl Display) -> anyhow::Error {
    tagged(ErrorType::NotFound, message)
}

/// Creates an `anyhow::Error` tagged with `ErrorType::Logic`.
pub(crate) fn logic(message: impl Display) -> anyhow::Error {
    tagged(ErrorType::Logic, message)
}

/// Creates an `anyhow::Error` tagged with `ErrorType::Input`.
pub(crate) fn input(message: impl Display) -> anyhow::Error {
    tagged(ErrorType::Input, message)
}

fn tagged(error_type: ErrorType, message: impl Display) -> anyhow::Error {
    anyhow::Error::new(TaggedError {
        error_type,
        message: message.to_string(),
    })
}

/// Finds the most specific `ErrorType` in the chain of `e`, if any.
fn find_tag(e: &anyhow::Error) -> Option<ErrorType> {
    if let Some(tagged) = e.downcast_ref::<TaggedError>() {
        return Some(tagged.error_type);
    }
    if let Some(public) = e.downcast_ref::<Error>() {
        return Some(public.error_type);
    }
    e.chain()
        .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .and_then(classify_sqlx)
}

/// Constraint failures reported by SQLite are classified as `ErrorType::Constraint`.
fn classify_sqlx(e: &sqlx::Error) -> Option<ErrorType> {
    match e {
        sqlx::Error::RowNotFound => Some(ErrorType::NotFound),
        sqlx::Error::Database(db) => {
            let constraint = db.is_unique_violation()
                || db.is_foreign_key_violation()
                || db.is_check_violation()
                || db.message().contains("constraint failed");
            constraint.then_some(ErrorType::Constraint)
        }
        _ => None,
    }
}

/// Converts an internal `Res<T>` into a public `Result<T>`.
pub(crate) trait IntoResult<T> {
    /// Converts the error using `error_type` unless a more specific type was already attached.
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let found = find_tag(&e).unwrap_or(error_type);
            Error::new(found, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_uses_given_type() {
        let res: Res<()> = Err(anyhow::anyhow!("disk on fire"));
        let err = res.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_pub_result_keeps_inner_tag() {
        let res: Res<()> = Err(not_found("Income source 7 not found"));
        let res = res.context("Unable to generate pay periods");
        let err = res.pub_result(ErrorType::Database).unwrap_err();
        assert!(err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("Unable to generate pay periods"));
        assert!(message.contains("Income source 7 not found"));
    }

    #[test]
    fn test_logic_tag() {
        let res: Res<()> = Err(logic("bad kind"));
        let err = res.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Logic);
    }

    #[test]
    fn test_public_error_round_trips_through_anyhow() {
        let err = Error::new(ErrorType::NotFound, anyhow::anyhow!("nope"));
        let any = anyhow::Error::new(err).context("while loading");
        let res: Res<()> = Err(any);
        let err = res.pub_result(ErrorType::Config).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
        assert_eq!(ErrorType::Constraint.to_string(), "constraint");
    }
}
