//! Error types for the `sse` crate.
//!
//! Follows the layered pattern used across the workspace: a root `Error`
//! holding an error kind and an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of failure a refresh tick can run into. None of them are fatal.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The value could not be turned into its wire representation.
    Serialization,
    /// The value source failed to produce a value.
    Generation(String),
    /// The value source has nothing more to produce.
    Exhausted,
}

impl Error {
    pub fn generation(reason: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Generation(reason.into()),
        }
    }

    pub fn exhausted() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Exhausted,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Serialization => write!(f, "value serialization failed")?,
            ErrorKind::Generation(reason) => write!(f, "value generation failed: {reason}")?,
            ErrorKind::Exhausted => write!(f, "value source exhausted")?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}
