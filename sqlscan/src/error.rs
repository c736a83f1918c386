//! Error types for sqlscan

use thiserror::Error;

/// Result type alias for sqlscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error surfaced by a database handle.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while mapping records to and from SQL
#[derive(Error, Debug)]
pub enum Error {
    /// A single-row lookup matched no rows
    #[error("no rows in result set")]
    NotFound,

    /// The record type or value does not have the shape the engine requires
    #[error("mapping error: {0}")]
    Mapping(String),

    /// A caller precondition was violated
    #[error("validation error: {0}")]
    Validation(String),

    /// A column value could not be converted to the destination type
    #[error("decode error: expected {expected}, got {actual}")]
    Decode {
        expected: &'static str,
        actual: String,
    },

    /// Failure reported by the underlying database handle
    #[error("driver error: {0}")]
    Driver(#[source] DriverError),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// An error annotated with the operation that produced it
    #[error("{operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

/// Classification of an [`Error`], independent of any operation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Mapping,
    Validation,
    Decode,
    Driver,
    Config,
}

impl Error {
    /// Wrap any handle failure as a driver error.
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Error::Driver(err.into())
    }

    /// Label this error with the operation that was running.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Error::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all operation labels peeled off.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Classify this error, looking through operation labels.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound => ErrorKind::NotFound,
            Error::Mapping(_) => ErrorKind::Mapping,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Driver(_) => ErrorKind::Driver,
            Error::Config(_) => ErrorKind::Config,
            Error::Context { source, .. } => source.kind(),
        }
    }

    /// True if a single-row lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<mysql_async::Error> for Error {
    fn from(err: mysql_async::Error) -> Self {
        Error::Driver(Box::new(err))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Extension for labelling the error side of a `Result`.
pub(crate) trait ResultExt<T> {
    fn context(self, operation: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: &str) -> Result<T> {
        self.map_err(|e| e.context(operation))
    }
}
