use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to acquire a database connection")]
    Connection(#[source] bb8::RunError<tokio_postgres::Error>),

    #[error("Query failed")]
    Query(#[from] tokio_postgres::Error),

    #[error("Could not coerce field '{field}' from value {value:?}")]
    Shape { field: &'static str, value: String },
}

impl From<bb8::RunError<tokio_postgres::Error>> for Error {
    fn from(err: bb8::RunError<tokio_postgres::Error>) -> Self {
        Error::Connection(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Query,
    Shape,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) => ErrorKind::Connection,
            Error::Query(_) => ErrorKind::Query,
            Error::Shape { .. } => ErrorKind::Shape,
        }
    }
}

/// Serializable description of a failed operation, handed to callers next to
/// the degraded (empty) data.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        let message = match std::error::Error::source(err) {
            Some(source) => format!("{}: {}", err, source),
            None => err.to_string(),
        };
        Failure {
            kind: err.kind(),
            message,
        }
    }
}
