/// Failure talking to a persistence collaborator.
///
/// The three variants are what callers act on: the store could not be
/// reached, it refused a write, or what it holds could not be read (a locked
/// or corrupt workbook, or table rows that do not decode).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot reach the partner store: {0}")]
    Connection(String),

    #[error("Failed to write partner records: {0}")]
    Write(String),

    #[error("Stored partner data is unreadable: {0}")]
    Parse(String),
}

impl StoreError {
    /// Classify an error raised while reading. Rows the server returned
    /// but that do not match the expected schema are a parse failure.
    pub fn from_read(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            Self::Connection(err.to_string())
        } else {
            Self::Parse(err.to_string())
        }
    }

    /// Classify an error raised while writing. Losing the connection is still
    /// a connection failure; anything the server rejected is a write failure.
    pub fn from_write(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            Self::Connection(err.to_string())
        } else {
            Self::Write(err.to_string())
        }
    }
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_)
    )
}
