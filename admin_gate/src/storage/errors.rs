use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// The backend could not be reached.
    #[error("Session backend unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but rejected the command.
    #[error("Session backend command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_timeout() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Command(err.to_string())
        }
    }
}
