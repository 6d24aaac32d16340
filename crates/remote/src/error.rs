use thiserror::Error;

/// Errors surfaced by remote adapters.
///
/// These are failure values, not request failures: the replication pipeline
/// logs them and moves on. They never propagate to a save caller and never
/// roll back a local commit.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Payload too large: {0} bytes exceeds ceiling of {1}")]
    Payload(usize, usize),

    #[error("Remote call timed out after {0} seconds")]
    Timeout(u64),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout(crate::config::REMOTE_TIMEOUT_SECS)
        } else {
            RemoteError::Http(e.to_string())
        }
    }
}
