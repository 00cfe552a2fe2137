use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Network, TLS or authentication failure while fetching.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Facility not found: {0}")]
    FacilityNotFound(String),

    /// The source answered, but with data that cannot be turned into a snapshot.
    #[error("Invalid snapshot data: {0}")]
    InvalidData(String),
}

impl SnapshotError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Transport failures may succeed on a later attempt; the others will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
