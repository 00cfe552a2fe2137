use rackguard_snapshot::SnapshotError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetBoxError>;

#[derive(Error, Debug)]
pub enum NetBoxError {
    #[error("NetBox client not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Site not found: {0}")]
    SiteNotFound(String),
}

impl From<NetBoxError> for SnapshotError {
    fn from(err: NetBoxError) -> Self {
        match err {
            NetBoxError::SiteNotFound(site) => SnapshotError::FacilityNotFound(site),
            NetBoxError::Http(err) if err.is_decode() => SnapshotError::invalid_data(err.to_string()),
            other => SnapshotError::transport(other.to_string()),
        }
    }
}
