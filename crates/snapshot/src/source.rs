use crate::error::{Result, SnapshotError};
use crate::types::Orientation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a fetch collaborator returns for one facility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityData {
    pub facility: String,

    #[serde(default)]
    pub racks: Vec<RackRecord>,

    #[serde(default)]
    pub occupants: Vec<OccupantRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackRecord {
    pub name: String,
    pub usable_positions: u32,
    #[serde(default = "default_starting_position")]
    pub starting_position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantRecord {
    pub rack_name: String,
    pub position_start: i64,
    pub height: u32,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_starting_position() -> i64 {
    1
}

/// Read-only provider of facility data.
///
/// A fetch is one logical, idempotent read. Retries and authentication
/// belong to the implementation.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, facility: &str) -> Result<FacilityData>;
}

/// Facility data stored as a JSON document on disk.
///
/// An empty facility argument accepts whatever facility the file holds.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn fetch(&self, facility: &str) -> Result<FacilityData> {
        log::debug!("Reading facility data from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            SnapshotError::transport(format!("read {}: {err}", self.path.display()))
        })?;
        let data: FacilityData = serde_json::from_slice(&bytes).map_err(|err| {
            SnapshotError::invalid_data(format!("parse {}: {err}", self.path.display()))
        })?;

        let wanted = facility.trim();
        if !wanted.is_empty() && !data.facility.eq_ignore_ascii_case(wanted) {
            return Err(SnapshotError::FacilityNotFound(wanted.to_string()));
        }

        Ok(data)
    }
}
