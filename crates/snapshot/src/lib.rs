//! # Rackguard Snapshot
//!
//! Point-in-time, read-only view of an inventory's racks and the devices
//! mounted in them.
//!
//! ## Architecture
//!
//! ```text
//! SnapshotSource (NetBox, JSON file, ...)
//!     │  fetch(facility)
//!     ▼
//! FacilityData ──> SnapshotBuilder
//!                    ├─ index racks by name (case-insensitive)
//!                    ├─ order occupants by start position
//!                    └─ record consistency issues
//!     │
//!     ▼
//! SnapshotCache
//!     └─ RwLock<Arc<Snapshot>>: swapped only after a successful build
//! ```
//!
//! A failed refresh leaves the previous snapshot active; any `Arc<Snapshot>`
//! handed out stays valid and unchanged for as long as its holder keeps it.
//!
//! ## Example
//!
//! ```no_run
//! use rackguard_snapshot::{FileSource, SnapshotCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = SnapshotCache::new(Arc::new(FileSource::new("dc1.json")));
//!     cache.refresh("dc1").await?;
//!
//!     let snapshot = cache.active();
//!     println!("{} racks", snapshot.rack_count());
//!     Ok(())
//! }
//! ```

mod cache;
mod error;
mod snapshot;
mod source;
mod types;

pub use cache::SnapshotCache;
pub use error::{Result, SnapshotError};
pub use snapshot::{name_key, Snapshot, SnapshotBuilder};
pub use source::{FacilityData, FileSource, OccupantRecord, RackRecord, SnapshotSource};
pub use types::{ConsistencyIssue, Occupant, Orientation, PositionRange, Rack};
