//! # Rackguard NetBox
//!
//! [`SnapshotSource`](rackguard_snapshot::SnapshotSource) backed by the
//! NetBox REST API. Strictly read-only.
//!
//! ```text
//! fetch(site)
//!   ├─ GET dcim/sites/{id}/  or  dcim/sites/?slug=
//!   ├─ GET dcim/racks/?site_id=    (paginated, limit=1000)
//!   └─ GET dcim/devices/?site_id=  (paginated, limit=1000)
//!        └─ models::occupant_record: widen half units, map face
//! ```
//!
//! ```no_run
//! use rackguard_netbox::{NetBoxClient, NetBoxConfig};
//! use rackguard_snapshot::SnapshotCache;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NetBoxClient::new(NetBoxConfig::new("https://netbox.example.com", "token"))?;
//!     let cache = SnapshotCache::new(Arc::new(client));
//!     let snapshot = cache.refresh("dc1").await?;
//!     println!("{} racks", snapshot.rack_count());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod models;

pub use client::NetBoxClient;
pub use config::{NetBoxConfig, DEFAULT_TIMEOUT};
pub use error::{NetBoxError, Result};
