//! # Rackguard Validator
//!
//! Classifies proposed rack placements against an inventory snapshot.
//!
//! ## Architecture
//!
//! ```text
//! [InputRow] ──> ValidationPass
//!                  ├─ group rows by rack (rayon, one ClaimTracker each)
//!                  └─ Classifier::classify per row, in ordinal order
//!                       ├─ position analysis  (bounds, claims, occupancy)
//!                       ├─ import analysis    (required fields, naming)
//!                       └─ reduce()           -> Classification
//!                │
//!                ▼
//!          ResultAggregator ──> Report (input order, summary, anomalies)
//! ```
//!
//! ## Example
//!
//! ```
//! use rackguard_snapshot::{FacilityData, RackRecord, SnapshotBuilder};
//! use rackguard_validator::{Classification, Classifier, InputRow, ValidationPass};
//! use std::sync::Arc;
//!
//! let snapshot = SnapshotBuilder::new().generation(1).build(FacilityData {
//!     facility: "dc1".into(),
//!     racks: vec![RackRecord { name: "A1".into(), usable_positions: 42, starting_position: 1 }],
//!     occupants: vec![],
//! });
//!
//! let rows = vec![InputRow::new(0)
//!     .rack("A1")
//!     .position(10)
//!     .height(2)
//!     .device_name("sw1")
//!     .device_role("switch")
//!     .status("active")];
//!
//! let report = ValidationPass::new(Classifier::default(), Arc::new(snapshot))
//!     .run(&rows)
//!     .unwrap();
//! assert_eq!(report.results[0].classification, Classification::NetboxUpdate);
//! ```

mod claims;
mod engine;
mod error;
mod naming;
mod pass;
mod report;
mod result;
mod row;

pub use claims::{Claim, ClaimTracker};
pub use engine::{Classifier, ClassifierConfig, IMPORT_REQUIRED_FIELDS};
pub use error::{Result, ValidatorError};
pub use naming::NamingRule;
pub use pass::ValidationPass;
pub use report::{Report, ReportFilter, ResultAggregator, Summary};
pub use result::{
    reduce, Classification, HardFail, ImportStatus, PositionStatus, ValidationResult,
};
pub use row::{FieldPresence, InputRow, RowField, UnitValue};

pub use tokio_util::sync::CancellationToken;
