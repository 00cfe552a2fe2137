use crate::row::InputRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical feasibility verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Available,
    Review,
    Blocked,
}

/// Data completeness verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Ready,
    Incomplete,
}

/// Final action for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Already true in the inventory
    NoAction,
    /// Safe to import
    NetboxUpdate,
    /// Conflict, ambiguity or missing data
    ReviewRequired,
    /// Cannot be placed as given
    Invalid,
}

/// Row-level conditions that always make a row INVALID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HardFail {
    MissingRequired,
    RackNotFound,
    OutOfBounds,
    DuplicateInBatch,
}

impl PositionStatus {
    pub const ALL: [PositionStatus; 3] = [
        PositionStatus::Available,
        PositionStatus::Review,
        PositionStatus::Blocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Available => "AVAILABLE",
            PositionStatus::Review => "REVIEW",
            PositionStatus::Blocked => "BLOCKED",
        }
    }
}

impl ImportStatus {
    pub const ALL: [ImportStatus; 2] = [ImportStatus::Ready, ImportStatus::Incomplete];

    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::Ready => "READY",
            ImportStatus::Incomplete => "INCOMPLETE",
        }
    }
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::NoAction,
        Classification::NetboxUpdate,
        Classification::ReviewRequired,
        Classification::Invalid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::NoAction => "NO_ACTION",
            Classification::NetboxUpdate => "NETBOX_UPDATE",
            Classification::ReviewRequired => "REVIEW_REQUIRED",
            Classification::Invalid => "INVALID",
        }
    }
}

impl HardFail {
    pub fn as_str(self) -> &'static str {
        match self {
            HardFail::MissingRequired => "MISSING_REQUIRED",
            HardFail::RackNotFound => "RACK_NOT_FOUND",
            HardFail::OutOfBounds => "OUT_OF_BOUNDS",
            HardFail::DuplicateInBatch => "DUPLICATE_IN_BATCH",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(PositionStatus, ImportStatus, Classification, HardFail);

/// Reduce the two analyses and hard-fail state into one classification.
///
/// Total over its inputs; evaluated in priority order.
pub fn reduce(
    position: PositionStatus,
    import: ImportStatus,
    pre_existing: bool,
    hard_fail: Option<HardFail>,
) -> Classification {
    match (hard_fail, position) {
        (Some(_), _) | (None, PositionStatus::Blocked) => Classification::Invalid,
        (None, PositionStatus::Available) if pre_existing => Classification::NoAction,
        (None, PositionStatus::Available) => match import {
            ImportStatus::Ready => Classification::NetboxUpdate,
            ImportStatus::Incomplete => Classification::ReviewRequired,
        },
        (None, PositionStatus::Review) => Classification::ReviewRequired,
    }
}

/// Verdict for one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub row: InputRow,
    pub position_status: PositionStatus,
    pub import_status: ImportStatus,
    /// Import-required fields the row did not supply, in fixed order
    pub missing_fields: Vec<String>,
    /// Human-readable reasons, position analysis first
    pub evidence: Vec<String>,
    pub classification: Classification,
    pub hard_fail: Option<HardFail>,
    /// The row describes a placement the inventory already has
    pub pre_existing: bool,
    /// Primary device currently occupying the requested space
    pub existing_device: Option<String>,
}

impl ValidationResult {
    pub fn recommendation(&self) -> &'static str {
        if let Some(hard_fail) = self.hard_fail {
            return match hard_fail {
                HardFail::MissingRequired => "Add the missing required field(s) to the row.",
                HardFail::RackNotFound => {
                    "Verify the rack name or create the rack in NetBox before importing."
                }
                HardFail::OutOfBounds => "Adjust the position to fit within the rack.",
                HardFail::DuplicateInBatch => {
                    "Remove the duplicate row or resolve the position conflict."
                }
            };
        }
        match self.classification {
            Classification::NoAction => "Device already exists at this position. No action needed.",
            Classification::NetboxUpdate => "Safe to import.",
            Classification::ReviewRequired if self.position_status == PositionStatus::Review => {
                "Choose a different position or relocate the conflicting device(s)."
            }
            Classification::ReviewRequired => "Add the missing import field(s) before importing.",
            Classification::Invalid => "Review and resolve manually.",
        }
    }
}
