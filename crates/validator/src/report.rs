use crate::result::{Classification, ImportStatus, PositionStatus, ValidationResult};
use rackguard_snapshot::ConsistencyIssue;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Pass-level counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,

    pub no_action: usize,
    pub netbox_update: usize,
    pub review_required: usize,
    pub invalid: usize,

    pub available: usize,
    pub review: usize,
    pub blocked: usize,

    pub ready: usize,
    pub incomplete: usize,
}

impl Summary {
    fn record(&mut self, result: &ValidationResult) {
        self.total += 1;
        match result.classification {
            Classification::NoAction => self.no_action += 1,
            Classification::NetboxUpdate => self.netbox_update += 1,
            Classification::ReviewRequired => self.review_required += 1,
            Classification::Invalid => self.invalid += 1,
        }
        match result.position_status {
            PositionStatus::Available => self.available += 1,
            PositionStatus::Review => self.review += 1,
            PositionStatus::Blocked => self.blocked += 1,
        }
        match result.import_status {
            ImportStatus::Ready => self.ready += 1,
            ImportStatus::Incomplete => self.incomplete += 1,
        }
    }

    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::NoAction => self.no_action,
            Classification::NetboxUpdate => self.netbox_update,
            Classification::ReviewRequired => self.review_required,
            Classification::Invalid => self.invalid,
        }
    }
}

/// Subsets of a report used for export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    All,
    /// Rows classified NETBOX_UPDATE
    ReadyToImport,
    /// Position available but import data missing
    NeedsData,
    Available,
    Blocked,
    Classification(Classification),
}

impl ReportFilter {
    pub fn matches(&self, result: &ValidationResult) -> bool {
        match self {
            ReportFilter::All => true,
            ReportFilter::ReadyToImport => result.classification == Classification::NetboxUpdate,
            ReportFilter::NeedsData => {
                result.position_status == PositionStatus::Available
                    && result.import_status == ImportStatus::Incomplete
            }
            ReportFilter::Available => result.position_status == PositionStatus::Available,
            ReportFilter::Blocked => result.position_status == PositionStatus::Blocked,
            ReportFilter::Classification(classification) => {
                result.classification == *classification
            }
        }
    }
}

/// Ordered outcome of one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub facility: String,
    pub snapshot_generation: u64,
    pub summary: Summary,
    /// Inventory inconsistencies touched by this pass
    pub anomalies: Vec<ConsistencyIssue>,
    /// One result per input row, in input order
    pub results: Vec<ValidationResult>,
}

impl Report {
    pub fn filtered(&self, filter: ReportFilter) -> Vec<&ValidationResult> {
        self.results
            .iter()
            .filter(|result| filter.matches(result))
            .collect()
    }
}

/// Collects results in any order and hands them back in input order
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: BTreeMap<usize, ValidationResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first result recorded for an ordinal wins; repeats are dropped.
    pub fn insert(&mut self, result: ValidationResult) {
        match self.results.entry(result.row.index) {
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
            Entry::Occupied(slot) => {
                log::warn!(
                    "Row {} classified twice; keeping the first result",
                    slot.key()
                );
            }
        }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ValidationResult>) {
        for result in results {
            self.insert(result);
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finish(
        self,
        facility: impl Into<String>,
        snapshot_generation: u64,
        anomalies: Vec<ConsistencyIssue>,
    ) -> Report {
        let results: Vec<ValidationResult> = self.results.into_values().collect();
        let mut summary = Summary::default();
        for result in &results {
            summary.record(result);
        }
        Report {
            facility: facility.into(),
            snapshot_generation,
            summary,
            anomalies,
            results,
        }
    }
}
