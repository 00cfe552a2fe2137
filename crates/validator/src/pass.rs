use crate::claims::ClaimTracker;
use crate::engine::Classifier;
use crate::error::{Result, ValidatorError};
use crate::report::{Report, ResultAggregator};
use crate::result::ValidationResult;
use crate::row::InputRow;
use rackguard_snapshot::{name_key, ConsistencyIssue, Snapshot};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// One batch validated against one snapshot.
///
/// Rows are grouped by rack; groups run in parallel, rows inside a group run
/// in ordinal order against a tracker owned by that group. Racks never share
/// space, so the grouping does not change any verdict.
pub struct ValidationPass {
    classifier: Classifier,
    snapshot: Arc<Snapshot>,
    cancel: CancellationToken,
}

impl ValidationPass {
    pub fn new(classifier: Classifier, snapshot: Arc<Snapshot>) -> Self {
        Self {
            classifier,
            snapshot,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Classify every row. Either all rows get a result or the pass fails
    /// with [`ValidatorError::Cancelled`].
    pub fn run(&self, rows: &[InputRow]) -> Result<Report> {
        let started = Instant::now();
        let groups = group_by_rack(rows);
        log::debug!(
            "Validating {} rows in {} rack group(s) against snapshot generation {}",
            rows.len(),
            groups.len(),
            self.snapshot.generation()
        );

        let classified: Vec<Vec<ValidationResult>> = groups
            .par_iter()
            .map(|group| self.run_group(group))
            .collect::<Result<_>>()?;

        if self.cancel.is_cancelled() {
            return Err(ValidatorError::Cancelled);
        }

        let mut aggregator = ResultAggregator::new();
        for results in classified {
            aggregator.extend(results);
        }

        let anomalies = self.touched_anomalies(rows);
        if !anomalies.is_empty() {
            log::warn!(
                "{} inventory inconsistency(ies) affect racks in this batch",
                anomalies.len()
            );
        }

        let report = aggregator.finish(
            self.snapshot.facility(),
            self.snapshot.generation(),
            anomalies,
        );
        log::info!(
            "Validated {} rows in {:?}: {} update, {} no action, {} review, {} invalid",
            report.summary.total,
            started.elapsed(),
            report.summary.netbox_update,
            report.summary.no_action,
            report.summary.review_required,
            report.summary.invalid
        );
        Ok(report)
    }

    fn run_group(&self, group: &[&InputRow]) -> Result<Vec<ValidationResult>> {
        let mut tracker = ClaimTracker::new();
        let mut results = Vec::with_capacity(group.len());
        for row in group {
            if self.cancel.is_cancelled() {
                return Err(ValidatorError::Cancelled);
            }
            results.push(self.classifier.classify(row, &self.snapshot, &mut tracker));
        }
        Ok(results)
    }

    fn touched_anomalies(&self, rows: &[InputRow]) -> Vec<ConsistencyIssue> {
        let touched: BTreeSet<String> = rows.iter().filter_map(rack_key).collect();
        touched
            .iter()
            .filter_map(|key| self.snapshot.lookup_rack(key))
            .flat_map(|rack| self.snapshot.issues_for_rack(&rack.name).iter().cloned())
            .collect()
    }
}

fn rack_key(row: &InputRow) -> Option<String> {
    row.rack_name
        .as_deref()
        .map(name_key)
        .filter(|key| !key.is_empty())
}

/// Rows without a rack form their own group; each group is in ordinal order.
fn group_by_rack(rows: &[InputRow]) -> Vec<Vec<&InputRow>> {
    let mut groups: BTreeMap<Option<String>, Vec<&InputRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(rack_key(row)).or_default().push(row);
    }
    groups
        .into_values()
        .map(|mut group| {
            group.sort_by_key(|row| row.index);
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_are_case_insensitive_and_ordered() {
        let rows = vec![
            InputRow::new(2).rack("a1"),
            InputRow::new(0).rack("A1 "),
            InputRow::new(1).rack("B2"),
            InputRow::new(3),
            InputRow::new(4).rack("  "),
        ];
        let groups = group_by_rack(&rows);
        let indices: Vec<Vec<usize>> = groups
            .iter()
            .map(|group| group.iter().map(|row| row.index).collect())
            .collect();
        assert_eq!(indices, vec![vec![3, 4], vec![0, 2], vec![1]]);
    }
}
