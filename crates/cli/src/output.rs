use rackguard_snapshot::Snapshot;
use rackguard_validator::{Report, ValidationResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Per-rack line of the `racks` command
#[derive(Debug, Serialize)]
pub struct RackSummary {
    pub name: String,
    pub starting_position: i64,
    pub usable_positions: u32,
    pub occupants: usize,
    pub used_positions: usize,
    pub issues: usize,
}

pub fn rack_summaries(snapshot: &Snapshot) -> Vec<RackSummary> {
    snapshot
        .racks()
        .into_iter()
        .map(|rack| {
            let occupants = snapshot.occupants(&rack.name);
            let used: BTreeSet<i64> = occupants
                .iter()
                .flat_map(|occupant| occupant.range.start..=occupant.range.end)
                .filter(|position| {
                    rack.bounds()
                        .is_some_and(|bounds| (bounds.start..=bounds.end).contains(position))
                })
                .collect();
            RackSummary {
                name: rack.name.clone(),
                starting_position: rack.starting_position,
                usable_positions: rack.usable_positions,
                occupants: occupants.len(),
                used_positions: used.len(),
                issues: snapshot.issues_for_rack(&rack.name).len(),
            }
        })
        .collect()
}

pub fn render_racks(snapshot: &Snapshot, racks: &[RackSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Facility '{}' (snapshot generation {}): {} rack(s), {} device(s)",
        snapshot.facility(),
        snapshot.generation(),
        racks.len(),
        snapshot.occupant_count()
    );
    for rack in racks {
        let _ = write!(
            out,
            "  {:<12} {:>3}/{:<3} RU used  {:>3} device(s)",
            rack.name, rack.used_positions, rack.usable_positions, rack.occupants
        );
        if rack.issues > 0 {
            let _ = write!(out, "  {} issue(s)", rack.issues);
        }
        out.push('\n');
    }
    out
}

pub fn render_report(report: &Report, shown: &[&ValidationResult]) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Facility '{}' (snapshot generation {}): {} row(s)",
        report.facility, report.snapshot_generation, summary.total
    );
    let _ = writeln!(
        out,
        "  NETBOX_UPDATE {}  NO_ACTION {}  REVIEW_REQUIRED {}  INVALID {}",
        summary.netbox_update, summary.no_action, summary.review_required, summary.invalid
    );

    if !report.anomalies.is_empty() {
        let _ = writeln!(out, "Inventory inconsistencies:");
        for issue in &report.anomalies {
            let _ = writeln!(out, "  {issue}");
        }
    }

    if !shown.is_empty() {
        out.push('\n');
    }
    for result in shown {
        let row = &result.row;
        let line = row.source_line.unwrap_or(row.index + 1);
        let placement = match (&row.rack_name, &row.position) {
            (Some(rack), Some(position)) => format!("{rack}@{position}"),
            (Some(rack), None) => rack.clone(),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>5}  {:<15}  {:<12}  {:<20}  {}",
            line,
            result.classification.as_str(),
            placement,
            row.device_identifier(),
            result.evidence.first().map(String::as_str).unwrap_or("")
        );
    }
    out
}
