use pretty_assertions::assert_eq;
use rackguard_snapshot::{
    FacilityData, OccupantRecord, Orientation, RackRecord, Snapshot, SnapshotBuilder,
};
use rackguard_validator::{
    CancellationToken, Classification, Classifier, ClassifierConfig, InputRow, NamingRule,
    PositionStatus, ValidationPass, ValidatorError,
};
use std::sync::Arc;

fn facility() -> Arc<Snapshot> {
    let racks = ["A1", "A2", "B1"]
        .into_iter()
        .map(|name| RackRecord {
            name: name.to_string(),
            usable_positions: 42,
            starting_position: 1,
        })
        .collect();
    let occupants = vec![
        OccupantRecord {
            rack_name: "A2".to_string(),
            position_start: 20,
            height: 2,
            orientation: Orientation::Full,
            device_name: Some("db1".to_string()),
            make: Some("Dell".to_string()),
            model: Some("R640".to_string()),
        },
        OccupantRecord {
            rack_name: "B1".to_string(),
            position_start: 1,
            height: 1,
            orientation: Orientation::Full,
            device_name: Some("patch1".to_string()),
            make: None,
            model: None,
        },
        OccupantRecord {
            rack_name: "B1".to_string(),
            position_start: 1,
            height: 1,
            orientation: Orientation::Front,
            device_name: Some("patch2".to_string()),
            make: None,
            model: None,
        },
    ];
    Arc::new(SnapshotBuilder::new().generation(3).build(FacilityData {
        facility: "dc1".to_string(),
        racks,
        occupants,
    }))
}

fn row(index: usize, rack: &str, position: i64, name: &str) -> InputRow {
    InputRow::new(index)
        .rack(rack)
        .position(position)
        .height(1)
        .device_name(name)
        .device_role("Server")
        .status("planned")
}

fn pass() -> ValidationPass {
    ValidationPass::new(Classifier::default(), facility())
}

#[test]
fn results_follow_input_order_across_racks() {
    let rows = vec![
        row(0, "A1", 1, "a"),
        row(1, "B1", 10, "b"),
        row(2, "A2", 5, "c"),
        row(3, "A1", 2, "d"),
        row(4, "missing-rack", 1, "e"),
        row(5, "A2", 6, "f"),
    ];
    let report = pass().run(&rows).unwrap();

    let indices: Vec<usize> = report.results.iter().map(|r| r.row.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(report.summary.total, 6);
    assert_eq!(report.facility, "dc1");
    assert_eq!(report.snapshot_generation, 3);
}

#[test]
fn lower_index_wins_whatever_the_slice_order() {
    let rows = vec![row(7, "A1", 10, "late"), row(2, "A1", 10, "early")];
    let report = pass().run(&rows).unwrap();

    let early = &report.results[0];
    let late = &report.results[1];
    assert_eq!(early.row.index, 2);
    assert_eq!(early.classification, Classification::NetboxUpdate);
    assert_eq!(late.classification, Classification::Invalid);
    assert_eq!(late.evidence[0], "duplicate of row 2");
}

#[test]
fn rack_names_match_case_insensitively_for_duplicates() {
    let rows = vec![row(0, "a1", 10, "x"), row(1, "A1", 10, "y")];
    let report = pass().run(&rows).unwrap();

    assert_eq!(report.results[1].classification, Classification::Invalid);
}

#[test]
fn repeated_passes_agree() {
    let rows = vec![
        row(0, "A1", 1, "a"),
        row(1, "A1", 1, "b"),
        row(2, "A2", 20, "db1"),
        row(3, "B1", 1, "c"),
    ];
    let pass = pass();
    let first = pass.run(&rows).unwrap();
    let second = pass.run(&rows).unwrap();

    assert_eq!(first, second);
}

#[test]
fn occupied_space_names_the_occupant() {
    let report = pass().run(&[row(0, "A2", 21, "web1")]).unwrap();
    let result = &report.results[0];

    assert_eq!(result.position_status, PositionStatus::Review);
    assert!(result
        .evidence
        .iter()
        .any(|line| line == "occupied by db1 [full] at positions 20-21"));
}

#[test]
fn inconsistent_rack_is_reported_and_reviewed() {
    let rows = vec![row(0, "B1", 30, "x"), row(1, "A1", 30, "y")];
    let report = pass().run(&rows).unwrap();

    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].rack, "B1");
    assert_eq!(report.results[0].classification, Classification::ReviewRequired);
    assert!(report.results[0].evidence[0].starts_with("inconsistent inventory data"));
    assert_eq!(report.results[1].classification, Classification::NetboxUpdate);
}

#[test]
fn untouched_inconsistencies_stay_out_of_the_report() {
    let report = pass().run(&[row(0, "A1", 30, "y")]).unwrap();
    assert!(report.anomalies.is_empty());
}

#[test]
fn naming_rule_is_advisory() {
    let config = ClassifierConfig {
        naming: NamingRule::pattern("srv-").unwrap(),
        default_facility: Some("dc1".to_string()),
    };
    let pass = ValidationPass::new(Classifier::new(config), facility());
    let report = pass.run(&[row(0, "A1", 30, "web1")]).unwrap();
    let result = &report.results[0];

    assert_eq!(result.classification, Classification::NetboxUpdate);
    assert!(result
        .evidence
        .iter()
        .any(|line| line.contains("does not match naming pattern 'srv-'")));
    assert!(result
        .evidence
        .iter()
        .any(|line| line == "facility defaulted to 'dc1'"));
}

#[test]
fn cancelled_pass_returns_no_results() {
    let token = CancellationToken::new();
    let pass = pass().with_cancellation(token.clone());
    token.cancel();

    let err = pass.run(&[row(0, "A1", 1, "a")]).unwrap_err();
    assert!(matches!(err, ValidatorError::Cancelled));
}

#[test]
fn empty_batch_yields_empty_report() {
    let report = pass().run(&[]).unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.summary.total, 0);
}
