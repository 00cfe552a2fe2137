use crate::claims::ClaimTracker;
use crate::naming::NamingRule;
use crate::result::{reduce, HardFail, ImportStatus, PositionStatus, ValidationResult};
use crate::row::{InputRow, RowField, UnitValue};
use rackguard_snapshot::{name_key, Occupant, PositionRange, Rack, Snapshot};

/// Fields NetBox needs to import a device. Facility is defaulted, never missing.
pub const IMPORT_REQUIRED_FIELDS: [RowField; 3] =
    [RowField::DeviceName, RowField::DeviceRole, RowField::Status];

#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub naming: NamingRule,
    /// Facility assumed for rows that do not name one
    pub default_facility: Option<String>,
}

/// Classifies rows against a snapshot and the claims of the current pass
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

struct PositionOutcome {
    status: PositionStatus,
    hard_fail: Option<HardFail>,
    pre_existing: bool,
    existing_device: Option<String>,
    evidence: Vec<String>,
}

impl PositionOutcome {
    fn blocked(hard_fail: HardFail, evidence: String) -> Self {
        Self {
            status: PositionStatus::Blocked,
            hard_fail: Some(hard_fail),
            pre_existing: false,
            existing_device: None,
            evidence: vec![evidence],
        }
    }

    fn available() -> Self {
        Self {
            status: PositionStatus::Available,
            hard_fail: None,
            pre_existing: false,
            existing_device: None,
            evidence: Vec::new(),
        }
    }
}

struct ImportOutcome {
    status: ImportStatus,
    missing_fields: Vec<String>,
    evidence: Vec<String>,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Run position and import analyses for one row and reduce them.
    ///
    /// Registers a claim in `tracker` whenever the row legitimately reaches
    /// the occupancy check, so later siblings see it as taken.
    pub fn classify(
        &self,
        row: &InputRow,
        snapshot: &Snapshot,
        tracker: &mut ClaimTracker,
    ) -> ValidationResult {
        let position = self.analyze_position(row, snapshot, tracker);
        let import = self.analyze_import(row);

        let classification = reduce(
            position.status,
            import.status,
            position.pre_existing,
            position.hard_fail,
        );

        let mut evidence = position.evidence;
        evidence.extend(import.evidence);

        log::debug!(
            "row {} ({}): position={} import={} -> {}",
            row.index,
            row.device_identifier(),
            position.status,
            import.status,
            classification
        );

        ValidationResult {
            row: row.clone(),
            position_status: position.status,
            import_status: import.status,
            missing_fields: import.missing_fields,
            evidence,
            classification,
            hard_fail: position.hard_fail,
            pre_existing: position.pre_existing,
            existing_device: position.existing_device,
        }
    }

    fn analyze_position(
        &self,
        row: &InputRow,
        snapshot: &Snapshot,
        tracker: &mut ClaimTracker,
    ) -> PositionOutcome {
        let rack_name = row
            .rack_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let (Some(rack_name), Some(position), Some(height)) =
            (rack_name, row.position.as_ref(), row.height.as_ref())
        else {
            let missing: Vec<&str> = [
                (RowField::RackName, rack_name.is_none()),
                (RowField::Position, row.position.is_none()),
                (RowField::Height, row.height.is_none()),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(field, _)| field.as_str())
            .collect();
            return PositionOutcome::blocked(
                HardFail::MissingRequired,
                format!("missing required field(s): {}", missing.join(", ")),
            );
        };

        let (UnitValue::Whole(start), UnitValue::Whole(height)) = (position, height) else {
            return PositionOutcome {
                status: PositionStatus::Review,
                evidence: vec![format!(
                    "fractional position units need review: position {position}, height {height}"
                )],
                ..PositionOutcome::available()
            };
        };

        let Some(rack) = snapshot.lookup_rack(rack_name) else {
            return PositionOutcome::blocked(
                HardFail::RackNotFound,
                format!(
                    "rack not found: '{rack_name}' in facility '{}'",
                    snapshot.facility()
                ),
            );
        };

        let range = match requested_range(rack, *start, *height) {
            Ok(range) => range,
            Err(reason) => {
                return PositionOutcome::blocked(
                    HardFail::OutOfBounds,
                    format!("out of bounds: {reason}"),
                )
            }
        };

        if let Some(earlier) = tracker.conflict(&rack.name, &range, row.orientation) {
            return PositionOutcome::blocked(
                HardFail::DuplicateInBatch,
                format!("duplicate of row {earlier}"),
            );
        }

        let mut outcome = PositionOutcome::available();

        let issues = snapshot.issues_for_rack(&rack.name);
        if !issues.is_empty() {
            outcome.status = PositionStatus::Review;
            outcome.evidence.extend(
                issues
                    .iter()
                    .map(|issue| format!("inconsistent inventory data: {issue}")),
            );
        }

        let conflicts: Vec<&Occupant> = snapshot
            .occupants(&rack.name)
            .iter()
            .filter(|occupant| occupant.collides_with(&range, row.orientation))
            .collect();

        match conflicts.as_slice() {
            [] => {
                if outcome.status == PositionStatus::Available {
                    outcome.evidence.push(format!(
                        "positions {range} [{}] available in rack {}",
                        row.orientation, rack.name
                    ));
                }
            }
            [occupant] if describes_occupant(row, occupant, &range) => {
                outcome.pre_existing = true;
                outcome.existing_device = occupant.device_name.clone();
                outcome.evidence.push(format!(
                    "{} already present at positions {}; no change needed",
                    occupant.label(),
                    occupant.range
                ));
                outcome.evidence.extend(compare_make_model(row, occupant));
            }
            _ => {
                outcome.status = PositionStatus::Review;
                outcome.existing_device = Some(conflicts[0].display_name().to_string());
                for occupant in &conflicts {
                    outcome.evidence.push(format!(
                        "occupied by {} at positions {}",
                        occupant.label(),
                        occupant.range
                    ));
                }
                if let [occupant] = conflicts.as_slice() {
                    outcome.evidence.extend(compare_make_model(row, occupant));
                }
            }
        }

        tracker.claim(&rack.name, range, row.orientation, row.index);

        if let Some(name) = row.device_name.as_deref() {
            let rack_key = name_key(&rack.name);
            for elsewhere in snapshot.find_device(name) {
                if name_key(&elsewhere.rack) == rack_key && elsewhere.range == range {
                    continue;
                }
                outcome.evidence.push(format!(
                    "device '{}' already exists in rack {} at positions {}",
                    elsewhere.display_name(),
                    elsewhere.rack,
                    elsewhere.range
                ));
            }
        }

        outcome
    }

    fn analyze_import(&self, row: &InputRow) -> ImportOutcome {
        let missing_fields: Vec<String> = IMPORT_REQUIRED_FIELDS
            .iter()
            .filter(|field| !row.presence.contains(**field))
            .map(|field| field.as_str().to_string())
            .collect();

        let mut evidence = Vec::new();
        if !missing_fields.is_empty() {
            evidence.push(format!("missing for import: {}", missing_fields.join(", ")));
        }

        if !row.presence.contains(RowField::Facility) {
            if let Some(default) = self.config.default_facility.as_deref() {
                evidence.push(format!("facility defaulted to '{default}'"));
            }
        }

        evidence.extend(self.config.naming.check(row.device_name.as_deref()));

        let status = if missing_fields.is_empty() {
            ImportStatus::Ready
        } else {
            ImportStatus::Incomplete
        };

        ImportOutcome {
            status,
            missing_fields,
            evidence,
        }
    }
}

fn requested_range(rack: &Rack, start: i64, height: i64) -> Result<PositionRange, String> {
    let height = u32::try_from(height)
        .ok()
        .filter(|height| *height >= 1)
        .ok_or_else(|| format!("height {height} must be at least 1"))?;
    let range = PositionRange::from_height(start, height)
        .ok_or_else(|| format!("height {height} must be at least 1"))?;

    if rack.contains(&range) {
        return Ok(range);
    }
    let bounds = rack
        .bounds()
        .map(|bounds| bounds.to_string())
        .unwrap_or_else(|| "none".to_string());
    if start < rack.starting_position {
        Err(format!(
            "position {start} is below rack {} (usable positions {bounds})",
            rack.name
        ))
    } else {
        Err(format!(
            "positions {range} exceed rack {} (usable positions {bounds})",
            rack.name
        ))
    }
}

/// The row restates this occupant exactly: same name, face and span.
fn describes_occupant(row: &InputRow, occupant: &Occupant, range: &PositionRange) -> bool {
    let (Some(row_name), Some(occupant_name)) =
        (row.device_name.as_deref(), occupant.device_name.as_deref())
    else {
        return false;
    };
    name_key(row_name) == name_key(occupant_name)
        && occupant.orientation == row.orientation
        && occupant.range == *range
}

fn compare_make_model(row: &InputRow, occupant: &Occupant) -> Option<String> {
    let mut mismatches = Vec::new();
    let mut matches = Vec::new();

    for (label, ours, theirs) in [
        ("make", row.make.as_deref(), occupant.make.as_deref()),
        ("model", row.model.as_deref(), occupant.model.as_deref()),
    ] {
        let (Some(ours), Some(theirs)) = (ours, theirs) else {
            continue;
        };
        if ours.trim().eq_ignore_ascii_case(theirs.trim()) {
            matches.push(format!("{label} '{ours}'"));
        } else {
            mismatches.push(format!("{label} '{ours}' vs inventory '{theirs}'"));
        }
    }

    if !mismatches.is_empty() {
        Some(format!("differs from inventory: {}", mismatches.join("; ")))
    } else if !matches.is_empty() {
        Some(format!("matches inventory: {}", matches.join("; ")))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Classification;
    use pretty_assertions::assert_eq;
    use rackguard_snapshot::{FacilityData, OccupantRecord, Orientation, RackRecord, SnapshotBuilder};

    fn snapshot(occupants: Vec<OccupantRecord>) -> Snapshot {
        SnapshotBuilder::new().generation(1).build(FacilityData {
            facility: "dc1".to_string(),
            racks: vec![RackRecord {
                name: "A1".to_string(),
                usable_positions: 42,
                starting_position: 1,
            }],
            occupants,
        })
    }

    fn occupant(name: &str, start: i64, height: u32, orientation: Orientation) -> OccupantRecord {
        OccupantRecord {
            rack_name: "A1".to_string(),
            position_start: start,
            height,
            orientation,
            device_name: Some(name.to_string()),
            make: Some("Arista".to_string()),
            model: Some("7050".to_string()),
        }
    }

    fn complete_row(index: usize) -> InputRow {
        InputRow::new(index)
            .rack("A1")
            .position(5)
            .height(2)
            .device_name("sw1")
            .device_role("Switch")
            .status("active")
    }

    fn classify(row: &InputRow, snapshot: &Snapshot) -> ValidationResult {
        Classifier::default().classify(row, snapshot, &mut ClaimTracker::new())
    }

    #[test]
    fn missing_required_lists_fields() {
        let row = InputRow::new(0).rack("A1").device_name("sw1");
        let result = classify(&row, &snapshot(vec![]));
        assert_eq!(result.hard_fail, Some(HardFail::MissingRequired));
        assert_eq!(result.position_status, PositionStatus::Blocked);
        assert_eq!(result.classification, Classification::Invalid);
        assert_eq!(result.evidence[0], "missing required field(s): position, height");
    }

    #[test]
    fn blank_rack_name_counts_as_missing() {
        let row = InputRow::new(0).rack("   ").position(1).height(1);
        let result = classify(&row, &snapshot(vec![]));
        assert_eq!(result.hard_fail, Some(HardFail::MissingRequired));
        assert!(result.evidence[0].contains("rack_name"));
    }

    #[test]
    fn fractional_units_need_review() {
        let row = complete_row(0).position_units(UnitValue::Fractional("5.5".to_string()));
        let mut tracker = ClaimTracker::new();
        let result = Classifier::default().classify(&row, &snapshot(vec![]), &mut tracker);
        assert_eq!(result.position_status, PositionStatus::Review);
        assert_eq!(result.classification, Classification::ReviewRequired);
        assert!(result.evidence[0].contains("fractional"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn position_below_rack_is_out_of_bounds() {
        let row = complete_row(0).position(0);
        let result = classify(&row, &snapshot(vec![]));
        assert_eq!(result.hard_fail, Some(HardFail::OutOfBounds));
        assert!(result.evidence[0].starts_with("out of bounds"));
    }

    #[test]
    fn zero_height_is_out_of_bounds() {
        let row = complete_row(0).height(0);
        let result = classify(&row, &snapshot(vec![]));
        assert_eq!(result.hard_fail, Some(HardFail::OutOfBounds));
    }

    #[test]
    fn opposite_face_occupant_does_not_collide() {
        let row = complete_row(0).orientation(Orientation::Rear);
        let result = classify(&row, &snapshot(vec![occupant("sw2", 5, 2, Orientation::Front)]));
        assert_eq!(result.position_status, PositionStatus::Available);
        assert_eq!(result.classification, Classification::NetboxUpdate);
    }

    #[test]
    fn full_depth_row_collides_with_front_occupant() {
        let row = complete_row(0);
        let result = classify(&row, &snapshot(vec![occupant("sw2", 6, 1, Orientation::Front)]));
        assert_eq!(result.position_status, PositionStatus::Review);
        assert_eq!(result.existing_device.as_deref(), Some("sw2"));
        assert!(result.evidence.iter().any(|e| e.contains("sw2 [front]")));
        assert!(result.evidence.iter().all(|e| !e.contains("inventory:")));
    }

    #[test]
    fn exact_match_is_pre_existing_even_when_incomplete() {
        let row = InputRow::new(0)
            .rack("a1")
            .position(5)
            .height(2)
            .device_name("SW1")
            .orientation(Orientation::Front);
        let result = classify(&row, &snapshot(vec![occupant("sw1", 5, 2, Orientation::Front)]));
        assert!(result.pre_existing);
        assert_eq!(result.import_status, ImportStatus::Incomplete);
        assert_eq!(result.classification, Classification::NoAction);
    }

    #[test]
    fn same_name_different_span_is_review() {
        let row = complete_row(0).orientation(Orientation::Front).height(1);
        let result = classify(&row, &snapshot(vec![occupant("sw1", 5, 2, Orientation::Front)]));
        assert!(!result.pre_existing);
        assert_eq!(result.classification, Classification::ReviewRequired);
    }

    #[test]
    fn make_model_mismatch_is_reported() {
        let row = complete_row(0).make("Cisco").model("7050");
        let result = classify(&row, &snapshot(vec![occupant("sw2", 5, 1, Orientation::Full)]));
        let line = result
            .evidence
            .iter()
            .find(|e| e.starts_with("differs from inventory"))
            .unwrap();
        assert!(line.contains("make 'Cisco' vs inventory 'Arista'"));
    }

    #[test]
    fn device_elsewhere_is_advisory() {
        let row = complete_row(0).position(20);
        let result = classify(&row, &snapshot(vec![occupant("sw1", 30, 1, Orientation::Full)]));
        assert_eq!(result.classification, Classification::NetboxUpdate);
        assert!(result
            .evidence
            .iter()
            .any(|e| e == "device 'sw1' already exists in rack A1 at positions 30"));
    }

    #[test]
    fn inconsistent_rack_forces_review() {
        let row = complete_row(0);
        let result = classify(&row, &snapshot(vec![occupant("tall", 41, 4, Orientation::Full)]));
        assert_eq!(result.position_status, PositionStatus::Review);
        assert_eq!(result.classification, Classification::ReviewRequired);
        assert!(result.evidence[0].starts_with("inconsistent inventory data"));
    }

    #[test]
    fn naming_and_default_facility_are_advisory() {
        let classifier = Classifier::new(ClassifierConfig {
            naming: NamingRule::pattern("core-").unwrap(),
            default_facility: Some("dc1".to_string()),
        });
        let row = complete_row(0);
        let result = classifier.classify(&row, &snapshot(vec![]), &mut ClaimTracker::new());
        assert_eq!(result.classification, Classification::NetboxUpdate);
        assert!(result.evidence.contains(&"facility defaulted to 'dc1'".to_string()));
        assert!(result.evidence.iter().any(|e| e.contains("does not match naming pattern")));
    }
}
