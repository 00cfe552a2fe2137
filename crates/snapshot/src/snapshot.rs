use crate::source::FacilityData;
use crate::types::{ConsistencyIssue, Occupant, PositionRange, Rack};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Normalized lookup key for rack and device names
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct RackEntry {
    rack: Rack,
    occupants: Vec<Occupant>,
    issues: Vec<ConsistencyIssue>,
}

/// Immutable point-in-time view of one facility's racks and occupants.
///
/// Never mutated after construction; a refresh builds a new value.
#[derive(Debug, Clone)]
pub struct Snapshot {
    facility: String,
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
    racks: HashMap<String, RackEntry>,
    /// device name key -> (rack key, occupant index)
    devices: HashMap<String, Vec<(String, usize)>>,
}

impl Snapshot {
    /// Generation-0 snapshot with no racks
    pub fn empty(facility: impl Into<String>) -> Self {
        Self {
            facility: facility.into(),
            generation: 0,
            fetched_at: None,
            racks: HashMap::new(),
            devices: HashMap::new(),
        }
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Case-insensitive rack lookup
    pub fn lookup_rack(&self, name: &str) -> Option<&Rack> {
        self.racks.get(&name_key(name)).map(|entry| &entry.rack)
    }

    /// Occupants of a rack ordered by start position. Empty for unknown racks.
    pub fn occupants(&self, rack_name: &str) -> &[Occupant] {
        self.racks
            .get(&name_key(rack_name))
            .map(|entry| entry.occupants.as_slice())
            .unwrap_or(&[])
    }

    /// Racks sorted by name
    pub fn racks(&self) -> Vec<&Rack> {
        let mut racks: Vec<&Rack> = self.racks.values().map(|entry| &entry.rack).collect();
        racks.sort_by(|a, b| a.name.cmp(&b.name));
        racks
    }

    pub fn rack_count(&self) -> usize {
        self.racks.len()
    }

    pub fn occupant_count(&self) -> usize {
        self.racks.values().map(|entry| entry.occupants.len()).sum()
    }

    /// Every device with this name (case-insensitive), in any rack
    pub fn find_device(&self, name: &str) -> Vec<&Occupant> {
        let Some(locations) = self.devices.get(&name_key(name)) else {
            return Vec::new();
        };
        locations
            .iter()
            .filter_map(|(rack_key, idx)| {
                self.racks
                    .get(rack_key)
                    .and_then(|entry| entry.occupants.get(*idx))
            })
            .collect()
    }

    pub fn issues_for_rack(&self, rack_name: &str) -> &[ConsistencyIssue] {
        self.racks
            .get(&name_key(rack_name))
            .map(|entry| entry.issues.as_slice())
            .unwrap_or(&[])
    }

    /// All consistency issues, grouped by rack name
    pub fn consistency_issues(&self) -> Vec<&ConsistencyIssue> {
        let mut entries: Vec<&RackEntry> = self.racks.values().collect();
        entries.sort_by(|a, b| a.rack.name.cmp(&b.rack.name));
        entries.iter().flat_map(|entry| entry.issues.iter()).collect()
    }
}

/// Builds a [`Snapshot`] from fetched facility data, re-checking the
/// fetch contract on the way in.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    pub fn build(self, data: FacilityData) -> Snapshot {
        let FacilityData {
            facility,
            racks,
            occupants,
        } = data;

        let mut entries: HashMap<String, RackEntry> = HashMap::with_capacity(racks.len());
        for record in racks {
            let key = name_key(&record.name);
            if entries.contains_key(&key) {
                log::warn!("Duplicate rack '{}' in facility data; keeping the first", record.name);
                continue;
            }
            entries.insert(
                key,
                RackEntry {
                    rack: Rack {
                        name: record.name,
                        facility: facility.clone(),
                        usable_positions: record.usable_positions,
                        starting_position: record.starting_position,
                    },
                    occupants: Vec::new(),
                    issues: Vec::new(),
                },
            );
        }

        let mut dropped = 0usize;
        for record in occupants {
            let Some(entry) = entries.get_mut(&name_key(&record.rack_name)) else {
                dropped += 1;
                log::debug!(
                    "Dropping device {:?}: rack '{}' is not part of the facility",
                    record.device_name,
                    record.rack_name
                );
                continue;
            };

            let device = record.device_name.clone().unwrap_or_else(|| "unnamed".to_string());
            let Some(range) = PositionRange::from_height(record.position_start, record.height) else {
                entry.issues.push(ConsistencyIssue {
                    rack: entry.rack.name.clone(),
                    device,
                    detail: format!("has zero height at position {}", record.position_start),
                });
                continue;
            };

            if !entry.rack.contains(&range) {
                let bounds = entry
                    .rack
                    .bounds()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "none".to_string());
                entry.issues.push(ConsistencyIssue {
                    rack: entry.rack.name.clone(),
                    device,
                    detail: format!("occupies positions {range} outside usable positions {bounds}"),
                });
            }

            entry.occupants.push(Occupant {
                rack: entry.rack.name.clone(),
                range,
                orientation: record.orientation,
                device_name: record.device_name,
                make: record.make,
                model: record.model,
            });
        }
        if dropped > 0 {
            log::warn!("Dropped {dropped} device(s) that reference unknown racks");
        }

        let mut devices: HashMap<String, Vec<(String, usize)>> = HashMap::new();
        for (key, entry) in entries.iter_mut() {
            entry.occupants.sort_by_key(|occupant| occupant.range.start);
            let overlaps = conflicting_pairs(&entry.rack.name, &entry.occupants);
            entry.issues.extend(overlaps);

            for (idx, occupant) in entry.occupants.iter().enumerate() {
                if let Some(name) = occupant.device_name.as_deref() {
                    devices
                        .entry(name_key(name))
                        .or_default()
                        .push((key.clone(), idx));
                }
            }
        }

        let snapshot = Snapshot {
            facility,
            generation: self.generation,
            fetched_at: self.fetched_at,
            racks: entries,
            devices,
        };

        let issues = snapshot.consistency_issues();
        for issue in &issues {
            log::warn!("Inconsistent inventory data: {issue}");
        }
        log::info!(
            "Built snapshot generation {} for '{}': {} racks, {} devices, {} consistency issue(s)",
            snapshot.generation,
            snapshot.facility,
            snapshot.rack_count(),
            snapshot.occupant_count(),
            issues.len()
        );

        snapshot
    }
}

/// Occupant pairs that physically cannot coexist. Input must be sorted by start.
fn conflicting_pairs(rack: &str, occupants: &[Occupant]) -> Vec<ConsistencyIssue> {
    let mut issues = Vec::new();
    for (i, first) in occupants.iter().enumerate() {
        for second in &occupants[i + 1..] {
            if second.range.start > first.range.end {
                break;
            }
            if first.collides_with(&second.range, second.orientation) {
                issues.push(ConsistencyIssue {
                    rack: rack.to_string(),
                    device: first.display_name().to_string(),
                    detail: format!(
                        "at positions {} [{}] collides with {} at positions {}",
                        first.range,
                        first.orientation,
                        second.label(),
                        second.range
                    ),
                });
            }
        }
    }
    issues
}
