use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rackguard_snapshot::{
    FacilityData, OccupantRecord, Orientation, RackRecord, Result, SnapshotCache, SnapshotError,
    SnapshotSource,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays a fixed sequence of fetch outcomes.
struct ScriptedSource {
    outcomes: Mutex<VecDeque<Result<FacilityData>>>,
}

impl ScriptedSource {
    fn new(outcomes: Vec<Result<FacilityData>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
        })
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, facility: &str) -> Result<FacilityData> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SnapshotError::FacilityNotFound(facility.to_string())))
    }
}

fn facility(racks: &[(&str, u32)], devices: &[(&str, &str, i64)]) -> FacilityData {
    FacilityData {
        facility: "dc1".to_string(),
        racks: racks
            .iter()
            .map(|(name, usable)| RackRecord {
                name: name.to_string(),
                usable_positions: *usable,
                starting_position: 1,
            })
            .collect(),
        occupants: devices
            .iter()
            .map(|(rack, name, start)| OccupantRecord {
                rack_name: rack.to_string(),
                position_start: *start,
                height: 1,
                orientation: Orientation::Full,
                device_name: Some(name.to_string()),
                make: None,
                model: None,
            })
            .collect(),
    }
}

#[tokio::test]
async fn starts_with_empty_generation_zero() {
    let cache = SnapshotCache::new(ScriptedSource::new(vec![]));
    let active = cache.active();
    assert_eq!(active.generation(), 0);
    assert_eq!(active.rack_count(), 0);
    assert!(cache.age().is_none());
}

#[tokio::test]
async fn successful_refresh_replaces_active_snapshot() {
    let cache = SnapshotCache::new(ScriptedSource::new(vec![
        Ok(facility(&[("A1", 42)], &[])),
        Ok(facility(&[("A1", 42), ("B1", 48)], &[("B1", "sw9", 3)])),
    ]));

    let first = cache.refresh("dc1").await.unwrap();
    assert_eq!(first.generation(), 1);
    assert_eq!(cache.active().rack_count(), 1);

    let second = cache.refresh("dc1").await.unwrap();
    assert_eq!(second.generation(), 2);
    assert_eq!(cache.active().rack_count(), 2);
    assert_eq!(cache.active().occupants("b1").len(), 1);
    assert!(cache.age().is_some());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let cache = SnapshotCache::new(ScriptedSource::new(vec![
        Ok(facility(&[("A1", 42)], &[("A1", "sw1", 5)])),
        Err(SnapshotError::transport("connection reset")),
        Err(SnapshotError::FacilityNotFound("dc1".to_string())),
    ]));

    cache.refresh("dc1").await.unwrap();

    let err = cache.refresh("dc1").await.unwrap_err();
    assert!(err.is_retryable());
    let active = cache.active();
    assert_eq!(active.generation(), 1);
    assert_eq!(active.occupants("A1").len(), 1);

    let err = cache.refresh("dc1").await.unwrap_err();
    assert!(!err.is_retryable());
    assert_eq!(cache.active().generation(), 1);
}

#[tokio::test]
async fn captured_snapshot_survives_later_refresh() {
    let cache = SnapshotCache::new(ScriptedSource::new(vec![
        Ok(facility(&[("A1", 42)], &[("A1", "sw1", 5)])),
        Ok(facility(&[("C7", 10)], &[])),
    ]));

    cache.refresh("dc1").await.unwrap();
    let captured = cache.active();

    cache.refresh("dc1").await.unwrap();

    assert_eq!(captured.generation(), 1);
    assert!(captured.lookup_rack("A1").is_some());
    assert_eq!(captured.occupants("A1")[0].display_name(), "sw1");
    assert!(cache.active().lookup_rack("A1").is_none());
}

#[tokio::test]
async fn generation_does_not_advance_on_failure() {
    let cache = SnapshotCache::new(ScriptedSource::new(vec![
        Err(SnapshotError::transport("timeout")),
        Ok(facility(&[("A1", 42)], &[])),
    ]));

    assert!(cache.refresh("dc1").await.is_err());
    assert_eq!(cache.active().generation(), 0);

    let snapshot = cache.refresh("dc1").await.unwrap();
    assert_eq!(snapshot.generation(), 1);
}
