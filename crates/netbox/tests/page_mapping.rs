use pretty_assertions::assert_eq;
use rackguard_netbox::models::{self, Device, Page, Rack};
use rackguard_snapshot::{FacilityData, Orientation, SnapshotBuilder};

const RACKS: &str = r#"{
  "count": 2,
  "next": null,
  "results": [
    {"id": 1, "name": "A1", "u_height": 42, "starting_unit": 1},
    {"id": 2, "name": "A2", "u_height": 48}
  ]
}"#;

const DEVICES: &str = r#"{
  "count": 4,
  "next": "https://nb.example.com/api/dcim/devices/?limit=1000&offset=1000&site_id=9",
  "results": [
    {
      "id": 10, "name": "sw1",
      "rack": {"id": 1, "name": "A1"}, "position": 40.0,
      "face": {"value": "front", "label": "Front"},
      "device_type": {"model": "7050", "u_height": 1.0, "manufacturer": {"name": "Arista"}}
    },
    {
      "id": 11, "name": "pdu1",
      "rack": {"id": 1, "name": "A1"}, "position": 40.0,
      "face": {"value": "rear", "label": "Rear"},
      "device_type": {"model": "PDU", "u_height": 1.0}
    },
    {
      "id": 12, "name": "blade3",
      "rack": {"id": 2, "name": "A2"}, "position": null,
      "device_type": {"u_height": 0.0}
    },
    {
      "id": 13, "name": "srv9",
      "rack": {"id": 2, "name": "A2"}, "position": 10.5,
      "face": null,
      "device_type": {"u_height": 2.0, "is_full_depth": true}
    }
  ]
}"#;

#[test]
fn site_pages_build_a_consistent_snapshot() {
    let racks: Page<Rack> = serde_json::from_str(RACKS).unwrap();
    let devices: Page<Device> = serde_json::from_str(DEVICES).unwrap();
    assert!(devices.next.is_some());

    let data = FacilityData {
        facility: "dc1".to_string(),
        racks: racks.results.into_iter().map(models::rack_record).collect(),
        occupants: devices
            .results
            .into_iter()
            .filter_map(models::occupant_record)
            .collect(),
    };
    assert_eq!(data.occupants.len(), 3);

    let snapshot = SnapshotBuilder::new().generation(1).build(data);
    assert_eq!(snapshot.rack_count(), 2);
    assert!(snapshot.consistency_issues().is_empty());

    let a1 = snapshot.occupants("A1");
    assert_eq!(a1.len(), 2);
    assert_eq!(a1[0].orientation, Orientation::Front);
    assert_eq!(a1[1].orientation, Orientation::Rear);

    let srv = snapshot.find_device("SRV9");
    assert_eq!(srv.len(), 1);
    assert_eq!(srv[0].range.to_string(), "10-12");
    assert_eq!(srv[0].orientation, Orientation::Full);
}
