//! Wire shapes of the NetBox REST API, reduced to the fields placement
//! checks read, and their mapping onto snapshot records.

use rackguard_snapshot::{OccupantRecord, Orientation, RackRecord};
use serde::Deserialize;

const DEFAULT_RACK_HEIGHT: u32 = 42;
const DEFAULT_STARTING_UNIT: i64 = 1;
const DEFAULT_DEVICE_HEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rack {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub u_height: Option<u32>,
    #[serde(default)]
    pub starting_unit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceType {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub u_height: Option<f64>,
    #[serde(default)]
    pub manufacturer: Option<NestedRef>,
    #[serde(default)]
    pub is_full_depth: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rack: Option<NestedRef>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub face: Option<Choice>,
    #[serde(default)]
    pub device_type: Option<DeviceType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(rename = "netbox-version", default)]
    pub netbox_version: Option<String>,
}

pub fn rack_record(rack: Rack) -> RackRecord {
    RackRecord {
        name: rack.name,
        usable_positions: rack.u_height.unwrap_or(DEFAULT_RACK_HEIGHT),
        starting_position: rack.starting_unit.unwrap_or(DEFAULT_STARTING_UNIT),
    }
}

/// Devices without a rack slot (unracked, child devices, zero-U) occupy no
/// positions and map to `None`.
///
/// Half-unit positions and heights are widened to the whole units the
/// device touches.
pub fn occupant_record(device: Device) -> Option<OccupantRecord> {
    let rack_name = device.rack.and_then(|rack| rack.name)?;
    let position = device.position?;
    let device_type = device.device_type;

    let u_height = device_type
        .as_ref()
        .and_then(|device_type| device_type.u_height)
        .unwrap_or(DEFAULT_DEVICE_HEIGHT);
    if !u_height.is_finite() || u_height <= 0.0 || !position.is_finite() {
        log::debug!(
            "Device {} ({:?}) takes no rack units; skipped",
            device.id,
            device.name
        );
        return None;
    }

    let start = position.floor();
    let end = (position + u_height).ceil() - 1.0;
    let span = (end - start + 1.0).max(1.0);
    if span > f64::from(u32::MAX) {
        log::warn!(
            "Device {} ({:?}) claims {u_height} rack units; skipped",
            device.id,
            device.name
        );
        return None;
    }
    let height = span as u32;

    let orientation = if device_type
        .as_ref()
        .and_then(|device_type| device_type.is_full_depth)
        .unwrap_or(false)
    {
        Orientation::Full
    } else {
        device
            .face
            .as_ref()
            .and_then(|face| Orientation::parse(&face.value))
            .unwrap_or(Orientation::Full)
    };

    let (make, model) = match device_type {
        Some(device_type) => (
            device_type.manufacturer.and_then(|manufacturer| manufacturer.name),
            device_type.model,
        ),
        None => (None, None),
    };

    Some(OccupantRecord {
        rack_name,
        position_start: start as i64,
        height,
        orientation,
        device_name: device.name,
        make,
        model,
    })
}
