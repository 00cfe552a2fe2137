use rackguard_snapshot::Orientation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fields of a normalized input row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    RackName,
    Position,
    Height,
    DeviceName,
    Make,
    Model,
    DeviceRole,
    Status,
    Facility,
    Orientation,
}

impl RowField {
    pub fn as_str(self) -> &'static str {
        match self {
            RowField::RackName => "rack_name",
            RowField::Position => "position",
            RowField::Height => "height",
            RowField::DeviceName => "device_name",
            RowField::Make => "make",
            RowField::Model => "model",
            RowField::DeviceRole => "device_role",
            RowField::Status => "status",
            RowField::Facility => "facility",
            RowField::Orientation => "orientation",
        }
    }
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fields the source actually supplied (as opposed to defaulted)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPresence(BTreeSet<RowField>);

impl FieldPresence {
    pub fn mark(&mut self, field: RowField) {
        self.0.insert(field);
    }

    pub fn contains(&self, field: RowField) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = RowField> + '_ {
        self.0.iter().copied()
    }
}

/// A position or height value. Fractional units are carried, not solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitValue {
    Whole(i64),
    /// Original text of a value with a non-zero fractional part
    Fractional(String),
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitValue::Whole(value) => write!(f, "{value}"),
            UnitValue::Fractional(raw) => f.write_str(raw),
        }
    }
}

/// A normalized placement request.
///
/// Built with the chained setters, which record field presence:
///
/// ```
/// use rackguard_validator::{InputRow, RowField};
///
/// let row = InputRow::new(0).rack("A1").position(5).height(2).device_name("sw1");
/// assert!(row.presence.contains(RowField::DeviceName));
/// assert!(!row.presence.contains(RowField::DeviceRole));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    /// 0-based ordinal within the batch; duplicate tie-break key
    pub index: usize,
    /// Line in the source file, when there is one
    pub source_line: Option<usize>,

    pub rack_name: Option<String>,
    pub position: Option<UnitValue>,
    pub height: Option<UnitValue>,

    pub device_name: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub device_role: Option<String>,
    pub status: Option<String>,
    pub facility: Option<String>,
    /// Defaults to full-depth when not supplied
    pub orientation: Orientation,

    pub presence: FieldPresence,
}

impl InputRow {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            source_line: None,
            rack_name: None,
            position: None,
            height: None,
            device_name: None,
            make: None,
            model: None,
            device_role: None,
            status: None,
            facility: None,
            orientation: Orientation::Full,
            presence: FieldPresence::default(),
        }
    }

    pub fn source_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    pub fn rack(mut self, name: impl Into<String>) -> Self {
        self.rack_name = Some(name.into());
        self.presence.mark(RowField::RackName);
        self
    }

    pub fn position(self, position: i64) -> Self {
        self.position_units(UnitValue::Whole(position))
    }

    pub fn position_units(mut self, value: UnitValue) -> Self {
        self.position = Some(value);
        self.presence.mark(RowField::Position);
        self
    }

    pub fn height(self, height: i64) -> Self {
        self.height_units(UnitValue::Whole(height))
    }

    pub fn height_units(mut self, value: UnitValue) -> Self {
        self.height = Some(value);
        self.presence.mark(RowField::Height);
        self
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self.presence.mark(RowField::DeviceName);
        self
    }

    pub fn make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self.presence.mark(RowField::Make);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self.presence.mark(RowField::Model);
        self
    }

    pub fn device_role(mut self, role: impl Into<String>) -> Self {
        self.device_role = Some(role.into());
        self.presence.mark(RowField::DeviceRole);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self.presence.mark(RowField::Status);
        self
    }

    pub fn facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = Some(facility.into());
        self.presence.mark(RowField::Facility);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self.presence.mark(RowField::Orientation);
        self
    }

    /// Best available human label for the row
    pub fn device_identifier(&self) -> String {
        if let Some(name) = self.device_name.as_deref() {
            return name.to_string();
        }
        match (self.make.as_deref(), self.model.as_deref()) {
            (Some(make), Some(model)) => format!("{make} {model}"),
            _ => format!("row {}", self.index),
        }
    }
}
