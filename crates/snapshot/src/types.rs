use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mounting face of a device in a rack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Front,
    Rear,
    /// Full-depth: occupies both faces
    #[default]
    Full,
}

impl Orientation {
    /// Two mounts collide when they share a face or either one is full-depth.
    pub fn conflicts_with(self, other: Orientation) -> bool {
        self == Orientation::Full || other == Orientation::Full || self == other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Front => "front",
            Orientation::Rear => "rear",
            Orientation::Full => "full",
        }
    }

    /// Parse the spellings found in spreadsheets and inventory exports.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" | "f" | "fnt" => Some(Orientation::Front),
            "rear" | "r" | "back" | "bck" => Some(Orientation::Rear),
            "full" | "both" | "full-depth" | "full_depth" => Some(Orientation::Full),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::parse(s).ok_or_else(|| format!("unknown orientation: {s}"))
    }
}

/// Inclusive range of rack positions `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub start: i64,
    pub end: i64,
}

impl PositionRange {
    /// Range covering `height` units starting at `start`. `None` for zero height.
    pub fn from_height(start: i64, height: u32) -> Option<Self> {
        if height == 0 {
            return None;
        }
        Some(Self {
            start,
            end: start.saturating_add(i64::from(height) - 1),
        })
    }

    pub fn overlaps(&self, other: &PositionRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains_range(&self, other: &PositionRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn height(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }
}

impl fmt::Display for PositionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A rack as known to the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub name: String,
    pub facility: String,
    /// Number of usable positions (rack height in units)
    pub usable_positions: u32,
    /// Index of the lowest position, usually 1
    pub starting_position: i64,
}

impl Rack {
    /// Usable span of the rack, `None` for a rack without positions.
    pub fn bounds(&self) -> Option<PositionRange> {
        PositionRange::from_height(self.starting_position, self.usable_positions)
    }

    pub fn contains(&self, range: &PositionRange) -> bool {
        self.bounds()
            .map(|bounds| bounds.contains_range(range))
            .unwrap_or(false)
    }
}

/// A device mounted in a rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Name of the owning rack
    pub rack: String,
    pub range: PositionRange,
    pub orientation: Orientation,
    pub device_name: Option<String>,
    /// Manufacturer name
    pub make: Option<String>,
    /// Device type model
    pub model: Option<String>,
}

impl Occupant {
    pub fn display_name(&self) -> &str {
        self.device_name.as_deref().unwrap_or("unnamed")
    }

    /// `name [orientation]`, the form used in evidence text
    pub fn label(&self) -> String {
        format!("{} [{}]", self.display_name(), self.orientation)
    }

    pub fn collides_with(&self, range: &PositionRange, orientation: Orientation) -> bool {
        self.range.overlaps(range) && self.orientation.conflicts_with(orientation)
    }
}

/// Invariant violation found in fetched data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub rack: String,
    pub device: String,
    pub detail: String,
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rack {}: device '{}' {}", self.rack, self.device, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_and_rear_share_space() {
        assert!(!Orientation::Front.conflicts_with(Orientation::Rear));
        assert!(!Orientation::Rear.conflicts_with(Orientation::Front));
        assert!(Orientation::Front.conflicts_with(Orientation::Front));
        assert!(Orientation::Rear.conflicts_with(Orientation::Rear));
    }

    #[test]
    fn full_depth_collides_with_everything() {
        for other in [Orientation::Front, Orientation::Rear, Orientation::Full] {
            assert!(Orientation::Full.conflicts_with(other));
            assert!(other.conflicts_with(Orientation::Full));
        }
    }

    #[test]
    fn orientation_aliases() {
        assert_eq!(Orientation::parse(" F "), Some(Orientation::Front));
        assert_eq!(Orientation::parse("back"), Some(Orientation::Rear));
        assert_eq!(Orientation::parse("Full-Depth"), Some(Orientation::Full));
        assert_eq!(Orientation::parse("sideways"), None);
    }

    #[test]
    fn range_overlap_is_inclusive() {
        let a = PositionRange::from_height(5, 2).unwrap();
        let b = PositionRange::from_height(6, 4).unwrap();
        let c = PositionRange::from_height(7, 1).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert_eq!(a.to_string(), "5-6");
        assert_eq!(c.to_string(), "7");
        assert!(PositionRange::from_height(1, 0).is_none());
    }

    #[test]
    fn rack_bounds_respect_starting_position() {
        let rack = Rack {
            name: "A1".into(),
            facility: "dc1".into(),
            usable_positions: 42,
            starting_position: 1,
        };
        assert!(rack.contains(&PositionRange::from_height(41, 2).unwrap()));
        assert!(!rack.contains(&PositionRange::from_height(42, 2).unwrap()));
        assert!(!rack.contains(&PositionRange::from_height(0, 1).unwrap()));

        let offset = Rack {
            starting_position: 10,
            usable_positions: 4,
            ..rack
        };
        assert!(offset.contains(&PositionRange::from_height(10, 4).unwrap()));
        assert!(!offset.contains(&PositionRange::from_height(9, 1).unwrap()));
    }
}
