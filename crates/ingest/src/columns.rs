use rackguard_validator::RowField;

/// Header spellings accepted for each field, matched case-insensitively.
/// Earlier aliases win when a file carries more than one.
pub const COLUMN_ALIASES: [(RowField, &[&str]); 10] = [
    (RowField::RackName, &["rack", "rack_location", "rack_name", "rack_id"]),
    (RowField::Position, &["ru_position", "ru", "position", "ru_pos", "u_position"]),
    (RowField::Height, &["ru_height", "height", "u_height", "device_height", "size"]),
    (RowField::Make, &["make", "manufacturer", "mfg", "vendor"]),
    (RowField::Model, &["model", "model_number", "device_type", "type"]),
    (RowField::DeviceName, &["hostname", "name", "device_name", "host", "friendly_name"]),
    (RowField::Orientation, &["face", "orientation", "side", "rack_face"]),
    (RowField::DeviceRole, &["device_role", "role", "device_type_role", "function"]),
    (RowField::Status, &["status", "device_status", "state", "operational_status"]),
    (RowField::Facility, &["site", "site_name", "location_site", "facility"]),
];

/// Columns without which no placement can be read
pub const REQUIRED_COLUMNS: [RowField; 3] =
    [RowField::RackName, RowField::Position, RowField::Height];

/// Resolved header positions for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(RowField, usize)>,
}

impl ColumnMap {
    pub fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|header| header.trim().to_lowercase())
            .collect();

        let columns = COLUMN_ALIASES
            .iter()
            .filter_map(|(field, aliases)| {
                aliases
                    .iter()
                    .find_map(|alias| normalized.iter().position(|header| header == alias))
                    .map(|idx| (*field, idx))
            })
            .collect();
        Self { columns }
    }

    pub fn index_of(&self, field: RowField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, idx)| *idx)
    }

    pub fn missing_required(&self) -> Vec<RowField> {
        REQUIRED_COLUMNS
            .into_iter()
            .filter(|field| self.index_of(*field).is_none())
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = (RowField, usize)> + '_ {
        self.columns.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_match_case_insensitively() {
        let map = ColumnMap::resolve(["Rack_Location", " RU ", "Size", "Hostname"]);
        assert_eq!(map.index_of(RowField::RackName), Some(0));
        assert_eq!(map.index_of(RowField::Position), Some(1));
        assert_eq!(map.index_of(RowField::Height), Some(2));
        assert_eq!(map.index_of(RowField::DeviceName), Some(3));
        assert!(map.missing_required().is_empty());
    }

    #[test]
    fn earlier_alias_wins() {
        let map = ColumnMap::resolve(["name", "hostname"]);
        assert_eq!(map.index_of(RowField::DeviceName), Some(1));
    }

    #[test]
    fn reports_missing_placement_columns() {
        let map = ColumnMap::resolve(["rack", "hostname"]);
        assert_eq!(
            map.missing_required(),
            vec![RowField::Position, RowField::Height]
        );
    }
}
