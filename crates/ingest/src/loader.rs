use crate::columns::ColumnMap;
use crate::error::{IngestError, Result};
use crate::normalize;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use rackguard_snapshot::Orientation;
use rackguard_validator::{InputRow, RowField};
use std::borrow::Cow;
use std::path::Path;

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Rows read from one CSV document
#[derive(Debug, Clone, Default)]
pub struct LoadedCsv {
    pub rows: Vec<InputRow>,
    /// Cells that were present but could not be read
    pub warnings: Vec<String>,
    pub delimiter: u8,
    pub encoding: &'static str,
}

/// Turns spreadsheet exports into [`InputRow`]s.
///
/// Headers are matched through [`crate::COLUMN_ALIASES`]; the raw column
/// names never leave this type.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    delimiter: Option<u8>,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the delimiter instead of detecting it from the header line
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn load_path(&self, path: &Path) -> Result<LoadedCsv> {
        if !path.exists() {
            return Err(IngestError::NotFound(path.to_path_buf()));
        }
        log::debug!("Loading CSV from {}", path.display());
        let bytes = std::fs::read(path)?;
        let loaded = self.load_bytes(&bytes)?;
        log::info!(
            "Loaded {} row(s) from {} ({} warning(s))",
            loaded.rows.len(),
            path.display(),
            loaded.warnings.len()
        );
        Ok(loaded)
    }

    /// UTF-8 with or without BOM; anything else is read as Windows-1252.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedCsv> {
        let (content, encoding) = decode(bytes);
        if encoding != UTF_8 {
            log::warn!("Input is not valid UTF-8; decoded as {}", encoding.name());
        }
        let mut loaded = self.load_str(&content)?;
        loaded.encoding = encoding.name();
        Ok(loaded)
    }

    pub fn load_str(&self, content: &str) -> Result<LoadedCsv> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(IngestError::NoHeaders);
        }

        let columns = ColumnMap::resolve(headers.iter());
        let missing = columns.missing_required();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                missing: missing.iter().map(|field| field.as_str().to_string()).collect(),
                found: headers.iter().map(str::to_string).collect(),
            });
        }

        let mut loaded = LoadedCsv {
            delimiter,
            encoding: UTF_8.name(),
            ..LoadedCsv::default()
        };
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or(index + 2);
            let row = read_row(index, line, &columns, &record, &mut loaded.warnings);
            loaded.rows.push(row);
        }
        Ok(loaded)
    }
}

fn read_row(
    index: usize,
    line: usize,
    columns: &ColumnMap,
    record: &StringRecord,
    warnings: &mut Vec<String>,
) -> InputRow {
    let mut row = InputRow::new(index).source_line(line);

    for (field, column) in columns.fields() {
        let raw = record.get(column);
        let Some(value) = normalize::text(raw) else {
            continue;
        };

        row = match field {
            RowField::RackName => row.rack(value),
            RowField::Position | RowField::Height => match normalize::units(&value) {
                Some(units) if field == RowField::Position => row.position_units(units),
                Some(units) => row.height_units(units),
                None => {
                    warnings.push(format!("line {line}: unreadable {field} '{value}'"));
                    row
                }
            },
            RowField::DeviceName => row.device_name(value),
            RowField::Make => row.make(value),
            RowField::Model => row.model(value),
            RowField::DeviceRole => row.device_role(value),
            RowField::Status => match normalize::status(&value) {
                Some(status) => row.status(status),
                None => row,
            },
            RowField::Facility => row.facility(value),
            RowField::Orientation => match Orientation::parse(&value) {
                Some(orientation) => row.orientation(orientation),
                None => {
                    warnings.push(format!(
                        "line {line}: unknown face '{value}', assuming full depth"
                    ));
                    row
                }
            },
        };
    }
    row
}

fn decode(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    let (content, malformed) = UTF_8.decode_with_bom_removal(bytes);
    if !malformed {
        return (content, UTF_8);
    }
    let (content, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    (content, WINDOWS_1252)
}

/// Most frequent of `,` `;` and tab in the header line; comma on a tie.
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let mut best = (b',', 0usize);
    for candidate in DELIMITERS {
        let count = header.bytes().filter(|byte| *byte == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rackguard_validator::UnitValue;

    #[test]
    fn detects_delimiter_from_header() {
        assert_eq!(detect_delimiter("rack;ru;height\nA1;1;2"), b';');
        assert_eq!(detect_delimiter("rack\tru\theight"), b'\t');
        assert_eq!(detect_delimiter("rack,ru,height"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn latin1_bytes_fall_back_to_windows_1252() {
        let bytes = b"rack,ru,height,hostname\nA1,1,1,caf\xe9\n";
        let loaded = CsvLoader::new().load_bytes(bytes).unwrap();
        assert_eq!(loaded.encoding, "windows-1252");
        assert_eq!(loaded.rows[0].device_name.as_deref(), Some("caf\u{e9}"));
    }

    #[test]
    fn utf8_bom_is_removed() {
        let bytes = "\u{feff}rack,ru,height\nA1,3,1\n".as_bytes();
        let loaded = CsvLoader::new().load_bytes(bytes).unwrap();
        assert_eq!(loaded.encoding, "UTF-8");
        assert_eq!(loaded.rows[0].rack_name.as_deref(), Some("A1"));
    }

    #[test]
    fn unreadable_cells_become_warnings() {
        let loaded = CsvLoader::new()
            .load_str("rack,ru,height,face\nA1,top,1,sideways\n")
            .unwrap();
        let row = &loaded.rows[0];
        assert_eq!(row.position, None);
        assert_eq!(row.height, Some(UnitValue::Whole(1)));
        assert_eq!(row.orientation, Orientation::Full);
        assert!(!row.presence.contains(RowField::Orientation));
        assert_eq!(loaded.warnings.len(), 2);
        assert!(loaded.warnings[0].starts_with("line 2:"));
    }
}
