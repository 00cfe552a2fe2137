use crate::error::Result;
use chrono::{DateTime, Utc};
use rackguard_snapshot::ConsistencyIssue;
use rackguard_validator::{
    Classification, HardFail, ImportStatus, InputRow, PositionStatus, Report, ReportFilter,
    Summary, ValidationResult,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` selects JSON; every other extension gets CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Flat row layout, one line per result
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    row_number: usize,
    position_status: PositionStatus,
    import_status: ImportStatus,
    classification: Classification,
    site: &'a str,
    rack: &'a str,
    position: String,
    height: String,
    face: &'static str,
    device_name: &'a str,
    device_role: &'a str,
    status: &'a str,
    manufacturer: &'a str,
    model: &'a str,
    evidence: String,
    missing_fields: String,
    recommendation: &'static str,
}

impl<'a> From<&'a ValidationResult> for CsvRecord<'a> {
    fn from(result: &'a ValidationResult) -> Self {
        let row = &result.row;
        Self {
            row_number: row_number(row),
            position_status: result.position_status,
            import_status: result.import_status,
            classification: result.classification,
            site: row.facility.as_deref().unwrap_or(""),
            rack: row.rack_name.as_deref().unwrap_or(""),
            position: row.position.as_ref().map(ToString::to_string).unwrap_or_default(),
            height: row.height.as_ref().map(ToString::to_string).unwrap_or_default(),
            face: row.orientation.as_str(),
            device_name: row.device_name.as_deref().unwrap_or(""),
            device_role: row.device_role.as_deref().unwrap_or(""),
            status: row.status.as_deref().unwrap_or(""),
            manufacturer: row.make.as_deref().unwrap_or(""),
            model: row.model.as_deref().unwrap_or(""),
            evidence: result.evidence.join("; "),
            missing_fields: result.missing_fields.join(", "),
            recommendation: result.recommendation(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonResult<'a> {
    row_number: usize,
    position_status: PositionStatus,
    import_status: ImportStatus,
    classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    hard_fail: Option<HardFail>,
    pre_existing: bool,
    existing_device: Option<&'a str>,
    missing_fields: &'a [String],
    evidence: &'a [String],
    recommendation: &'static str,
    row: &'a InputRow,
}

impl<'a> From<&'a ValidationResult> for JsonResult<'a> {
    fn from(result: &'a ValidationResult) -> Self {
        Self {
            row_number: row_number(&result.row),
            position_status: result.position_status,
            import_status: result.import_status,
            classification: result.classification,
            hard_fail: result.hard_fail,
            pre_existing: result.pre_existing,
            existing_device: result.existing_device.as_deref(),
            missing_fields: &result.missing_fields,
            evidence: &result.evidence,
            recommendation: result.recommendation(),
            row: &result.row,
        }
    }
}

/// `summary` and `anomalies` always cover the whole pass; `results` honours
/// the filter.
#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    generated_at: DateTime<Utc>,
    facility: &'a str,
    snapshot_generation: u64,
    summary: &'a Summary,
    anomalies: &'a [ConsistencyIssue],
    results: Vec<JsonResult<'a>>,
}

fn row_number(row: &InputRow) -> usize {
    row.source_line.unwrap_or(row.index + 1)
}

/// Write the filtered report to `path`, picking the format from the
/// extension. Returns the number of results written.
pub fn export_report(report: &Report, filter: ReportFilter, path: &Path) -> Result<usize> {
    let format = ExportFormat::from_path(path);
    let results = report.filtered(filter);
    let writer = BufWriter::new(File::create(path)?);

    match format {
        ExportFormat::Csv => write_csv(&results, writer)?,
        ExportFormat::Json => write_json(report, &results, writer)?,
    }
    log::info!(
        "Exported {} of {} result(s) to {} ({:?})",
        results.len(),
        report.results.len(),
        path.display(),
        format
    );
    Ok(results.len())
}

pub fn write_csv<W: Write>(results: &[&ValidationResult], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for result in results {
        csv.serialize(CsvRecord::from(*result))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(
    report: &Report,
    results: &[&ValidationResult],
    mut writer: W,
) -> Result<()> {
    let document = JsonDocument {
        generated_at: Utc::now(),
        facility: &report.facility,
        snapshot_generation: report.snapshot_generation,
        summary: &report.summary,
        anomalies: &report.anomalies,
        results: results.iter().map(|result| JsonResult::from(*result)).collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
