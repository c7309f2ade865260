//! JSON profile output writer.
//!
//! Writes [`ReportData`] structures to JSON files with proper formatting.

use crate::report::schema::ReportData;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - path cannot be created or is invalid
pub fn write_report_data(
    report: &ReportData,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing JSON profile to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!("JSON profile written successfully");
    Ok(())
}

/// Serialize a report to a pretty-printed JSON string
pub fn report_data_to_string(report: &ReportData) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Read a report from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - file read error
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report_data(input_path: impl AsRef<Path>) -> Result<ReportData, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading JSON profile from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: ReportData =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Profile loaded: version {}, {} groups",
        report.version,
        report.groups.len()
    );

    Ok(report)
}

/// Validate that output path is writable
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::DurationDistribution;
    use crate::report::schema::GroupSummary;
    use tempfile::NamedTempFile;

    fn create_test_report() -> ReportData {
        ReportData {
            version: "1.0.0".to_string(),
            title: "Test Report".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            totals: DurationDistribution::default(),
            groups: vec![GroupSummary {
                text: "SELECT 1".to_string(),
                count: 2,
                min_seconds: 0.1,
                max_seconds: 0.3,
                mean_seconds: 0.2,
                sum_seconds: 0.4,
                distinct_call_sites: 1,
            }],
            slowest: Vec::new(),
        }
    }

    #[test]
    fn test_write_and_read_report() {
        let report = create_test_report();
        let temp_file = NamedTempFile::new().unwrap();

        write_report_data(&report, temp_file.path()).unwrap();
        let loaded = read_report_data(temp_file.path()).unwrap();

        assert_eq!(loaded.version, report.version);
        assert_eq!(loaded.groups.len(), 1);
        assert_eq!(loaded.groups[0].text, "SELECT 1");
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/profile.json");

        write_report_data(&create_test_report(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
