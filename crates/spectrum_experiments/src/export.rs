//! Result export: CSV rows and a pretty-printed JSON array.

use std::path::Path;

use crate::metrics::ExperimentResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export results to CSV, one row per run with a header row.
///
/// # Errors
///
/// Returns an error if `results` is empty or file creation/writing fails.
pub fn export_to_csv(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Export results to JSON as an array of objects.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::result;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_to_json() {
        let results = vec![result("a", 0.25, 3.0)];
        let file = NamedTempFile::new().unwrap();
        export_to_json(&results, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed[0]["experiment_id"], "a");
        assert_eq!(parsed[0]["sue"], 0.25);
        assert_eq!(parsed[0]["licensing"], "Semi-Dynamic");
    }

    #[test]
    fn test_export_to_csv() {
        let results = vec![result("a", 0.25, 3.0), result("b", 0.5, 1.0)];
        let file = NamedTempFile::new().unwrap();
        export_to_csv(&results, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("experiment_id,run_id,seed,coordination"));
        assert!(header.contains("coordination_cost"));
        assert_eq!(lines.count(), 2);
        assert!(contents.contains("Sub Channels"));
    }

    #[test]
    fn test_export_to_csv_rejects_empty() {
        let file = NamedTempFile::new().unwrap();
        assert!(export_to_csv(&[], file.path()).is_err());
    }
}
