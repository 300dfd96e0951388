use crate::metrics::ExperimentResult;

pub(crate) fn export_to_csv_impl(
    results: &[ExperimentResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    // Header comes from the serialized field names.
    let mut wtr = csv::Writer::from_writer(file);
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}
