use std::io::{Read, Write};
use std::path::Path;

use super::domain::ApplicantRecord;

/// Header row accepted by [`parse_records`], in quote form order.
pub const RECORD_HEADERS: [&str; 12] = [
    "Age",
    "Gender",
    "Region",
    "Marital Status",
    "BMI Category",
    "Smoking Status",
    "Employment Status",
    "Insurance Plan",
    "Number of Dependants",
    "Income in Lakhs",
    "Genetical Risk",
    "Medical History",
];

/// Column appended by [`write_premiums`].
pub const PREMIUM_HEADER: &str = "Predicted Premium";

/// Read applicant records from CSV whose headers use the quote form field names.
///
/// Empty cells are treated as unanswered fields. Unknown headers are ignored.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<ApplicantRecord>().enumerate() {
        let record = row.map_err(|source| BatchError::Row {
            line: index + 2,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn parse_path(path: impl AsRef<Path>) -> Result<Vec<ApplicantRecord>, BatchError> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_records(file)
}

/// Write each record back out with its premium as a trailing column.
pub fn write_premiums<W: Write>(
    writer: W,
    records: &[ApplicantRecord],
    premiums: &[i64],
) -> Result<(), BatchError> {
    if records.len() != premiums.len() {
        return Err(BatchError::LengthMismatch {
            records: records.len(),
            premiums: premiums.len(),
        });
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(RECORD_HEADERS.iter().copied().chain([PREMIUM_HEADER]))
        .map_err(BatchError::Write)?;

    for (record, premium) in records.iter().zip(premiums) {
        let mut cells = record_cells(record);
        cells.push(premium.to_string());
        csv_writer.write_record(&cells).map_err(BatchError::Write)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn record_cells(record: &ApplicantRecord) -> Vec<String> {
    fn number(value: Option<f64>) -> String {
        value.map(|value| value.to_string()).unwrap_or_default()
    }
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }

    vec![
        number(record.age),
        text(&record.gender),
        text(&record.region),
        text(&record.marital_status),
        text(&record.bmi_category),
        text(&record.smoking_status),
        text(&record.employment_status),
        text(&record.insurance_plan),
        number(record.number_of_dependants),
        number(record.income_lakhs),
        number(record.genetical_risk),
        text(&record.medical_history),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant row on line {line}: {source}")]
    Row { line: usize, source: csv::Error },
    #[error("failed to write scored batch: {0}")]
    Write(csv::Error),
    #[error("{records} records but {premiums} premiums")]
    LengthMismatch { records: usize, premiums: usize },
}
