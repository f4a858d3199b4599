use tracing::debug;

use super::artifacts::{ArtifactError, PremiumArtifacts, ScalerBundle};
use super::domain::{AgeCohort, FeatureRow, TRANSIENT_SCALING_COLUMN};
use super::predictor::PredictionError;

/// Rescale the bundle columns of `row` with the scaler for `age`'s cohort.
///
/// The persisted scalers were fitted with an `income_level` column that is not a model feature.
/// It is appended as 0 for the transform and dropped before the row is returned.
pub fn scale_features(
    artifacts: &PremiumArtifacts,
    age: f64,
    row: FeatureRow,
) -> Result<FeatureRow, PredictionError> {
    let cohort = AgeCohort::for_age(age);
    let bundle = artifacts.scaler(cohort);
    debug!(cohort = cohort.label(), age, "scaling feature row");

    let mut frame = ScalingFrame::from_row(&row);
    frame.push(TRANSIENT_SCALING_COLUMN, 0.0);
    apply_bundle(bundle, &mut frame)?;
    frame.remove(TRANSIENT_SCALING_COLUMN);

    frame.into_row()
}

fn apply_bundle(bundle: &ScalerBundle, frame: &mut ScalingFrame) -> Result<(), PredictionError> {
    let columns: Vec<&str> = bundle.columns().iter().map(String::as_str).collect();
    let inputs = frame.select(&columns)?;

    let scaled = bundle.scaler().transform(&columns, &[inputs])?;
    let values = scaled
        .into_iter()
        .next()
        .ok_or(PredictionError::EmptyOutput { stage: "scaler" })?;
    if values.len() != columns.len() {
        return Err(ArtifactError::RowWidth {
            expected: columns.len(),
            actual: values.len(),
        }
        .into());
    }

    for (column, value) in columns.iter().zip(values) {
        frame.assign(column, value)?;
    }
    Ok(())
}

/// Named single-row working set used while the transient column is present.
#[derive(Debug)]
struct ScalingFrame {
    columns: Vec<&'static str>,
    values: Vec<f64>,
}

impl ScalingFrame {
    fn from_row(row: &FeatureRow) -> Self {
        let (columns, values) = row.iter().unzip();
        Self { columns, values }
    }

    fn push(&mut self, column: &'static str, value: f64) {
        self.columns.push(column);
        self.values.push(value);
    }

    fn remove(&mut self, column: &str) {
        if let Some(index) = self.position(column) {
            self.columns.remove(index);
            self.values.remove(index);
        }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| *name == column)
    }

    fn select(&self, columns: &[&str]) -> Result<Vec<f64>, PredictionError> {
        columns
            .iter()
            .map(|column| {
                self.position(column)
                    .map(|index| self.values[index])
                    .ok_or_else(|| PredictionError::UnknownColumn(column.to_string()))
            })
            .collect()
    }

    fn assign(&mut self, column: &str, value: f64) -> Result<(), PredictionError> {
        let index = self
            .position(column)
            .ok_or_else(|| PredictionError::UnknownColumn(column.to_string()))?;
        self.values[index] = value;
        Ok(())
    }

    fn into_row(self) -> Result<FeatureRow, PredictionError> {
        let mut row = FeatureRow::zeroed();
        for (column, value) in self.columns.into_iter().zip(self.values) {
            if !row.set(column, value) {
                return Err(PredictionError::UnknownColumn(column.to_string()));
            }
        }
        Ok(row)
    }
}
