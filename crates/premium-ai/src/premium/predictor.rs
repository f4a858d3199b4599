use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::artifacts::{ArtifactError, PremiumArtifacts};
use super::domain::{AgeCohort, ApplicantRecord, FeatureRow, FEATURE_COLUMNS};
use super::encoder::encode_features;
use super::scaling::scale_features;

/// How incomplete or out-of-range records are handled before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Missing answers take their encoding defaults.
    #[default]
    Permissive,
    /// Numeric answers must be present, finite and non-negative.
    Strict,
}

/// Encodes, scales and scores applicant records against the loaded artifacts.
#[derive(Debug, Clone)]
pub struct PremiumPredictor {
    artifacts: Arc<PremiumArtifacts>,
    validation: ValidationMode,
}

/// Predicted premium together with the routing decision and the scaled model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub premium: i64,
    pub cohort: AgeCohort,
    pub features: FeatureRow,
}

impl PremiumPredictor {
    pub fn new(artifacts: Arc<PremiumArtifacts>) -> Self {
        Self {
            artifacts,
            validation: ValidationMode::default(),
        }
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    pub fn artifacts(&self) -> &PremiumArtifacts {
        &self.artifacts
    }

    /// Encode `record` and rescale it with the cohort scaler picked from the encoded age.
    pub fn preprocess(&self, record: &ApplicantRecord) -> Result<FeatureRow, PredictionError> {
        let row = encode_features(record);
        scale_features(&self.artifacts, row.age(), row)
    }

    /// Predicted premium for one applicant.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<i64, PredictionError> {
        self.evaluate(record).map(|outcome| outcome.premium)
    }

    pub fn evaluate(&self, record: &ApplicantRecord) -> Result<PredictionOutcome, PredictionError> {
        if self.validation == ValidationMode::Strict {
            validate_strict(record)?;
        }

        let features = self.preprocess(record)?;

        // Model choice is re-derived from the record rather than carried over from scaling.
        let cohort = AgeCohort::for_age(record.routing_age());
        let model = self.artifacts.model(cohort);
        let outputs = model.predict(&FEATURE_COLUMNS, &[features.values().to_vec()])?;
        let raw = outputs
            .first()
            .copied()
            .ok_or(PredictionError::EmptyOutput { stage: "model" })?;
        if !raw.is_finite() {
            return Err(PredictionError::NonFiniteOutput(raw));
        }
        let premium = truncate_premium(raw)?;
        debug!(cohort = cohort.label(), premium, "premium predicted");

        Ok(PredictionOutcome {
            premium,
            cohort,
            features,
        })
    }

    /// Score records in order, stopping at the first failure.
    pub fn predict_batch(&self, records: &[ApplicantRecord]) -> Result<Vec<i64>, PredictionError> {
        records.iter().map(|record| self.predict(record)).collect()
    }
}

// i64::MAX is not representable as f64; 2^63 is the first value past it.
const PREMIUM_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn truncate_premium(raw: f64) -> Result<i64, PredictionError> {
    let truncated = raw.trunc();
    if truncated < i64::MIN as f64 || truncated >= PREMIUM_UPPER_BOUND {
        return Err(PredictionError::OutputOutOfRange(raw));
    }
    Ok(truncated as i64)
}

fn validate_strict(record: &ApplicantRecord) -> Result<(), PredictionError> {
    let numeric = [
        ("Age", record.age),
        ("Number of Dependants", record.number_of_dependants),
        ("Income in Lakhs", record.income_lakhs),
        ("Genetical Risk", record.genetical_risk),
    ];

    for (field, value) in numeric {
        let reason = match value {
            None => "is required",
            Some(value) if !value.is_finite() => "must be a finite number",
            Some(value) if value < 0.0 => "must not be negative",
            Some(_) => continue,
        };
        warn!(field, reason, "rejecting applicant record");
        return Err(PredictionError::InvalidRecord {
            field,
            reason: reason.to_string(),
        });
    }
    Ok(())
}

/// Errors raised while scoring a record.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("field '{field}' {reason}")]
    InvalidRecord { field: &'static str, reason: String },
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("column '{0}' is not available for scaling")]
    UnknownColumn(String),
    #[error("{stage} returned no output")]
    EmptyOutput { stage: &'static str },
    #[error("model produced a non-finite premium ({0})")]
    NonFiniteOutput(f64),
    #[error("model premium {0} does not fit in a 64-bit integer")]
    OutputOutOfRange(f64),
}
