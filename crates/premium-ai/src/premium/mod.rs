//! Applicant feature encoding and age-routed premium inference.
//!
//! A record is encoded into a fixed 18-column [`FeatureRow`], rescaled by the scaler bundle of its
//! [`AgeCohort`], and scored by that cohort's model. Artifacts are loaded once into
//! [`PremiumArtifacts`] and shared read-only by every [`PremiumPredictor`].

pub mod artifacts;
pub mod batch;
pub mod domain;
mod encoder;
mod predictor;
pub mod risk;
pub mod router;
mod scaling;

#[cfg(test)]
mod tests;

pub use artifacts::{
    ArtifactError, CohortArtifacts, FittedModel, FittedScaler, PremiumArtifacts, ScalerBundle,
};
pub use batch::BatchError;
pub use domain::{
    AgeCohort, ApplicantRecord, FeatureRow, FEATURE_COLUMNS, FEATURE_COUNT,
    TRANSIENT_SCALING_COLUMN, YOUNG_AGE_CUTOFF,
};
pub use encoder::{encode_features, insurance_plan_ordinal};
pub use predictor::{PredictionError, PredictionOutcome, PremiumPredictor, ValidationMode};
pub use risk::normalized_risk;
pub use router::{premium_router, PremiumBatchView, PremiumQuoteView};
pub use scaling::scale_features;
