use metrics_exporter_prometheus::PrometheusHandle;
use premium_ai::config::AppConfig;
use premium_ai::error::AppError;
use premium_ai::premium::{ApplicantRecord, PremiumArtifacts, PremiumPredictor, ValidationMode};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the configured artifacts once and wrap them in a predictor.
pub(crate) fn load_predictor(
    config: &AppConfig,
    artifact_override: Option<PathBuf>,
    strict: bool,
) -> Result<PremiumPredictor, AppError> {
    let directory = artifact_override.unwrap_or_else(|| config.artifacts.directory.clone());
    let validation = if strict {
        ValidationMode::Strict
    } else {
        config.prediction.validation
    };

    let artifacts = PremiumArtifacts::load(&directory)?;
    info!(directory = %directory.display(), ?validation, "premium predictor initialised");
    Ok(PremiumPredictor::new(Arc::new(artifacts)).with_validation(validation))
}

pub(crate) fn parse_record(raw: &str) -> Result<ApplicantRecord, String> {
    serde_json::from_str(raw).map_err(|err| format!("failed to parse applicant JSON ({err})"))
}
