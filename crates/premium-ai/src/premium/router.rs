use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{AgeCohort, ApplicantRecord, FeatureRow};
use super::predictor::PremiumPredictor;
use crate::error::AppError;

/// Router builder exposing the quote endpoints.
pub fn premium_router(predictor: Arc<PremiumPredictor>) -> Router {
    Router::new()
        .route("/api/v1/premium/predict", post(predict_handler))
        .route("/api/v1/premium/predict/batch", post(batch_handler))
        .with_state(predictor)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PredictQuery {
    #[serde(default)]
    pub(crate) explain: bool,
}

/// Response body for a single quote.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumQuoteView {
    pub premium: i64,
    pub cohort: AgeCohort,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PremiumBatchView {
    pub premiums: Vec<i64>,
}

pub(crate) async fn predict_handler(
    State(predictor): State<Arc<PremiumPredictor>>,
    Query(query): Query<PredictQuery>,
    Json(record): Json<ApplicantRecord>,
) -> Result<Json<PremiumQuoteView>, AppError> {
    let outcome = predictor.evaluate(&record)?;
    Ok(Json(PremiumQuoteView {
        premium: outcome.premium,
        cohort: outcome.cohort,
        features: query.explain.then_some(outcome.features),
    }))
}

pub(crate) async fn batch_handler(
    State(predictor): State<Arc<PremiumPredictor>>,
    Json(records): Json<Vec<ApplicantRecord>>,
) -> Result<Json<PremiumBatchView>, AppError> {
    let premiums = predictor.predict_batch(&records)?;
    Ok(Json(PremiumBatchView { premiums }))
}
