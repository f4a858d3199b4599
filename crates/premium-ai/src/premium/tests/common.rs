use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::premium::artifacts::{
    ArtifactError, CohortArtifacts, FittedModel, FittedScaler, PremiumArtifacts, ScalerBundle,
};
use crate::premium::domain::ApplicantRecord;
use crate::premium::{premium_router, PremiumPredictor, ValidationMode};

pub(super) const YOUNG_SCALE: f64 = 10.0;
pub(super) const REST_SCALE: f64 = 100.0;
pub(super) const YOUNG_OUTPUT: f64 = 1111.0;
pub(super) const REST_OUTPUT: f64 = 2222.9;

pub(super) fn scaled_columns() -> Vec<String> {
    [
        "age",
        "number_of_dependants",
        "income_level",
        "income_lakhs",
        "insurance_plan",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect()
}

/// Multiplies every value by a fixed factor and remembers the column names it was given.
#[derive(Debug)]
pub(super) struct RecordingScaler {
    factor: f64,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingScaler {
    pub(super) fn new(factor: f64) -> Arc<Self> {
        Arc::new(Self {
            factor,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("scaler mutex poisoned").clone()
    }
}

impl FittedScaler for RecordingScaler {
    fn transform(
        &self,
        columns: &[&str],
        rows: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, ArtifactError> {
        self.calls
            .lock()
            .expect("scaler mutex poisoned")
            .push(columns.iter().map(|column| column.to_string()).collect());
        Ok(rows
            .iter()
            .map(|row| row.iter().map(|value| value * self.factor).collect())
            .collect())
    }
}

/// Returns a constant output and remembers every row it scored.
#[derive(Debug)]
pub(super) struct RecordingModel {
    output: f64,
    columns: Mutex<Vec<Vec<String>>>,
    rows: Mutex<Vec<Vec<f64>>>,
}

impl RecordingModel {
    pub(super) fn new(output: f64) -> Arc<Self> {
        Arc::new(Self {
            output,
            columns: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn rows(&self) -> Vec<Vec<f64>> {
        self.rows.lock().expect("model mutex poisoned").clone()
    }

    pub(super) fn columns(&self) -> Vec<Vec<String>> {
        self.columns.lock().expect("model mutex poisoned").clone()
    }
}

impl FittedModel for RecordingModel {
    fn predict(&self, columns: &[&str], rows: &[Vec<f64>]) -> Result<Vec<f64>, ArtifactError> {
        self.columns
            .lock()
            .expect("model mutex poisoned")
            .push(columns.iter().map(|column| column.to_string()).collect());
        self.rows
            .lock()
            .expect("model mutex poisoned")
            .extend(rows.iter().cloned());
        Ok(vec![self.output; rows.len()])
    }
}

pub(super) struct MockArtifacts {
    pub(super) artifacts: Arc<PremiumArtifacts>,
    pub(super) young_scaler: Arc<RecordingScaler>,
    pub(super) rest_scaler: Arc<RecordingScaler>,
    pub(super) young_model: Arc<RecordingModel>,
    pub(super) rest_model: Arc<RecordingModel>,
}

pub(super) fn mock_artifacts() -> MockArtifacts {
    mock_artifacts_with_outputs(YOUNG_OUTPUT, REST_OUTPUT)
}

pub(super) fn mock_artifacts_with_outputs(young_output: f64, rest_output: f64) -> MockArtifacts {
    let young_scaler = RecordingScaler::new(YOUNG_SCALE);
    let rest_scaler = RecordingScaler::new(REST_SCALE);
    let young_model = RecordingModel::new(young_output);
    let rest_model = RecordingModel::new(rest_output);

    let young = CohortArtifacts {
        scaler: ScalerBundle::new(scaled_columns(), young_scaler.clone())
            .expect("young bundle is valid"),
        model: young_model.clone(),
    };
    let rest = CohortArtifacts {
        scaler: ScalerBundle::new(scaled_columns(), rest_scaler.clone())
            .expect("rest bundle is valid"),
        model: rest_model.clone(),
    };

    MockArtifacts {
        artifacts: Arc::new(PremiumArtifacts::new(young, rest)),
        young_scaler,
        rest_scaler,
        young_model,
        rest_model,
    }
}

pub(super) fn predictor(mock: &MockArtifacts) -> PremiumPredictor {
    PremiumPredictor::new(mock.artifacts.clone())
}

pub(super) fn strict_predictor(mock: &MockArtifacts) -> PremiumPredictor {
    predictor(mock).with_validation(ValidationMode::Strict)
}

pub(super) fn applicant(age: f64) -> ApplicantRecord {
    ApplicantRecord {
        age: Some(age),
        gender: Some("Male".to_string()),
        region: Some("Northwest".to_string()),
        marital_status: Some("Unmarried".to_string()),
        bmi_category: Some("Normal".to_string()),
        smoking_status: Some("No Smoking".to_string()),
        employment_status: Some("Salaried".to_string()),
        insurance_plan: Some("Silver".to_string()),
        number_of_dependants: Some(1.0),
        income_lakhs: Some(6.0),
        genetical_risk: Some(2.0),
        medical_history: Some("Diabetes".to_string()),
    }
}

pub(super) fn router_with(predictor: PremiumPredictor) -> axum::Router {
    premium_router(Arc::new(predictor))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
