//! Fitted scalers and models, and the context object that owns them for the life of the process.
//!
//! Inference code only talks to the [`FittedScaler`] and [`FittedModel`] traits so tests can
//! inject recording doubles. The JSON formats under [`scaler`] and [`model`] are the shipped
//! implementations.

pub mod model;
pub mod scaler;

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use super::domain::{AgeCohort, FeatureRow, FEATURE_COLUMNS, TRANSIENT_SCALING_COLUMN};
pub use model::{ModelArtifact, RegressionTree, TreeNode};
pub use scaler::{ScalerArtifact, ScalerBundleFile};

pub const MODEL_YOUNG_FILE: &str = "model_young.json";
pub const MODEL_REST_FILE: &str = "model_rest.json";
pub const SCALER_YOUNG_FILE: &str = "scaler_young.json";
pub const SCALER_REST_FILE: &str = "scaler_rest.json";

/// A fitted column transform. `columns` names each position of every row in `rows`.
pub trait FittedScaler: Debug + Send + Sync {
    fn transform(
        &self,
        columns: &[&str],
        rows: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, ArtifactError>;
}

/// A fitted estimator producing one raw output per row.
pub trait FittedModel: Debug + Send + Sync {
    fn predict(&self, columns: &[&str], rows: &[Vec<f64>]) -> Result<Vec<f64>, ArtifactError>;
}

/// Columns to rescale paired with the transform fitted on them.
#[derive(Debug, Clone)]
pub struct ScalerBundle {
    columns: Vec<String>,
    scaler: Arc<dyn FittedScaler>,
}

impl ScalerBundle {
    pub fn new(
        columns: Vec<String>,
        scaler: Arc<dyn FittedScaler>,
    ) -> Result<Self, ArtifactError> {
        if columns.is_empty() {
            return Err(ArtifactError::invalid(
                "scaler bundle",
                "no columns to scale",
            ));
        }
        if let Some(unknown) = columns.iter().find(|column| {
            column.as_str() != TRANSIENT_SCALING_COLUMN && FeatureRow::position(column).is_none()
        }) {
            return Err(ArtifactError::invalid(
                "scaler bundle",
                format!("column '{unknown}' is not part of the feature layout"),
            ));
        }
        Ok(Self { columns, scaler })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn scaler(&self) -> &dyn FittedScaler {
        self.scaler.as_ref()
    }
}

/// Scaler and model serving one age cohort.
#[derive(Debug, Clone)]
pub struct CohortArtifacts {
    pub scaler: ScalerBundle,
    pub model: Arc<dyn FittedModel>,
}

/// The four artifacts, built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct PremiumArtifacts {
    young: CohortArtifacts,
    rest: CohortArtifacts,
}

impl PremiumArtifacts {
    pub fn new(young: CohortArtifacts, rest: CohortArtifacts) -> Self {
        Self { young, rest }
    }

    /// Load and validate the JSON artifacts in `directory`. Any missing or malformed file fails
    /// the whole load.
    pub fn load(directory: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let directory = directory.as_ref();
        let young = load_cohort(directory, SCALER_YOUNG_FILE, MODEL_YOUNG_FILE)?;
        let rest = load_cohort(directory, SCALER_REST_FILE, MODEL_REST_FILE)?;

        info!(directory = %directory.display(), "premium artifacts loaded");
        Ok(Self::new(young, rest))
    }

    pub fn cohort(&self, cohort: AgeCohort) -> &CohortArtifacts {
        match cohort {
            AgeCohort::Young => &self.young,
            AgeCohort::Rest => &self.rest,
        }
    }

    pub fn scaler(&self, cohort: AgeCohort) -> &ScalerBundle {
        &self.cohort(cohort).scaler
    }

    pub fn model(&self, cohort: AgeCohort) -> &dyn FittedModel {
        self.cohort(cohort).model.as_ref()
    }
}

fn load_cohort(
    directory: &Path,
    scaler_file: &str,
    model_file: &str,
) -> Result<CohortArtifacts, ArtifactError> {
    let bundle: ScalerBundleFile = read_json(&directory.join(scaler_file))?;
    bundle.validate()?;
    let ScalerBundleFile {
        cols_to_scale,
        scaler,
    } = bundle;
    let scaler = ScalerBundle::new(cols_to_scale, Arc::new(scaler))?;

    let model: ModelArtifact = read_json(&directory.join(model_file))?;
    model.validate(&FEATURE_COLUMNS)?;

    Ok(CohortArtifacts {
        scaler,
        model: Arc::new(model),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors raised while loading or applying artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid {artifact}: {reason}")]
    Invalid { artifact: String, reason: String },
    #[error("feature names {actual:?} do not match fitted names {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("row has {actual} values but {expected} columns were fitted")]
    RowWidth { expected: usize, actual: usize },
}

impl ArtifactError {
    pub(crate) fn invalid(artifact: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }
}

/// Shared guard for the fitted-name check every estimator performs before touching values.
pub(crate) fn check_inputs(
    fitted: &[String],
    columns: &[&str],
    rows: &[Vec<f64>],
) -> Result<(), ArtifactError> {
    if fitted.len() != columns.len() || fitted.iter().zip(columns).any(|(a, b)| a != b) {
        return Err(ArtifactError::FeatureMismatch {
            expected: fitted.to_vec(),
            actual: columns.iter().map(|column| column.to_string()).collect(),
        });
    }
    if let Some(row) = rows.iter().find(|row| row.len() != fitted.len()) {
        return Err(ArtifactError::RowWidth {
            expected: fitted.len(),
            actual: row.len(),
        });
    }
    Ok(())
}
