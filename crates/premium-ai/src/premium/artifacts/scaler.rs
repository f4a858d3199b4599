use serde::{Deserialize, Serialize};

use super::{check_inputs, ArtifactError, FittedScaler};

/// On-disk scaler bundle: the columns to rescale and the transform fitted on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerBundleFile {
    pub cols_to_scale: Vec<String>,
    pub scaler: ScalerArtifact,
}

impl ScalerBundleFile {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        self.scaler.validate()?;
        if self.scaler.feature_names() != self.cols_to_scale.as_slice() {
            return Err(ArtifactError::invalid(
                "scaler bundle",
                format!(
                    "cols_to_scale {:?} differ from fitted feature names {:?}",
                    self.cols_to_scale,
                    self.scaler.feature_names()
                ),
            ));
        }
        Ok(())
    }
}

/// Column-wise transforms with the parameters learned at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - data_min) / (data_max - data_min)`.
    MinMax {
        feature_names: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
    },
    /// `(x - mean) / scale`.
    Standard {
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl ScalerArtifact {
    pub fn feature_names(&self) -> &[String] {
        match self {
            ScalerArtifact::MinMax { feature_names, .. }
            | ScalerArtifact::Standard { feature_names, .. } => feature_names,
        }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        let (names, first, second) = match self {
            ScalerArtifact::MinMax {
                feature_names,
                data_min,
                data_max,
            } => (feature_names, data_min, data_max),
            ScalerArtifact::Standard {
                feature_names,
                mean,
                scale,
            } => (feature_names, mean, scale),
        };

        if names.is_empty() {
            return Err(ArtifactError::invalid("scaler", "no fitted features"));
        }
        if first.len() != names.len() || second.len() != names.len() {
            return Err(ArtifactError::invalid(
                "scaler",
                format!(
                    "{} feature names but parameter widths {} and {}",
                    names.len(),
                    first.len(),
                    second.len()
                ),
            ));
        }
        if first.iter().chain(second.iter()).any(|value| !value.is_finite()) {
            return Err(ArtifactError::invalid("scaler", "non-finite parameter"));
        }
        Ok(())
    }

    fn scale_value(&self, index: usize, value: f64) -> f64 {
        match self {
            ScalerArtifact::MinMax {
                data_min, data_max, ..
            } => {
                let range = non_zero(data_max[index] - data_min[index]);
                (value - data_min[index]) / range
            }
            ScalerArtifact::Standard { mean, scale, .. } => {
                (value - mean[index]) / non_zero(scale[index])
            }
        }
    }
}

// Constant features were fitted with a zero spread; they pass through unscaled.
fn non_zero(spread: f64) -> f64 {
    if spread == 0.0 {
        1.0
    } else {
        spread
    }
}

impl FittedScaler for ScalerArtifact {
    fn transform(
        &self,
        columns: &[&str],
        rows: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, ArtifactError> {
        self.validate()?;
        check_inputs(self.feature_names(), columns, rows)?;
        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(index, value)| self.scale_value(index, *value))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|column| column.to_string()).collect()
    }

    fn min_max() -> ScalerArtifact {
        ScalerArtifact::MinMax {
            feature_names: names(&["age", "income_level", "insurance_plan"]),
            data_min: vec![18.0, 1.0, 1.0],
            data_max: vec![25.0, 1.0, 3.0],
        }
    }

    #[test]
    fn min_max_maps_fitted_range_to_unit_interval() {
        let scaled = min_max()
            .transform(
                &["age", "income_level", "insurance_plan"],
                &[vec![25.0, 0.0, 2.0], vec![18.0, 0.0, 3.0]],
            )
            .expect("transform succeeds");

        assert_eq!(scaled[0], vec![1.0, -1.0, 0.5]);
        assert_eq!(scaled[1], vec![0.0, -1.0, 1.0]);
    }

    #[test]
    fn standard_centres_and_divides_by_scale() {
        let scaler = ScalerArtifact::Standard {
            feature_names: names(&["income_lakhs"]),
            mean: vec![20.0],
            scale: vec![4.0],
        };

        let scaled = scaler
            .transform(&["income_lakhs"], &[vec![28.0]])
            .expect("transform succeeds");
        assert_eq!(scaled, vec![vec![2.0]]);
    }

    #[test]
    fn transform_rejects_columns_that_differ_from_fit() {
        let err = min_max()
            .transform(&["age", "insurance_plan"], &[vec![20.0, 1.0]])
            .expect_err("missing fitted column rejected");

        assert!(matches!(err, ArtifactError::FeatureMismatch { .. }));
    }

    #[test]
    fn transform_rejects_short_rows() {
        let err = min_max()
            .transform(&["age", "income_level", "insurance_plan"], &[vec![20.0]])
            .expect_err("short row rejected");

        assert!(matches!(
            err,
            ArtifactError::RowWidth {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn bundle_parses_and_requires_matching_columns() {
        let raw = r#"{
            "cols_to_scale": ["age", "income_level"],
            "scaler": {
                "kind": "min_max",
                "feature_names": ["age", "income_level"],
                "data_min": [18.0, 1.0],
                "data_max": [25.0, 4.0]
            }
        }"#;
        let bundle: ScalerBundleFile = serde_json::from_str(raw).expect("bundle parses");
        bundle.validate().expect("bundle is consistent");

        let mut reordered = bundle.clone();
        reordered.cols_to_scale.reverse();
        assert!(reordered.validate().is_err());
    }

    #[test]
    fn transform_rejects_unvalidated_short_parameters() {
        let scaler = ScalerArtifact::Standard {
            feature_names: names(&["age", "income_lakhs"]),
            mean: vec![30.0],
            scale: vec![5.0, 10.0],
        };

        let err = scaler
            .transform(&["age", "income_lakhs"], &[vec![35.0, 12.0]])
            .expect_err("short parameters rejected");
        assert!(matches!(err, ArtifactError::Invalid { .. }));
    }

    #[test]
    fn validate_rejects_mismatched_parameter_widths() {
        let scaler = ScalerArtifact::MinMax {
            feature_names: names(&["age", "income_lakhs"]),
            data_min: vec![18.0],
            data_max: vec![25.0, 99.0],
        };

        assert!(matches!(
            scaler.validate(),
            Err(ArtifactError::Invalid { .. })
        ));
    }
}
