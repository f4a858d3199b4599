use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Column layout the scalers and models were fitted against. Order is part of the contract.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "age",
    "number_of_dependants",
    "income_lakhs",
    "insurance_plan",
    "genetical_risk",
    "normalized_risk_score",
    "gender_Male",
    "region_Northwest",
    "region_Southeast",
    "region_Southwest",
    "marital_status_Unmarried",
    "bmi_category_Obesity",
    "bmi_category_Overweight",
    "bmi_category_Underweight",
    "smoking_status_Occasional",
    "smoking_status_Regular",
    "employment_status_Salaried",
    "employment_status_Self-Employed",
];

pub const FEATURE_COUNT: usize = 18;

/// Placeholder column the persisted scalers expect; never part of a returned [`FeatureRow`].
pub const TRANSIENT_SCALING_COLUMN: &str = "income_level";

/// Applicants at or below this age use the young scaler and model.
pub const YOUNG_AGE_CUTOFF: f64 = 25.0;

/// Which artifact pair serves an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCohort {
    Young,
    Rest,
}

impl AgeCohort {
    /// Shared by scaler and model selection so both call sites agree at the boundary.
    pub fn for_age(age: f64) -> Self {
        if age <= YOUNG_AGE_CUTOFF {
            AgeCohort::Young
        } else {
            AgeCohort::Rest
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeCohort::Young => "young",
            AgeCohort::Rest => "rest",
        }
    }
}

/// Applicant answers as collected by the quote form. Every field is optional; see
/// [`crate::premium::encode_features`] for the defaults applied to absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantRecord {
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Marital Status")]
    pub marital_status: Option<String>,
    #[serde(rename = "BMI Category")]
    pub bmi_category: Option<String>,
    #[serde(rename = "Smoking Status")]
    pub smoking_status: Option<String>,
    #[serde(rename = "Employment Status")]
    pub employment_status: Option<String>,
    #[serde(rename = "Insurance Plan")]
    pub insurance_plan: Option<String>,
    #[serde(rename = "Number of Dependants")]
    pub number_of_dependants: Option<f64>,
    #[serde(rename = "Income in Lakhs")]
    pub income_lakhs: Option<f64>,
    #[serde(rename = "Genetical Risk")]
    pub genetical_risk: Option<f64>,
    #[serde(rename = "Medical History")]
    pub medical_history: Option<String>,
}

impl ApplicantRecord {
    /// Age used for cohort routing; an absent age routes as 0.
    pub fn routing_age(&self) -> f64 {
        self.age.unwrap_or(0.0)
    }
}

/// One encoded applicant, always exactly [`FEATURE_COUNT`] columns in [`FEATURE_COLUMNS`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRow {
    pub fn zeroed() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn position(column: &str) -> Option<usize> {
        FEATURE_COLUMNS.iter().position(|name| *name == column)
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        Self::position(column).map(|index| self.values[index])
    }

    /// Returns `false` when the column is not part of the layout.
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match Self::position(column) {
            Some(index) => {
                self.values[index] = value;
                true
            }
            None => false,
        }
    }

    pub fn age(&self) -> f64 {
        self.values[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.values.iter().copied())
    }
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Serialize for FeatureRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}
