use super::domain::{ApplicantRecord, FeatureRow};
use super::risk::normalized_risk;

const REGIONS: [&str; 3] = ["Northwest", "Southeast", "Southwest"];
const MARITAL_STATUSES: [&str; 1] = ["Unmarried"];
const GENDERS: [&str; 1] = ["Male"];
const BMI_CATEGORIES: [&str; 3] = ["Obesity", "Overweight", "Underweight"];
const SMOKING_STATUSES: [&str; 2] = ["Occasional", "Regular"];
const EMPLOYMENT_STATUSES: [&str; 2] = ["Salaried", "Self-Employed"];

const DEFAULT_PLAN_ORDINAL: f64 = 1.0;

/// Ordinal for the chosen plan. Unknown or missing plans encode as Bronze.
pub fn insurance_plan_ordinal(plan: Option<&str>) -> f64 {
    match plan {
        Some("Bronze") => 1.0,
        Some("Silver") => 2.0,
        Some("Gold") => 3.0,
        _ => DEFAULT_PLAN_ORDINAL,
    }
}

/// Encode a record into an unscaled feature row.
///
/// Categorical answers are matched exactly; a value outside a group's flagged categories (or an
/// absent answer) leaves every flag in that group at 0, which is the reference category.
/// Numeric answers default to 0 and an absent medical history scores as `"none"`.
pub fn encode_features(record: &ApplicantRecord) -> FeatureRow {
    let mut row = FeatureRow::zeroed();

    set_one_hot(&mut row, "gender", record.gender.as_deref(), &GENDERS);
    set_one_hot(&mut row, "region", record.region.as_deref(), &REGIONS);
    set_one_hot(
        &mut row,
        "marital_status",
        record.marital_status.as_deref(),
        &MARITAL_STATUSES,
    );
    set_one_hot(
        &mut row,
        "bmi_category",
        record.bmi_category.as_deref(),
        &BMI_CATEGORIES,
    );
    set_one_hot(
        &mut row,
        "smoking_status",
        record.smoking_status.as_deref(),
        &SMOKING_STATUSES,
    );
    set_one_hot(
        &mut row,
        "employment_status",
        record.employment_status.as_deref(),
        &EMPLOYMENT_STATUSES,
    );

    row.set(
        "insurance_plan",
        insurance_plan_ordinal(record.insurance_plan.as_deref()),
    );
    row.set("age", record.age.unwrap_or(0.0));
    row.set(
        "number_of_dependants",
        record.number_of_dependants.unwrap_or(0.0),
    );
    row.set("income_lakhs", record.income_lakhs.unwrap_or(0.0));
    row.set("genetical_risk", record.genetical_risk.unwrap_or(0.0));
    row.set(
        "normalized_risk_score",
        normalized_risk(record.medical_history.as_deref().unwrap_or("none")),
    );

    row
}

fn set_one_hot(row: &mut FeatureRow, prefix: &str, value: Option<&str>, flagged: &[&str]) {
    if let Some(category) = value.filter(|category| flagged.contains(category)) {
        row.set(&format!("{prefix}_{category}"), 1.0);
    }
}
