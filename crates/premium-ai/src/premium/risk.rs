//! Medical history severity scoring.

/// Severity per condition. Lookups are made against the lowercased token.
const RISK_SCORES: [(&str, u32); 6] = [
    ("diabetes", 6),
    ("heart disease", 8),
    ("high blood pressure", 6),
    ("thyroid", 5),
    ("no disease", 0),
    ("none", 0),
];

/// Heart disease plus diabetes or high blood pressure.
pub const MAX_RISK_SCORE: u32 = 14;

/// Separator between conditions in a medical history answer.
pub const CONDITION_DELIMITER: &str = " & ";

/// Score a single lowercase condition; unknown conditions contribute nothing.
pub fn condition_score(condition: &str) -> u32 {
    RISK_SCORES
        .iter()
        .find(|(name, _)| *name == condition)
        .map(|(_, score)| *score)
        .unwrap_or(0)
}

/// Sum of condition scores divided by [`MAX_RISK_SCORE`].
///
/// The result is not clamped: three or more conditions can exceed 1.0, and the fitted models
/// saw exactly these values.
pub fn normalized_risk(medical_history: &str) -> f64 {
    let lowered = medical_history.to_lowercase();
    let total: u32 = lowered.split(CONDITION_DELIMITER).map(condition_score).sum();
    f64::from(total) / f64::from(MAX_RISK_SCORE)
}
