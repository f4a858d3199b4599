use crate::infra::load_predictor;
use clap::Args;
use premium_ai::config::AppConfig;
use premium_ai::error::AppError;
use premium_ai::premium::batch::{parse_path, write_premiums};
use premium_ai::premium::{ApplicantRecord, PredictionOutcome, PremiumPredictor};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Full applicant as JSON using the quote form field names. Flags below override its fields.
    #[arg(long, value_parser = crate::infra::parse_record)]
    pub(crate) record: Option<ApplicantRecord>,
    #[arg(long)]
    pub(crate) age: Option<f64>,
    #[arg(long)]
    pub(crate) gender: Option<String>,
    #[arg(long)]
    pub(crate) region: Option<String>,
    #[arg(long)]
    pub(crate) marital_status: Option<String>,
    #[arg(long)]
    pub(crate) bmi_category: Option<String>,
    #[arg(long)]
    pub(crate) smoking_status: Option<String>,
    #[arg(long)]
    pub(crate) employment_status: Option<String>,
    #[arg(long)]
    pub(crate) insurance_plan: Option<String>,
    #[arg(long)]
    pub(crate) dependants: Option<f64>,
    #[arg(long)]
    pub(crate) income_lakhs: Option<f64>,
    #[arg(long)]
    pub(crate) genetical_risk: Option<f64>,
    /// Conditions joined by " & ", e.g. "Diabetes & Thyroid"
    #[arg(long)]
    pub(crate) medical_history: Option<String>,
    /// Print the scaled feature row the model received
    #[arg(long)]
    pub(crate) explain: bool,
    /// Reject records with missing or negative numeric answers
    #[arg(long)]
    pub(crate) strict: bool,
    /// Override the configured artifact directory
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with one applicant per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write the scored CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Reject records with missing or negative numeric answers
    #[arg(long)]
    pub(crate) strict: bool,
    /// Override the configured artifact directory
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the configured artifact directory
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
    /// Print the scaled feature row for each sample applicant
    #[arg(long)]
    pub(crate) explain: bool,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let predictor = load_predictor(&config, args.artifacts.clone(), args.strict)?;
    let explain = args.explain;
    let record = args.into_record();

    let outcome = predictor.evaluate(&record)?;
    render_outcome("Applicant", &outcome, explain);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        strict,
        artifacts,
    } = args;

    let config = AppConfig::load()?;
    let predictor = load_predictor(&config, artifacts, strict)?;
    let records = parse_path(&input)?;
    let premiums = predictor.predict_batch(&records)?;

    match output {
        Some(path) => {
            write_premiums(File::create(&path)?, &records, &premiums)?;
            eprintln!(
                "Scored {} applicants from {} into {}",
                records.len(),
                input.display(),
                path.display()
            );
        }
        None => write_premiums(io::stdout().lock(), &records, &premiums)?,
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let directory = args
        .artifacts
        .unwrap_or_else(|| config.artifacts.directory.clone());
    let predictor = load_predictor(&config, Some(directory.clone()), false)?;

    println!("Premium predictor demo");
    println!("Artifacts: {}", directory.display());
    render_samples(&predictor, args.explain)
}

fn render_samples(predictor: &PremiumPredictor, explain: bool) -> Result<(), AppError> {
    for (label, record) in sample_applicants() {
        let outcome = predictor.evaluate(&record)?;
        render_outcome(label, &outcome, explain);
    }
    Ok(())
}

fn render_outcome(label: &str, outcome: &PredictionOutcome, explain: bool) {
    println!(
        "\n{label}\n  Premium: {}\n  Cohort: {}",
        outcome.premium,
        outcome.cohort.label()
    );
    if explain {
        println!("  Scaled features:");
        for (column, value) in outcome.features.iter() {
            println!("    {column:<32} {value:>10.4}");
        }
    }
}

impl PredictArgs {
    fn into_record(self) -> ApplicantRecord {
        let mut record = self.record.unwrap_or_default();

        if self.age.is_some() {
            record.age = self.age;
        }
        if self.dependants.is_some() {
            record.number_of_dependants = self.dependants;
        }
        if self.income_lakhs.is_some() {
            record.income_lakhs = self.income_lakhs;
        }
        if self.genetical_risk.is_some() {
            record.genetical_risk = self.genetical_risk;
        }

        let text_fields = [
            (self.gender, &mut record.gender),
            (self.region, &mut record.region),
            (self.marital_status, &mut record.marital_status),
            (self.bmi_category, &mut record.bmi_category),
            (self.smoking_status, &mut record.smoking_status),
            (self.employment_status, &mut record.employment_status),
            (self.insurance_plan, &mut record.insurance_plan),
            (self.medical_history, &mut record.medical_history),
        ];
        for (flag, field) in text_fields {
            if flag.is_some() {
                *field = flag;
            }
        }

        record
    }
}

fn sample_applicants() -> Vec<(&'static str, ApplicantRecord)> {
    let applicant = |age: f64, plan: &str, smoking: &str, history: &str| ApplicantRecord {
        age: Some(age),
        gender: Some("Male".to_string()),
        region: Some("Northwest".to_string()),
        marital_status: Some("Unmarried".to_string()),
        bmi_category: Some("Normal".to_string()),
        smoking_status: Some(smoking.to_string()),
        employment_status: Some("Salaried".to_string()),
        insurance_plan: Some(plan.to_string()),
        number_of_dependants: Some(0.0),
        income_lakhs: Some(5.0),
        genetical_risk: Some(0.0),
        medical_history: Some(history.to_string()),
    };

    vec![
        (
            "Young applicant on Silver, no conditions",
            applicant(25.0, "Silver", "No Smoking", "No Disease"),
        ),
        (
            "Same answers one year past the cutoff",
            applicant(26.0, "Silver", "No Smoking", "No Disease"),
        ),
        (
            "Gold plan, regular smoker with two conditions",
            applicant(40.0, "Gold", "Regular", "Diabetes & Heart disease"),
        ),
        (
            "Bronze plan, high blood pressure",
            applicant(58.0, "Bronze", "Occasional", "High blood pressure"),
        ),
        (
            "Unanswered form (defaults applied)",
            ApplicantRecord::default(),
        ),
    ]
}
