use crate::infra::open_store;
use clap::Args;
use mbti_survey::config::AppConfig;
use mbti_survey::error::AppError;
use mbti_survey::store::{PurgeCounts, Store};
use mbti_survey::survey::seed::{
    self, SkippedRow, DEFAULT_QUESTIONNAIRE_KEY, DEFAULT_QUESTIONNAIRE_NAME,
};
use mbti_survey::survey::{ImportSummary, Questionnaire};
use mbti_survey::telemetry;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct QuestionImportArgs {
    /// CSV file with text,dimension,keyed_pole,weight,order columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Questionnaire key the questions belong to
    #[arg(long, default_value = DEFAULT_QUESTIONNAIRE_KEY)]
    pub(crate) key: String,
    /// Display name for the questionnaire (defaults to the key)
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Optional questionnaire description; blank keeps the stored one
    #[arg(long, default_value = "")]
    pub(crate) description: String,
}

#[derive(Args, Debug)]
pub(crate) struct ProfileImportArgs {
    /// CSV file keyed by a four-letter `code` column
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ActivateArgs {
    /// Key of the questionnaire to serve
    #[arg(long)]
    pub(crate) key: String,
}

pub(crate) async fn import_questions(args: QuestionImportArgs) -> Result<(), AppError> {
    let store = admin_store().await?;
    let (questionnaire, summary) = run_question_import(&store, &args).await?;
    println!(
        "Questionnaire '{}' ({}) is now active",
        questionnaire.name, questionnaire.key
    );
    print_summary("questions", &summary);
    Ok(())
}

pub(crate) async fn import_profiles(args: ProfileImportArgs) -> Result<(), AppError> {
    let store = admin_store().await?;
    let summary = run_profile_import(&store, &args.csv).await?;
    print_summary("profiles", &summary);
    Ok(())
}

pub(crate) async fn seed_default_profiles() -> Result<(), AppError> {
    let store = admin_store().await?;
    let summary = seed::seed_default_profiles(&store).await?;
    println!(
        "Default profiles: {} created, {} already present",
        summary.created, summary.skipped
    );
    Ok(())
}

pub(crate) async fn activate_questionnaire(args: ActivateArgs) -> Result<(), AppError> {
    let store = admin_store().await?;
    let questionnaire = seed::activate_questionnaire(&store, &args.key).await?;
    println!(
        "Questionnaire '{}' ({}) is now active",
        questionnaire.name, questionnaire.key
    );
    Ok(())
}

pub(crate) async fn purge() -> Result<(), AppError> {
    let store = admin_store().await?;
    let PurgeCounts { responses, results } = store.purge_results().await?;
    println!("Purged {responses} response(s) and {results} result(s)");
    Ok(())
}

async fn admin_store() -> Result<Store, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    open_store(&config).await
}

pub(crate) async fn run_question_import(
    store: &Store,
    args: &QuestionImportArgs,
) -> Result<(Questionnaire, ImportSummary), AppError> {
    let (drafts, skipped) = seed::parse_questions(open_csv(&args.csv)?)?;
    report_skipped(&skipped);
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| default_questionnaire_name(&args.key));

    Ok(seed::import_questions(
        store,
        &args.key,
        &name,
        &args.description,
        &drafts,
        skipped.len(),
    )
    .await?)
}

pub(crate) async fn run_profile_import(
    store: &Store,
    path: &Path,
) -> Result<ImportSummary, AppError> {
    let (profiles, skipped) = seed::parse_profiles(open_csv(path)?)?;
    report_skipped(&skipped);
    Ok(seed::import_profiles(store, &profiles, skipped.len()).await?)
}

fn default_questionnaire_name(key: &str) -> String {
    if key == DEFAULT_QUESTIONNAIRE_KEY {
        DEFAULT_QUESTIONNAIRE_NAME.to_string()
    } else {
        key.to_string()
    }
}

fn open_csv(path: &Path) -> Result<BufReader<File>, AppError> {
    Ok(BufReader::new(File::open(path)?))
}

fn report_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        eprintln!("Skipping row {}: {}", row.row, row.reason);
    }
}

fn print_summary(label: &str, summary: &ImportSummary) {
    println!(
        "Imported {label}: {} created, {} updated, {} skipped",
        summary.created, summary.updated, summary.skipped
    );
}
