use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use screening::error::AppError;
use screening::survey::{
    DisabledResultSink, EvaluationResponse, EvaluationService, RecommendationCatalog,
    ScoringEngine,
};
use serde_json::json;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Age group tag (age1, age2, age3)
    #[arg(long)]
    pub(crate) age_group: String,
    /// Comma-separated answers on the 1-5 scale, e.g. 1,2,5,3
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub(crate) answers: Vec<i64>,
    /// Optional JSON file overriding the built-in recommendation templates
    #[arg(long)]
    pub(crate) messages: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let response = evaluate_locally(args)?;
    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn evaluate_locally(args: EvaluateArgs) -> Result<EvaluationResponse, AppError> {
    let EvaluateArgs {
        age_group,
        answers,
        messages,
    } = args;

    let catalog = match messages {
        Some(path) => RecommendationCatalog::from_path(path)?,
        None => RecommendationCatalog::standard(),
    };
    let service = EvaluationService::new(
        ScoringEngine::standard(),
        catalog,
        Arc::new(DisabledResultSink),
    );

    let (response, _record) = service.evaluate(json!({
        "age_group": age_group,
        "survey": answers,
    }))?;
    Ok(response)
}
