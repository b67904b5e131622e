use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;

use super::domain::EvaluationResponse;
use super::questions::QuestionSetProvider;
use super::service::{EvaluationError, EvaluationService};

#[derive(Clone)]
pub(crate) struct SurveyState {
    pub(crate) service: Arc<EvaluationService>,
    pub(crate) questions: Arc<dyn QuestionSetProvider>,
}

/// Router builder exposing question-set retrieval and survey evaluation.
pub fn survey_router(
    service: Arc<EvaluationService>,
    questions: Arc<dyn QuestionSetProvider>,
) -> Router {
    Router::new()
        .route("/survey", post(evaluate_handler))
        .route("/survey/:lang_code/:age_group", get(question_set_handler))
        .with_state(SurveyState { service, questions })
}

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": kind,
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn question_set_handler(
    State(state): State<SurveyState>,
    Path((lang_code, age_group)): Path<(String, String)>,
) -> Result<Response, AppError> {
    match state.questions.fetch(&lang_code, &age_group).await? {
        Some(document) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
            document,
        )
            .into_response()),
        None => {
            info!(%lang_code, %age_group, "question set not found");
            Ok(error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no survey questions for language '{lang_code}' and age group '{age_group}'"),
            ))
        }
    }
}

pub(crate) async fn evaluate_handler(
    State(state): State<SurveyState>,
    body: Bytes,
) -> Result<Json<EvaluationResponse>, AppError> {
    let raw: Value = serde_json::from_slice(&body)
        .map_err(|err| EvaluationError::MalformedInput(err.to_string()))?;

    Ok(Json(state.service.submit(raw)?))
}
