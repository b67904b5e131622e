use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{EvaluationRecord, EvaluationResponse, Submission, ValidationError};
use super::recommendation::{RecommendationCatalog, RecommendationError};
use super::scoring::{ScoringEngine, ScoringError};
use super::sink::{ResultSink, ResultSinkError};

/// Default bound on a single result-sink write.
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct SubmissionPayload {
    age_group: String,
    survey: Vec<i64>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(flatten)]
    metadata: Map<String, Value>,
}

/// Decodes a raw request body into a submission.
pub fn parse_submission(raw: Value) -> Result<Submission, EvaluationError> {
    if !raw.is_object() {
        return Err(EvaluationError::MalformedInput(
            "submission must be a JSON object".to_string(),
        ));
    }

    let payload: SubmissionPayload = serde_json::from_value(raw)
        .map_err(|err| EvaluationError::MalformedInput(err.to_string()))?;

    Ok(Submission {
        age_group: payload.age_group,
        survey: payload.survey,
        lang: payload.lang,
        metadata: payload.metadata,
    })
}

/// Service composing the scoring engine, recommendation catalog, and result sink.
pub struct EvaluationService {
    engine: ScoringEngine,
    catalog: RecommendationCatalog,
    sink: Arc<dyn ResultSink>,
    sink_timeout: Duration,
}

impl EvaluationService {
    pub fn new(
        engine: ScoringEngine,
        catalog: RecommendationCatalog,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            engine,
            catalog,
            sink,
            sink_timeout: DEFAULT_SINK_TIMEOUT,
        }
    }

    pub fn with_sink_timeout(mut self, timeout: Duration) -> Self {
        self.sink_timeout = timeout;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Parses, validates, scores, and composes a submission without persisting it.
    ///
    /// Answers are checked for emptiness and range only; the count is not compared
    /// against the question set served for the same language and age group.
    pub fn evaluate(
        &self,
        raw: Value,
    ) -> Result<(EvaluationResponse, EvaluationRecord), EvaluationError> {
        let submission = parse_submission(raw)?;
        let answers = self
            .engine
            .validate(&submission.survey)
            .map_err(ScoringError::from)?;
        let result = self.engine.score(&submission.age_group, &answers)?;
        let msg = self.catalog.compose(&submission, &result)?;

        info!(
            age_group = %result.age_group,
            threshold = result.threshold,
            score = result.score,
            category = %result.category,
            "survey evaluated"
        );

        let response = EvaluationResponse { result, msg };
        let record = EvaluationRecord {
            evaluation_id: Uuid::new_v4().to_string(),
            evaluated_at: Utc::now(),
            threshold: response.result.threshold,
            submission,
            result: response.clone(),
        };

        Ok((response, record))
    }

    /// Evaluates a submission and hands the record to the sink without waiting on it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, raw: Value) -> Result<EvaluationResponse, EvaluationError> {
        let (response, record) = self.evaluate(raw)?;
        drop(self.persist(record));
        Ok(response)
    }

    /// Spawns the bounded sink write. The returned handle may be ignored; failures
    /// and timeouts are logged and counted, never propagated to the caller.
    pub fn persist(&self, record: EvaluationRecord) -> JoinHandle<Result<String, ResultSinkError>> {
        let sink = Arc::clone(&self.sink);
        let timeout = self.sink_timeout;

        tokio::spawn(async move {
            let evaluation_id = record.evaluation_id.clone();
            let outcome = match tokio::time::timeout(timeout, sink.store(&record)).await {
                Ok(result) => result,
                Err(_) => Err(ResultSinkError::Timeout(timeout)),
            };

            match &outcome {
                Ok(key) => {
                    metrics::counter!("screening_results_stored_total").increment(1);
                    info!(%evaluation_id, %key, "evaluation record stored");
                }
                Err(err) => {
                    metrics::counter!("screening_result_sink_failures_total").increment(1);
                    warn!(%evaluation_id, error = %err, "failed to store evaluation record");
                }
            }

            outcome
        })
    }
}

/// Error raised by the evaluation service. All variants are resolved at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("malformed submission: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
}

impl EvaluationError {
    /// Stable category string reported in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::MalformedInput(_) => "malformed_input",
            EvaluationError::Scoring(ScoringError::Validation(_)) => "validation",
            EvaluationError::Scoring(ScoringError::UnknownAgeGroup(_)) => "unknown_age_group",
            EvaluationError::Recommendation(RecommendationError::MissingTemplate { .. }) => {
                "missing_template"
            }
        }
    }

    /// True when the caller sent something we cannot evaluate.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EvaluationError::Recommendation(_))
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            EvaluationError::Scoring(ScoringError::Validation(err)) => Some(err),
            _ => None,
        }
    }
}
