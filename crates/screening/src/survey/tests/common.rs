use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{json, Value};

use crate::survey::domain::EvaluationRecord;
use crate::survey::questions::{QuestionSetError, QuestionSetProvider};
use crate::survey::recommendation::RecommendationCatalog;
use crate::survey::scoring::ScoringEngine;
use crate::survey::service::EvaluationService;
use crate::survey::sink::{ResultSink, ResultSinkError};

pub(super) fn submission_json(age_group: &str, answers: &[i64]) -> Value {
    json!({
        "age_group": age_group,
        "survey": answers,
        "lang": "en",
        "name": "Sam Rivera",
        "email": "sam@example.com",
    })
}

pub(super) fn build_service(sink: Arc<dyn ResultSink>) -> EvaluationService {
    EvaluationService::new(
        ScoringEngine::standard(),
        RecommendationCatalog::standard(),
        sink,
    )
    .with_sink_timeout(Duration::from_millis(100))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}

pub(super) fn assert_error_kind(status: StatusCode, payload: &Value, expected: &str) {
    assert!(status.is_client_error() || status.is_server_error());
    assert_eq!(payload.get("kind").and_then(Value::as_str), Some(expected));
    assert!(payload.get("error").and_then(Value::as_str).is_some());
}

#[derive(Default, Clone)]
pub(super) struct RecordingSink {
    records: Arc<Mutex<Vec<EvaluationRecord>>>,
}

impl RecordingSink {
    pub(super) fn records(&self) -> Vec<EvaluationRecord> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(record.clone());
        Ok(record.storage_key())
    }
}

pub(super) struct FailingSink;

#[async_trait]
impl ResultSink for FailingSink {
    async fn store(&self, _record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        Err(ResultSinkError::Backend("bucket unreachable".to_string()))
    }
}

pub(super) struct SlowSink(pub(super) Duration);

#[async_trait]
impl ResultSink for SlowSink {
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        tokio::time::sleep(self.0).await;
        Ok(record.storage_key())
    }
}

#[derive(Default)]
pub(super) struct StaticQuestionSets {
    pub(super) document: Option<String>,
}

#[async_trait]
impl QuestionSetProvider for StaticQuestionSets {
    async fn fetch(
        &self,
        lang_code: &str,
        age_group: &str,
    ) -> Result<Option<String>, QuestionSetError> {
        if lang_code == "en" && age_group == "age1" {
            Ok(self.document.clone())
        } else {
            Ok(None)
        }
    }
}
