//! Screening survey evaluation: scoring, recommendations, persistence, and HTTP routes.

pub mod domain;
pub mod questions;
pub mod recommendation;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sink;

#[cfg(test)]
mod tests;

pub use domain::{
    AgeGroup, AnswerSet, Category, EvaluationRecord, EvaluationResponse, ScoreResult, Submission,
    UnknownAgeGroup, ValidationError, MAX_ORDINAL, MIN_ORDINAL, RISK_FRACTION,
};
pub use questions::{DirectoryQuestionSets, QuestionSetError, QuestionSetProvider};
pub use recommendation::{CatalogError, RecommendationCatalog, RecommendationError};
pub use router::survey_router;
pub use scoring::{ScoringEngine, ScoringError, ScoringRule};
pub use service::{parse_submission, EvaluationError, EvaluationService};
pub use sink::{
    DirectoryResultSink, DisabledResultSink, HttpResultSink, ResultSink, ResultSinkError,
};
