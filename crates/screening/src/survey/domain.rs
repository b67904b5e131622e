use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lowest (healthiest) ordinal answer value.
pub const MIN_ORDINAL: i64 = 1;
/// Highest (worst) ordinal answer value.
pub const MAX_ORDINAL: i64 = 5;
/// Share of the worst possible total at which a submission is flagged.
pub const RISK_FRACTION: f64 = 0.70;

/// Cohort tag selecting both the question set and the scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "age1")]
    Age1,
    #[serde(rename = "age2")]
    Age2,
    #[serde(rename = "age3")]
    Age3,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [AgeGroup::Age1, AgeGroup::Age2, AgeGroup::Age3];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Age1 => "age1",
            AgeGroup::Age2 => "age2",
            AgeGroup::Age3 => "age3",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = UnknownAgeGroup;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == value)
            .ok_or_else(|| UnknownAgeGroup(value.to_string()))
    }
}

/// Raised when an age-group tag matches no known cohort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown age group '{0}'")]
pub struct UnknownAgeGroup(pub String);

/// Qualitative outcome bucket; drives which recommendation template is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BelowThreshold,
    Borderline,
    AtOrAboveThreshold,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::BelowThreshold => "below_threshold",
            Category::Borderline => "borderline",
            Category::AtOrAboveThreshold => "at_or_above_threshold",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered, range-checked answers; one entry per presented question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSet(Vec<u8>);

impl AnswerSet {
    /// Builds an answer set, rejecting empty input and values outside 1..=5.
    pub fn new(values: &[i64]) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::Empty);
        }

        let mut answers = Vec::with_capacity(values.len());
        for (index, value) in values.iter().copied().enumerate() {
            if !(MIN_ORDINAL..=MAX_ORDINAL).contains(&value) {
                return Err(ValidationError::OutOfRange { index, value });
            }
            answers.push(value as u8);
        }

        Ok(Self(answers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|value| u32::from(*value)).sum()
    }

    /// Number of answers carrying the worst ordinal value.
    pub fn worst_count(&self) -> usize {
        self.0
            .iter()
            .filter(|value| i64::from(**value) == MAX_ORDINAL)
            .count()
    }

    pub fn worst_possible_score(&self) -> u32 {
        self.0.len() as u32 * MAX_ORDINAL as u32
    }

    /// Flagging boundary: 70% of the worst possible total, independent of age group.
    pub fn threshold(&self) -> f64 {
        f64::from(self.worst_possible_score()) * RISK_FRACTION
    }
}

/// Input contract violations for answer sets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("survey must contain at least one answer")]
    Empty,
    #[error("answer at index {index} has value {value}; expected 1..=5")]
    OutOfRange { index: usize, value: i64 },
}

/// One evaluation request after parsing; the age-group tag is resolved when scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub age_group: String,
    pub survey: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Remaining request fields (contact details and the like), kept verbatim.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Scoring Engine output before a recommendation is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub age_group: AgeGroup,
    pub score: u32,
    pub threshold: f64,
    pub category: Category,
}

/// Externally visible evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub result: ScoreResult,
    pub msg: String,
}

/// Persistence payload handed to a result sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub evaluation_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub submission: Submission,
    pub threshold: f64,
    pub result: EvaluationResponse,
}

impl EvaluationRecord {
    /// Object key under which the record is stored.
    pub fn storage_key(&self) -> String {
        format!(
            "results/{}/{}-{}.json",
            self.result.result.age_group,
            self.evaluated_at.format("%Y/%m/%d/%H%M%S%3f"),
            self.evaluation_id
        )
    }
}
