mod rules;

pub use rules::{BandedTotalRule, RuleOutcome, ScoringRule, TotalScoreRule, WorstAnswerPatternRule};

use std::collections::BTreeMap;
use std::sync::Arc;

use super::domain::{AgeGroup, AnswerSet, ScoreResult, UnknownAgeGroup, ValidationError};

/// Stateless evaluator dispatching each age group to its registered rule.
///
/// Rules share only the threshold computation, which is derived from the answer
/// count and never from answer content.
#[derive(Clone)]
pub struct ScoringEngine {
    rules: BTreeMap<AgeGroup, Arc<dyn ScoringRule>>,
}

impl ScoringEngine {
    /// Engine with no rules; every age group is rejected until one is registered.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Engine carrying the production rule for each age group.
    pub fn standard() -> Self {
        Self::empty()
            .register(AgeGroup::Age1, TotalScoreRule)
            .register(AgeGroup::Age2, BandedTotalRule::default())
            .register(AgeGroup::Age3, WorstAnswerPatternRule::default())
    }

    pub fn register<R>(mut self, age_group: AgeGroup, rule: R) -> Self
    where
        R: ScoringRule + 'static,
    {
        self.rules.insert(age_group, Arc::new(rule));
        self
    }

    pub fn registered(&self) -> impl Iterator<Item = AgeGroup> + '_ {
        self.rules.keys().copied()
    }

    /// Input contract shared by every rule.
    pub fn validate(&self, answers: &[i64]) -> Result<AnswerSet, ValidationError> {
        AnswerSet::new(answers)
    }

    /// Scores an already validated answer set for the tagged age group.
    pub fn score(&self, age_group: &str, answers: &AnswerSet) -> Result<ScoreResult, ScoringError> {
        let group: AgeGroup = age_group.parse()?;
        let rule = self
            .rules
            .get(&group)
            .ok_or_else(|| UnknownAgeGroup(age_group.to_string()))?;

        let threshold = answers.threshold();
        let RuleOutcome { score, category } = rule.score(answers, threshold);

        Ok(ScoreResult {
            age_group: group,
            score,
            threshold,
            category,
        })
    }

    pub fn evaluate(&self, age_group: &str, answers: &[i64]) -> Result<ScoreResult, ScoringError> {
        let answers = self.validate(answers)?;
        self.score(age_group, &answers)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Failure raised while scoring a submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    UnknownAgeGroup(#[from] UnknownAgeGroup),
}
