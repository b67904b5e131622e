use super::super::domain::{AnswerSet, Category};

/// Numeric score and category produced by a single age-group rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub score: u32,
    pub category: Category,
}

/// Per-age-group scoring strategy.
pub trait ScoringRule: Send + Sync {
    fn score(&self, answers: &AnswerSet, threshold: f64) -> RuleOutcome;
}

fn at_or_above(score: u32, threshold: f64) -> bool {
    f64::from(score) >= threshold
}

/// Plain total with a single cut at the threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalScoreRule;

impl ScoringRule for TotalScoreRule {
    fn score(&self, answers: &AnswerSet, threshold: f64) -> RuleOutcome {
        let score = answers.total();
        let category = if at_or_above(score, threshold) {
            Category::AtOrAboveThreshold
        } else {
            Category::BelowThreshold
        };

        RuleOutcome { score, category }
    }
}

/// Total with a borderline band just under the threshold.
#[derive(Debug, Clone, Copy)]
pub struct BandedTotalRule {
    /// Band width as a share of the worst possible score.
    pub band_fraction: f64,
}

impl Default for BandedTotalRule {
    fn default() -> Self {
        Self {
            band_fraction: 0.10,
        }
    }
}

impl ScoringRule for BandedTotalRule {
    fn score(&self, answers: &AnswerSet, threshold: f64) -> RuleOutcome {
        let score = answers.total();
        let band_floor = threshold - f64::from(answers.worst_possible_score()) * self.band_fraction;

        let category = if at_or_above(score, threshold) {
            Category::AtOrAboveThreshold
        } else if f64::from(score) >= band_floor {
            Category::Borderline
        } else {
            Category::BelowThreshold
        };

        RuleOutcome { score, category }
    }
}

/// Total with a borderline flag when too many answers sit at the worst value,
/// even if the total stays under the threshold.
#[derive(Debug, Clone, Copy)]
pub struct WorstAnswerPatternRule {
    /// Minimum share of worst-value answers that marks a submission borderline.
    pub worst_share: f64,
}

impl Default for WorstAnswerPatternRule {
    fn default() -> Self {
        Self { worst_share: 0.25 }
    }
}

impl ScoringRule for WorstAnswerPatternRule {
    fn score(&self, answers: &AnswerSet, threshold: f64) -> RuleOutcome {
        let score = answers.total();
        let worst_share = answers.worst_count() as f64 / answers.len() as f64;

        let category = if at_or_above(score, threshold) {
            Category::AtOrAboveThreshold
        } else if worst_share >= self.worst_share {
            Category::Borderline
        } else {
            Category::BelowThreshold
        };

        RuleOutcome { score, category }
    }
}
