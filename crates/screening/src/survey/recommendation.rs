use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::domain::{AgeGroup, Category, ScoreResult, Submission};

type TemplateTable = BTreeMap<AgeGroup, BTreeMap<Category, String>>;

/// Recommendation templates keyed by age group and category.
///
/// Templates may reference `{score}`, `{threshold}` and `{answers}` (the number
/// of answers submitted); all are substituted when a message is composed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RecommendationCatalog {
    templates: TemplateTable,
}

impl RecommendationCatalog {
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Built-in English messages covering every category the standard rules emit.
    pub fn standard() -> Self {
        Self::new()
            .with_template(
                AgeGroup::Age1,
                Category::BelowThreshold,
                "Your child's answers do not point to an elevated risk at this age. \
                 Keep reading together and playing with rhymes and letter sounds.",
            )
            .with_template(
                AgeGroup::Age1,
                Category::AtOrAboveThreshold,
                "Your child's answers suggest an elevated risk of early literacy difficulties. \
                 We recommend discussing these results with a pediatrician or early years specialist.",
            )
            .with_template(
                AgeGroup::Age2,
                Category::BelowThreshold,
                "Your child's answers do not point to an elevated risk. \
                 Continue to encourage daily reading and check in with their teacher on progress.",
            )
            .with_template(
                AgeGroup::Age2,
                Category::Borderline,
                "Your child's answers are close to the risk threshold. \
                 Watch how reading and spelling develop over the next months and repeat the checklist.",
            )
            .with_template(
                AgeGroup::Age2,
                Category::AtOrAboveThreshold,
                "Your child's answers suggest an elevated risk of reading difficulties. \
                 We recommend a formal assessment by a qualified educational psychologist.",
            )
            .with_template(
                AgeGroup::Age3,
                Category::BelowThreshold,
                "The answers do not point to an elevated risk. \
                 No further action is needed at this time.",
            )
            .with_template(
                AgeGroup::Age3,
                Category::Borderline,
                "Several answers indicate persistent difficulties even though the overall score is below the threshold. \
                 Share these results with the school's learning support team.",
            )
            .with_template(
                AgeGroup::Age3,
                Category::AtOrAboveThreshold,
                "The answers suggest an elevated risk of a specific learning difficulty. \
                 We recommend a full diagnostic assessment and a conversation with the school about support.",
            )
    }

    pub fn with_template(
        mut self,
        age_group: AgeGroup,
        category: Category,
        template: impl Into<String>,
    ) -> Self {
        self.templates
            .entry(age_group)
            .or_default()
            .insert(category, template.into());
        self
    }

    /// Parses a catalog from `{ "age1": { "below_threshold": "..." } }` JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn template(&self, age_group: AgeGroup, category: Category) -> Option<&str> {
        self.templates
            .get(&age_group)
            .and_then(|by_category| by_category.get(&category))
            .map(String::as_str)
    }

    /// Composes the user-facing message for a scored submission.
    pub fn compose(
        &self,
        submission: &Submission,
        result: &ScoreResult,
    ) -> Result<String, RecommendationError> {
        let template = self
            .template(result.age_group, result.category)
            .filter(|template| !template.trim().is_empty())
            .ok_or(RecommendationError::MissingTemplate {
                age_group: result.age_group,
                category: result.category,
            })?;

        Ok(template
            .replace("{score}", &result.score.to_string())
            .replace("{threshold}", &format!("{:.1}", result.threshold))
            .replace("{answers}", &submission.survey.len().to_string()))
    }
}

impl Default for RecommendationCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Raised when no message is configured for a produced category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendationError {
    #[error("no recommendation template for {age_group} / {category}")]
    MissingTemplate {
        age_group: AgeGroup,
        category: Category,
    },
}

/// Failure loading a template catalog from disk.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read recommendation templates: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid recommendation templates: {0}")]
    Parse(#[from] serde_json::Error),
}
