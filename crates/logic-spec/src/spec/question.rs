use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::logic::{Condition, QuestionLogic};

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "MULTIPLE_CHOICE")]
    SingleChoice,
    #[serde(alias = "TEXT")]
    FreeText,
    #[serde(alias = "RATING")]
    RatingScale,
    #[serde(alias = "CHECKBOX")]
    MultiSelect,
    #[serde(alias = "DROPDOWN")]
    Dropdown,
    #[serde(alias = "YES_NO")]
    BooleanChoice,
}

impl QuestionType {
    /// Conditions a rule may use when a question of this kind is its trigger.
    pub fn allowed_conditions(self) -> &'static [Condition] {
        match self {
            QuestionType::SingleChoice
            | QuestionType::Dropdown
            | QuestionType::BooleanChoice
            | QuestionType::RatingScale
            | QuestionType::FreeText => &[Condition::Equals, Condition::NotEquals],
            QuestionType::MultiSelect => &[Condition::Contains, Condition::NotEquals],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single choice",
            QuestionType::FreeText => "free text",
            QuestionType::RatingScale => "rating scale",
            QuestionType::MultiSelect => "multi-select",
            QuestionType::Dropdown => "dropdown",
            QuestionType::BooleanChoice => "yes/no",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Definition of a single survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub title: String,
    /// Fixed position in the survey; triggers must come strictly earlier.
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<QuestionLogic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

impl QuestionSpec {
    pub fn new(id: impl Into<String>, kind: QuestionType, order: i64) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            kind,
            order,
            logic: None,
            options: None,
            required: false,
        }
    }

    pub fn with_logic(mut self, logic: QuestionLogic) -> Self {
        self.logic = Some(logic);
        self
    }

    /// Ids of the questions this question's rules read from.
    pub fn trigger_ids(&self) -> impl Iterator<Item = &str> {
        self.logic
            .iter()
            .flat_map(|logic| logic.rules.iter())
            .map(|rule| rule.trigger_question_id.as_str())
    }
}
