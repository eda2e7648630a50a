use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::spec::question::QuestionSpec;

/// A survey as seen by the logic engine: its questions and their rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

impl SurveySpec {
    pub fn new(id: impl Into<String>, questions: Vec<QuestionSpec>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            description: None,
            questions,
        }
    }

    /// Parses a survey from JSON, rejecting duplicate question ids.
    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        let spec: SurveySpec = serde_json::from_str(raw)?;
        spec.ensure_unique_ids()?;
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Questions sorted by their survey position.
    pub fn ordered_questions(&self) -> Vec<&QuestionSpec> {
        let mut ordered: Vec<_> = self.questions.iter().collect();
        ordered.sort_by_key(|question| question.order);
        ordered
    }

    /// Removes a question and reports which questions still point at it.
    ///
    /// Dependent rules are left untouched; they stay invalid until the author
    /// picks another trigger.
    pub fn remove_question(&mut self, id: &str) -> Option<(QuestionSpec, Vec<String>)> {
        let index = self.questions.iter().position(|question| question.id == id)?;
        let removed = self.questions.remove(index);
        let dependents = self
            .questions
            .iter()
            .filter(|question| question.trigger_ids().any(|trigger| trigger == id))
            .map(|question| question.id.clone())
            .collect();
        Some((removed, dependents))
    }

    pub(crate) fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                duplicates.insert(question.id.clone());
            }
        }
        duplicates.into_iter().collect()
    }

    fn ensure_unique_ids(&self) -> Result<(), SpecError> {
        match self.duplicate_ids().into_iter().next() {
            Some(id) => Err(SpecError::DuplicateQuestionId(id)),
            None => Ok(()),
        }
    }
}
