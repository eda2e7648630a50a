use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::spec::question::{QuestionSpec, QuestionType};

/// A respondent's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Multi(Vec<String>),
}

impl AnswerValue {
    /// Empty text and an empty selection count as "not answered".
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Multi(items) => items.is_empty(),
            AnswerValue::Bool(_) | AnswerValue::Number(_) => false,
        }
    }

    /// Converts a raw JSON value by its shape alone.
    pub fn from_json_loose(value: &Value) -> Option<Self> {
        let answer = match value {
            Value::Null | Value::Object(_) => return None,
            Value::Bool(flag) => AnswerValue::Bool(*flag),
            Value::Number(number) => AnswerValue::Number(number.as_f64()?),
            Value::String(text) => AnswerValue::Text(text.clone()),
            Value::Array(items) => {
                AnswerValue::Multi(items.iter().filter_map(json_to_text).collect())
            }
        };
        (!answer.is_empty()).then_some(answer)
    }

    /// Converts a raw JSON value using the declared type of the question.
    ///
    /// Values that do not fit the declared type keep the shape they arrived in.
    pub fn from_json_typed(kind: QuestionType, value: &Value) -> Option<Self> {
        let answer = match (kind, value) {
            (QuestionType::RatingScale, Value::String(text)) => match text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
            {
                Some(number) => AnswerValue::Number(number),
                None => AnswerValue::Text(text.clone()),
            },
            (QuestionType::BooleanChoice, Value::String(text)) => match parse_flag(text) {
                Some(flag) => AnswerValue::Bool(flag),
                None => AnswerValue::Text(text.clone()),
            },
            (QuestionType::MultiSelect, Value::String(text)) => {
                AnswerValue::Multi(vec![text.clone()])
            }
            (
                QuestionType::SingleChoice | QuestionType::FreeText | QuestionType::Dropdown,
                Value::Number(_) | Value::Bool(_),
            ) => AnswerValue::Text(json_to_text(value)?),
            _ => return Self::from_json_loose(value),
        };
        (!answer.is_empty()).then_some(answer)
    }
}

pub(crate) fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_to_text(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whole floats such as `4.0` render as `4` so they compare like the integer.
fn number_to_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 9.0e15 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

/// Current answers keyed by question id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from untyped answers, coercing by each question's type.
    ///
    /// Unanswered entries (`null`, `""`, `[]`) are dropped. Keys that do not
    /// name a question are kept with their loose shape.
    pub fn from_json(questions: &[QuestionSpec], answers: &Value) -> Self {
        let Some(object) = answers.as_object() else {
            return Self::default();
        };

        let mut map = BTreeMap::new();
        for (key, raw) in object {
            let kind = questions
                .iter()
                .find(|question| &question.id == key)
                .map(|question| question.kind);
            let answer = match kind {
                Some(kind) => AnswerValue::from_json_typed(kind, raw),
                None => AnswerValue::from_json_loose(raw),
            };
            match answer {
                Some(answer) => {
                    map.insert(key.clone(), answer);
                }
                None => tracing::trace!(question_id = %key, "skipping unanswered value"),
            }
        }
        Self(map)
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    /// Stores an answer; empty answers clear the entry instead.
    pub fn insert(&mut self, question_id: impl Into<String>, answer: AnswerValue) {
        let question_id = question_id.into();
        if answer.is_empty() {
            self.0.remove(&question_id);
        } else {
            self.0.insert(question_id, answer);
        }
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (K, AnswerValue)>>(iter: I) -> Self {
        let mut map = AnswerMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
