use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Comparison applied between a trigger answer and a rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals,
    NotEquals,
    Contains,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Equals => "equals",
            Condition::NotEquals => "not_equals",
            Condition::Contains => "contains",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value a rule compares against. Authored as strings; `contains` takes a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleValue {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for RuleValue {
    fn from(values: Vec<String>) -> Self {
        RuleValue::List(values)
    }
}

/// A single condition on an earlier question's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogicRule {
    #[serde(alias = "trigger_question_id")]
    pub trigger_question_id: String,
    pub condition: Condition,
    pub value: RuleValue,
}

impl LogicRule {
    pub fn new(
        trigger_question_id: impl Into<String>,
        condition: Condition,
        value: impl Into<RuleValue>,
    ) -> Self {
        Self {
            trigger_question_id: trigger_question_id.into(),
            condition,
            value: value.into(),
        }
    }
}

/// How the results of a question's rules are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// Flat group of rules gating one question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct QuestionLogic {
    #[serde(default)]
    pub rules: Vec<LogicRule>,
    #[serde(default)]
    pub operator: LogicOperator,
}

impl QuestionLogic {
    pub fn all(rules: Vec<LogicRule>) -> Self {
        Self {
            rules,
            operator: LogicOperator::And,
        }
    }

    pub fn any(rules: Vec<LogicRule>) -> Self {
        Self {
            rules,
            operator: LogicOperator::Or,
        }
    }
}
