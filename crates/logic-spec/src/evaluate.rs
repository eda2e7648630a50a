use serde_json::Value;

use crate::answers::{AnswerValue, parse_flag};
use crate::spec::logic::{Condition, LogicRule, RuleValue};

/// Decides whether `rule` holds for the trigger's current answer.
///
/// Unanswered triggers never satisfy a rule, whatever the condition.
pub fn evaluate_rule(rule: &LogicRule, answer: Option<&AnswerValue>) -> bool {
    let Some(answer) = answer.filter(|answer| !answer.is_empty()) else {
        return false;
    };

    match rule.condition {
        Condition::Equals => matches_value(answer, &rule.value),
        Condition::NotEquals => !matches_value(answer, &rule.value),
        Condition::Contains => contains_any(answer, &rule.value),
    }
}

/// Same as [`evaluate_rule`] for an answer that has not been typed yet.
pub fn evaluate_rule_json(rule: &LogicRule, answer: Option<&Value>) -> bool {
    let answer = answer.and_then(AnswerValue::from_json_loose);
    evaluate_rule(rule, answer.as_ref())
}

fn matches_value(answer: &AnswerValue, expected: &RuleValue) -> bool {
    match (answer, expected) {
        (AnswerValue::Text(text), RuleValue::Single(value)) => text == value,
        (AnswerValue::Number(number), RuleValue::Single(value)) => {
            parse_rule_number(value).is_some_and(|parsed| parsed == *number)
        }
        (AnswerValue::Bool(flag), RuleValue::Single(value)) => parse_flag(value) == Some(*flag),
        (AnswerValue::Multi(items), RuleValue::Single(value)) => {
            items.len() == 1 && items[0] == *value
        }
        (AnswerValue::Multi(items), RuleValue::List(values)) => items == values,
        (AnswerValue::Text(_) | AnswerValue::Number(_) | AnswerValue::Bool(_), RuleValue::List(_)) => {
            false
        }
    }
}

fn contains_any(answer: &AnswerValue, expected: &RuleValue) -> bool {
    let AnswerValue::Multi(items) = answer else {
        return false;
    };
    match expected {
        RuleValue::Single(value) => items.contains(value),
        RuleValue::List(values) => values.iter().any(|value| items.contains(value)),
    }
}

// Rule values are authored as strings; rating answers arrive as numbers.
fn parse_rule_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .map(|parsed| parsed as f64)
        .or_else(|_| trimmed.parse::<f64>())
        .ok()
}
