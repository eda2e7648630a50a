use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::LogicError;
use crate::graph::DependencyGraph;
use crate::spec::logic::{Condition, LogicRule, RuleValue};
use crate::spec::question::QuestionSpec;
use crate::spec::survey::SurveySpec;

/// Outcome of checking one rule, in the shape the builder displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), LogicError>> for RuleValidation {
    fn from(result: Result<(), LogicError>) -> Self {
        match result {
            Ok(()) => RuleValidation {
                valid: true,
                error: None,
            },
            Err(err) => RuleValidation {
                valid: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Checks that `rule` fits the type of the question it reads from.
pub fn check_logic_rule(rule: &LogicRule, questions: &[QuestionSpec]) -> Result<(), LogicError> {
    let trigger = questions
        .iter()
        .find(|question| question.id == rule.trigger_question_id)
        .ok_or_else(|| LogicError::UnknownTrigger(rule.trigger_question_id.clone()))?;

    if !trigger.kind.allowed_conditions().contains(&rule.condition) {
        return Err(LogicError::ConditionNotAllowed {
            condition: rule.condition,
            kind: trigger.kind,
        });
    }

    match (rule.condition, &rule.value) {
        (Condition::Contains, RuleValue::List(values)) if !values.is_empty() => Ok(()),
        (Condition::Contains, _) => Err(LogicError::ExpectedList {
            condition: rule.condition,
        }),
        (Condition::Equals | Condition::NotEquals, RuleValue::List(_)) => {
            Err(LogicError::ExpectedSingle {
                condition: rule.condition,
            })
        }
        _ => Ok(()),
    }
}

pub fn validate_logic_rule(rule: &LogicRule, questions: &[QuestionSpec]) -> RuleValidation {
    let result = check_logic_rule(rule, questions);
    if let Err(err) = &result {
        tracing::debug!(
            trigger = %rule.trigger_question_id,
            condition = %rule.condition,
            code = err.code(),
            "rejected logic rule"
        );
    }
    result.into()
}

/// Gate to run before persisting a rule on `question_id`: the rule must fit
/// its trigger and must not introduce an illegal dependency.
pub fn check_rule_edit(
    question_id: &str,
    rule: &LogicRule,
    questions: &[QuestionSpec],
) -> Result<(), LogicError> {
    if !questions.iter().any(|question| question.id == question_id) {
        return Err(LogicError::UnknownQuestion(question_id.to_string()));
    }
    check_logic_rule(rule, questions)?;
    DependencyGraph::new(questions).check(question_id, &rule.trigger_question_id)
}

/// One problem found while linting a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogicIssue {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
    pub message: String,
    pub code: String,
}

impl LogicIssue {
    fn from_error(question_id: &str, rule_index: Option<usize>, err: &LogicError) -> Self {
        Self {
            question_id: question_id.to_string(),
            rule_index,
            message: err.to_string(),
            code: err.code().into(),
        }
    }
}

/// Result of [`validate_survey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveyReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<LogicIssue>,
}

/// Lints every rule in the survey, e.g. after a question has been deleted.
pub fn validate_survey(spec: &SurveySpec) -> SurveyReport {
    let mut issues = Vec::new();

    for id in spec.duplicate_ids() {
        issues.push(LogicIssue {
            question_id: id.clone(),
            rule_index: None,
            message: format!("duplicate question id '{}'", id),
            code: "duplicate_id".into(),
        });
    }

    let graph = DependencyGraph::new(&spec.questions);
    for question in spec.ordered_questions() {
        let Some(logic) = &question.logic else {
            continue;
        };
        for (index, rule) in logic.rules.iter().enumerate() {
            let result = check_logic_rule(rule, &spec.questions)
                .and_then(|_| graph.check(&question.id, &rule.trigger_question_id));
            if let Err(err) = result {
                issues.push(LogicIssue::from_error(&question.id, Some(index), &err));
            }
        }
    }

    // Cycles found per rule are already reported.
    if issues.iter().all(|issue| issue.code != "cycle")
        && let Err(err) = graph.topological_order()
        && let LogicError::Cycle { path } = &err
    {
        let question_id = path.first().cloned().unwrap_or_default();
        issues.push(LogicIssue::from_error(&question_id, None, &err));
    }

    tracing::debug!(survey = %spec.id, issues = issues.len(), "validated survey logic");

    SurveyReport {
        valid: issues.is_empty(),
        issues,
    }
}
