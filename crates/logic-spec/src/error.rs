use std::path::PathBuf;

use thiserror::Error;

use crate::spec::{Condition, QuestionType};

/// Reasons a rule cannot be saved.
///
/// The display text is shown to survey authors as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error("Trigger question '{0}' not found")]
    UnknownTrigger(String),
    #[error("Question '{0}' not found")]
    UnknownQuestion(String),
    #[error("Condition \"{condition}\" is not supported for {kind} questions")]
    ConditionNotAllowed {
        condition: Condition,
        kind: QuestionType,
    },
    #[error("Condition \"{condition}\" requires a list of values")]
    ExpectedList { condition: Condition },
    #[error("Condition \"{condition}\" requires a single value")]
    ExpectedSingle { condition: Condition },
    #[error("Question '{0}' cannot depend on itself")]
    SelfReference(String),
    #[error(
        "Question '{question_id}' cannot depend on '{trigger_id}' because it does not come earlier in the survey"
    )]
    ForwardReference {
        question_id: String,
        trigger_id: String,
    },
    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

impl LogicError {
    /// Stable machine-readable code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            LogicError::UnknownTrigger(_) => "unknown_trigger",
            LogicError::UnknownQuestion(_) => "unknown_question",
            LogicError::ConditionNotAllowed { .. } => "condition_not_allowed",
            LogicError::ExpectedList { .. } => "expected_list",
            LogicError::ExpectedSingle { .. } => "expected_single",
            LogicError::SelfReference(_) => "self_reference",
            LogicError::ForwardReference { .. } => "forward_reference",
            LogicError::Cycle { .. } => "cycle",
        }
    }

    /// Whether the error concerns the dependency graph rather than the rule's shape.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LogicError::SelfReference(_)
                | LogicError::ForwardReference { .. }
                | LogicError::Cycle { .. }
        )
    }
}

/// Failures while loading a survey definition.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse survey json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(String),
}
