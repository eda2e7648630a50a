#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod evaluate;
pub mod graph;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerMap, AnswerValue};
pub use error::{LogicError, SpecError};
pub use evaluate::{evaluate_rule, evaluate_rule_json};
pub use graph::{DependencyGraph, detect_circular_dependency};
pub use schema::survey_schema;
pub use spec::{
    Condition, LogicOperator, LogicRule, QuestionLogic, QuestionSpec, QuestionType, RuleValue,
    SurveySpec,
};
pub use validate::{
    LogicIssue, RuleValidation, SurveyReport, check_logic_rule, check_rule_edit,
    validate_logic_rule, validate_survey,
};
pub use visibility::{
    VisibilityMap, evaluate_question_logic, get_visible_questions, hidden_answers,
    resolve_visibility,
};
