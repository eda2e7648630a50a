pub mod logic;
pub mod question;
pub mod survey;

pub use logic::{Condition, LogicOperator, LogicRule, QuestionLogic, RuleValue};
pub use question::{QuestionSpec, QuestionType};
pub use survey::SurveySpec;
