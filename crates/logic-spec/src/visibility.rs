use std::collections::{BTreeMap, BTreeSet};

use crate::answers::AnswerMap;
use crate::evaluate::evaluate_rule;
use crate::spec::logic::{LogicOperator, QuestionLogic};
use crate::spec::question::QuestionSpec;

pub type VisibilityMap = BTreeMap<String, bool>;

/// Decides whether a question gated by `logic` is shown for `answers`.
///
/// Each rule reads its trigger's answer value only; whether the trigger is
/// itself visible is not taken into account.
pub fn evaluate_question_logic(logic: Option<&QuestionLogic>, answers: &AnswerMap) -> bool {
    let Some(logic) = logic.filter(|logic| !logic.rules.is_empty()) else {
        return true;
    };

    let mut results = logic
        .rules
        .iter()
        .map(|rule| evaluate_rule(rule, answers.get(&rule.trigger_question_id)));

    match logic.operator {
        LogicOperator::And => results.all(|passed| passed),
        LogicOperator::Or => results.any(|passed| passed),
    }
}

pub fn resolve_visibility(questions: &[QuestionSpec], answers: &AnswerMap) -> VisibilityMap {
    let map: VisibilityMap = questions
        .iter()
        .map(|question| {
            let visible = evaluate_question_logic(question.logic.as_ref(), answers);
            (question.id.clone(), visible)
        })
        .collect();

    tracing::debug!(
        questions = map.len(),
        visible = map.values().filter(|visible| **visible).count(),
        "resolved visibility"
    );
    map
}

/// Ids of the questions currently shown.
pub fn get_visible_questions(questions: &[QuestionSpec], answers: &AnswerMap) -> BTreeSet<String> {
    resolve_visibility(questions, answers)
        .into_iter()
        .filter_map(|(id, visible)| visible.then_some(id))
        .collect()
}

/// Hidden questions that still hold an answer; the renderer should clear or ignore these.
pub fn hidden_answers(questions: &[QuestionSpec], answers: &AnswerMap) -> Vec<String> {
    resolve_visibility(questions, answers)
        .into_iter()
        .filter(|(id, visible)| !visible && answers.contains(id))
        .map(|(id, _)| id)
        .collect()
}
