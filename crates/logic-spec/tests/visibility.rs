use serde_json::json;

use logic_spec::{
    AnswerMap, AnswerValue, Condition, LogicRule, QuestionLogic, QuestionSpec, QuestionType,
    RuleValue, SurveySpec, evaluate_question_logic, get_visible_questions, hidden_answers,
    resolve_visibility,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "feedback_survey" => include_str!("../tests/fixtures/feedback_survey.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn feedback() -> SurveySpec {
    SurveySpec::from_json_str(fixture("feedback_survey")).expect("deserialize")
}

fn rating_pair() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new("Q1", QuestionType::RatingScale, 0),
        QuestionSpec::new("Q2", QuestionType::FreeText, 1).with_logic(QuestionLogic::all(vec![
            LogicRule::new("Q1", Condition::Equals, "4"),
        ])),
    ]
}

#[test]
fn questions_without_logic_are_always_visible() {
    let answers = AnswerMap::from_iter([("x", AnswerValue::Text("anything".into()))]);
    assert!(evaluate_question_logic(None, &answers));
    assert!(evaluate_question_logic(Some(&QuestionLogic::default()), &answers));
    assert!(evaluate_question_logic(Some(&QuestionLogic::any(vec![])), &AnswerMap::new()));
}

#[test]
fn rating_answer_gates_follow_up() {
    let questions = rating_pair();

    let four = AnswerMap::from_json(&questions, &json!({ "Q1": 4 }));
    assert!(get_visible_questions(&questions, &four).contains("Q2"));

    let three = AnswerMap::from_json(&questions, &json!({ "Q1": 3 }));
    let visible = get_visible_questions(&questions, &three);
    assert!(visible.contains("Q1"));
    assert!(!visible.contains("Q2"));
}

#[test]
fn unanswered_trigger_hides_gated_question() {
    let questions = rating_pair();
    let visible = get_visible_questions(&questions, &AnswerMap::new());
    assert_eq!(visible.into_iter().collect::<Vec<_>>(), vec!["Q1"]);
}

#[test]
fn or_operator_needs_one_passing_rule() {
    let questions = vec![
        QuestionSpec::new("Q1", QuestionType::RatingScale, 0),
        QuestionSpec::new("Q2", QuestionType::MultiSelect, 1),
        QuestionSpec::new("Q3", QuestionType::FreeText, 2).with_logic(QuestionLogic::any(vec![
            LogicRule::new("Q1", Condition::Equals, "5"),
            LogicRule::new("Q2", Condition::Contains, "x"),
        ])),
    ];

    let only_rating = AnswerMap::from_json(&questions, &json!({ "Q1": 5, "Q2": ["y"] }));
    assert!(get_visible_questions(&questions, &only_rating).contains("Q3"));

    let only_topic = AnswerMap::from_json(&questions, &json!({ "Q1": 2, "Q2": ["x"] }));
    assert!(get_visible_questions(&questions, &only_topic).contains("Q3"));

    let neither = AnswerMap::from_json(&questions, &json!({ "Q1": 2, "Q2": ["y"] }));
    assert!(!get_visible_questions(&questions, &neither).contains("Q3"));
}

#[test]
fn and_operator_needs_every_rule() {
    let logic = QuestionLogic::all(vec![
        LogicRule::new("a", Condition::Equals, "yes"),
        LogicRule::new("b", Condition::NotEquals, "no"),
    ]);
    let both = AnswerMap::from_iter([
        ("a", AnswerValue::Text("yes".into())),
        ("b", AnswerValue::Text("maybe".into())),
    ]);
    assert!(evaluate_question_logic(Some(&logic), &both));

    let one = AnswerMap::from_iter([("a", AnswerValue::Text("yes".into()))]);
    assert!(!evaluate_question_logic(Some(&logic), &one));
}

#[test]
fn fixture_survey_resolves_per_answers() {
    let spec = feedback();
    let answers = AnswerMap::from_json(
        &spec.questions,
        &json!({
            "q_rating": "2",
            "q_topics": ["Price", "Ease of use"],
            "q_recommend": "No",
        }),
    );

    let visibility = resolve_visibility(&spec.questions, &answers);
    assert!(visibility["q_rating"]);
    assert!(!visibility["q_followup"]);
    assert!(visibility["q_detail"]);
    assert!(visibility["q_why_not"]);
}

#[test]
fn contains_list_uses_any_match() {
    let spec = feedback();
    let support_only = AnswerMap::from_json(&spec.questions, &json!({ "q_topics": ["Support"] }));
    assert!(!get_visible_questions(&spec.questions, &support_only).contains("q_detail"));
}

#[test]
fn resolution_is_idempotent() {
    let spec = feedback();
    let answers = AnswerMap::from_json(
        &spec.questions,
        &json!({ "q_rating": 4, "q_topics": ["Quality"] }),
    );
    let first = get_visible_questions(&spec.questions, &answers);
    let second = get_visible_questions(&spec.questions, &answers);
    assert_eq!(first, second);
}

#[test]
fn stale_answer_of_hidden_trigger_still_gates() {
    // q_b is hidden, but its earlier answer keeps q_c visible.
    let questions = vec![
        QuestionSpec::new("q_a", QuestionType::BooleanChoice, 0),
        QuestionSpec::new("q_b", QuestionType::SingleChoice, 1).with_logic(QuestionLogic::all(
            vec![LogicRule::new("q_a", Condition::Equals, "Yes")],
        )),
        QuestionSpec::new("q_c", QuestionType::FreeText, 2).with_logic(QuestionLogic::all(vec![
            LogicRule::new("q_b", Condition::Equals, "Blue"),
        ])),
    ];
    let answers = AnswerMap::from_json(&questions, &json!({ "q_a": "No", "q_b": "Blue" }));
    let visible = get_visible_questions(&questions, &answers);
    assert!(!visible.contains("q_b"));
    assert!(visible.contains("q_c"));
    assert_eq!(hidden_answers(&questions, &answers), vec!["q_b"]);
}

#[test]
fn not_equals_on_multi_select_compares_whole_selection() {
    let questions = vec![
        QuestionSpec::new("topics", QuestionType::MultiSelect, 0),
        QuestionSpec::new("other", QuestionType::FreeText, 1).with_logic(QuestionLogic::all(vec![
            LogicRule::new("topics", Condition::NotEquals, "None"),
        ])),
    ];
    let none = AnswerMap::from_json(&questions, &json!({ "topics": ["None"] }));
    assert!(!get_visible_questions(&questions, &none).contains("other"));

    let some = AnswerMap::from_json(&questions, &json!({ "topics": ["None", "Price"] }));
    assert!(get_visible_questions(&questions, &some).contains("other"));
}

#[test]
fn logic_roundtrips_builder_json() {
    let logic: QuestionLogic = serde_json::from_value(json!({
        "rules": [
            { "triggerQuestionId": "q1", "condition": "contains", "value": ["a", "b"] }
        ]
    }))
    .expect("deserialize");
    assert_eq!(logic.operator, logic_spec::LogicOperator::And);
    assert_eq!(
        logic.rules[0].value,
        RuleValue::List(vec!["a".into(), "b".into()])
    );

    let encoded = serde_json::to_value(&logic).expect("serialize");
    assert_eq!(encoded["operator"], "AND");
    assert_eq!(encoded["rules"][0]["triggerQuestionId"], "q1");
}
