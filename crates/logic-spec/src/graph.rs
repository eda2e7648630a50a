use std::collections::{HashMap, HashSet};

use crate::error::LogicError;
use crate::spec::question::QuestionSpec;

/// Trigger relationships between questions: each question points at the
/// questions its rules read from.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    ids: Vec<&'a str>,
    order: HashMap<&'a str, i64>,
    triggers: HashMap<&'a str, Vec<&'a str>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(questions: &'a [QuestionSpec]) -> Self {
        let mut sorted: Vec<&QuestionSpec> = questions.iter().collect();
        sorted.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let mut ids = Vec::with_capacity(sorted.len());
        let mut order = HashMap::with_capacity(sorted.len());
        let mut triggers: HashMap<&str, Vec<&str>> = HashMap::new();
        for question in sorted {
            if order.insert(question.id.as_str(), question.order).is_none() {
                ids.push(question.id.as_str());
            }
            let edges = triggers.entry(question.id.as_str()).or_default();
            for trigger in question.trigger_ids() {
                if !edges.contains(&trigger) {
                    edges.push(trigger);
                }
            }
        }

        Self {
            ids,
            order,
            triggers,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.order.contains_key(id)
    }

    /// Known questions the given question's rules read from.
    pub fn triggers_of(&self, id: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.triggers
            .get(id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|trigger| self.contains(trigger))
    }

    /// Checks whether `question_id` may gain a rule reading from `trigger_id`.
    ///
    /// Unknown ids are not reported here; the rule validator covers them.
    pub fn check(&self, question_id: &str, trigger_id: &str) -> Result<(), LogicError> {
        if question_id == trigger_id {
            return Err(LogicError::SelfReference(question_id.to_string()));
        }

        let (Some(question_order), Some(trigger_order)) =
            (self.order.get(question_id), self.order.get(trigger_id))
        else {
            return Ok(());
        };

        if trigger_order >= question_order {
            return Err(LogicError::ForwardReference {
                question_id: question_id.to_string(),
                trigger_id: trigger_id.to_string(),
            });
        }

        match self.path_between(trigger_id, question_id) {
            Some(chain) => {
                let mut path = Vec::with_capacity(chain.len() + 1);
                path.push(question_id.to_string());
                path.extend(chain.into_iter().map(str::to_string));
                tracing::debug!(path = ?path, "rule would close a dependency cycle");
                Err(LogicError::Cycle { path })
            }
            None => Ok(()),
        }
    }

    /// Depth-first walk along trigger edges from `from`, returning the chain
    /// `from -> ... -> to` when `to` is reachable.
    fn path_between(&self, from: &str, to: &str) -> Option<Vec<&'a str>> {
        let from = *self.order.get_key_value(from)?.0;
        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::from([from]);
        let mut stack = vec![from];

        while let Some(node) = stack.pop() {
            if node == to {
                let mut chain = vec![node];
                let mut cursor = node;
                while let Some(&previous) = parent.get(cursor) {
                    chain.push(previous);
                    cursor = previous;
                }
                chain.reverse();
                return Some(chain);
            }
            for next in self.triggers_of(node) {
                if visited.insert(next) {
                    parent.insert(next, node);
                    stack.push(next);
                }
            }
        }

        None
    }

    /// Question ids ordered so every trigger precedes the questions reading it.
    ///
    /// Fails with the first cycle found.
    pub fn topological_order(&self) -> Result<Vec<String>, LogicError> {
        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(self.ids.len());
        let mut sorted = Vec::with_capacity(self.ids.len());

        for &root in &self.ids {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

            while let Some(&(node, cursor)) = stack.last() {
                match self.triggers_of(node).nth(cursor) {
                    Some(next) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        match marks.get(next).copied() {
                            Some(Mark::InProgress) => {
                                let start = stack
                                    .iter()
                                    .position(|(id, _)| *id == next)
                                    .unwrap_or_default();
                                let mut path: Vec<String> =
                                    stack[start..].iter().map(|(id, _)| id.to_string()).collect();
                                path.push(next.to_string());
                                return Err(LogicError::Cycle { path });
                            }
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(next, Mark::InProgress);
                                stack.push((next, 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(node, Mark::Done);
                        sorted.push(node.to_string());
                        stack.pop();
                    }
                }
            }
        }

        Ok(sorted)
    }
}

/// True when making `question_id` depend on `trigger_id` is illegal: a self
/// reference, a trigger that does not come earlier, or a cycle.
pub fn detect_circular_dependency(
    question_id: &str,
    trigger_id: &str,
    questions: &[QuestionSpec],
) -> bool {
    DependencyGraph::new(questions)
        .check(question_id, trigger_id)
        .is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::logic::{Condition, LogicRule, QuestionLogic};
    use crate::spec::question::QuestionType;

    fn gated(id: &str, order: i64, trigger: &str) -> QuestionSpec {
        QuestionSpec::new(id, QuestionType::SingleChoice, order).with_logic(QuestionLogic::all(
            vec![LogicRule::new(trigger, Condition::Equals, "yes")],
        ))
    }

    #[test]
    fn cycle_path_starts_and_ends_with_the_question() {
        // Malformed data: A already reads from C although C comes later.
        let questions = vec![
            gated("a", 0, "c"),
            gated("b", 1, "a"),
            QuestionSpec::new("c", QuestionType::SingleChoice, 2),
        ];
        let err = DependencyGraph::new(&questions)
            .check("c", "b")
            .expect_err("cycle");
        assert_eq!(
            err,
            LogicError::Cycle {
                path: vec!["c".into(), "b".into(), "a".into(), "c".into()]
            }
        );
    }

    #[test]
    fn topological_order_puts_triggers_first() {
        let questions = vec![
            gated("c", 2, "b"),
            gated("b", 1, "a"),
            QuestionSpec::new("a", QuestionType::SingleChoice, 0),
        ];
        let order = DependencyGraph::new(&questions)
            .topological_order()
            .expect("acyclic");
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn topological_order_reports_cycle() {
        let questions = vec![gated("a", 0, "b"), gated("b", 1, "a")];
        let err = DependencyGraph::new(&questions)
            .topological_order()
            .expect_err("cycle");
        assert_eq!(err.code(), "cycle");
    }

    #[test]
    fn dangling_triggers_are_ignored_by_the_walk() {
        let questions = vec![gated("a", 0, "deleted"), gated("b", 1, "a")];
        let graph = DependencyGraph::new(&questions);
        assert_eq!(graph.triggers_of("a").count(), 0);
        assert!(graph.topological_order().is_ok());
    }
}
