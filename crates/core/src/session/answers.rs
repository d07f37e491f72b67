use std::collections::HashMap;

use crate::model::QuestionId;

/// Selected option per question. A missing entry means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    selections: HashMap<QuestionId, usize>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, question: &QuestionId) -> Option<usize> {
        self.selections.get(question).copied()
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.selections.contains_key(question)
    }

    /// Stores a selection, returning the one it replaced.
    pub(crate) fn record(&mut self, question: QuestionId, option: usize) -> Option<usize> {
        self.selections.insert(question, option)
    }

    pub(crate) fn clear(&mut self) {
        self.selections.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, usize)> {
        self.selections.iter().map(|(id, option)| (id, *option))
    }
}

impl FromIterator<(QuestionId, usize)> for AnswerRecord {
    fn from_iter<T: IntoIterator<Item = (QuestionId, usize)>>(iter: T) -> Self {
        Self {
            selections: iter.into_iter().collect(),
        }
    }
}
