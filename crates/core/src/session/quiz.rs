use std::fmt;

use thiserror::Error;

use crate::model::{Question, QuestionId, Quiz, Score};
use crate::session::answers::AnswerRecord;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Guard that rejected a quiz action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The current question has no recorded answer.
    CurrentUnanswered,
    /// Submitting is only possible from the last question.
    NotOnLastQuestion,
    /// The session has left the question flow; only `retake` applies.
    NotInProgress,
    /// The session was already submitted.
    AlreadyCompleted,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Precondition::CurrentUnanswered => "current question is unanswered",
            Precondition::NotOnLastQuestion => "not on the last question",
            Precondition::NotInProgress => "quiz is no longer in progress",
            Precondition::AlreadyCompleted => "quiz was already submitted",
        };
        f.write_str(msg)
    }
}

/// Rejections from `QuizSession`. State is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("option {index} is out of range for question {question} ({len} options)")]
    InvalidIndex {
        question: QuestionId,
        index: usize,
        len: usize,
    },

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("precondition not met: {0}")]
    PreconditionNotMet(Precondition),
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Phase of a quiz session.
///
/// `Completed` implies the results are showing as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    InProgress,
    ShowingResults,
    Completed,
}

/// What a successful `go_next` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at `index`.
    Moved { index: usize },
    /// Left the last question; results are now showing.
    ShowingResults,
}

/// Per-question line of the results view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct_option: usize,
}

impl QuestionOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.correct_option)
    }
}

/// Results view: the score plus one outcome per question, in quiz order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub score: Score,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Scores an answer record against a list of questions.
///
/// Unanswered questions count as wrong. An empty list scores 0 of 0 (0%).
#[must_use]
pub fn score_answers(questions: &[Question], answers: &AnswerRecord) -> Score {
    let correct = questions
        .iter()
        .filter(|q| answers.get(q.id()).is_some_and(|sel| q.is_correct(sel)))
        .count();
    Score::new(correct, questions.len())
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's pass through a quiz.
///
/// Steps through the questions in order, keeps one selected option per
/// question and moves between `InProgress`, `ShowingResults` and
/// `Completed`. The quiz definition itself is never modified.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    answers: AnswerRecord,
    phase: QuizPhase,
}

impl QuizSession {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current: 0,
            answers: AnswerRecord::new(),
            phase: QuizPhase::InProgress,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` stays below `quiz.len()` and quizzes are never empty.
        &self.quiz.questions()[self.current]
    }

    /// One-based position and total, for "Question N of M".
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.quiz.len())
    }

    #[must_use]
    pub fn is_first_question(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.quiz.len()
    }

    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answers.is_answered(self.current_question().id())
    }

    /// Whether `go_next` (or `submit` on the last question) would be accepted.
    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.phase == QuizPhase::InProgress && self.is_current_answered()
    }

    #[must_use]
    pub fn is_showing_results(&self) -> bool {
        matches!(self.phase, QuizPhase::ShowingResults | QuizPhase::Completed)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    #[must_use]
    pub fn selected_for(&self, question: &QuestionId) -> Option<usize> {
        self.answers.get(question)
    }

    /// Record (or overwrite) the selected option for a question.
    ///
    /// Returns the previously selected option, if any.
    ///
    /// # Errors
    ///
    /// Returns `UnknownQuestion` for ids outside the quiz, `InvalidIndex` when
    /// `option` is not one of the question's options, and
    /// `PreconditionNotMet(NotInProgress)` once results are showing.
    pub fn select_answer(
        &mut self,
        question: &QuestionId,
        option: usize,
    ) -> Result<Option<usize>, QuizSessionError> {
        self.ensure_in_progress()?;
        let q = self
            .quiz
            .question(question)
            .ok_or_else(|| QuizSessionError::UnknownQuestion(question.clone()))?;
        if option >= q.option_count() {
            return Err(QuizSessionError::InvalidIndex {
                question: question.clone(),
                index: option,
                len: q.option_count(),
            });
        }
        Ok(self.answers.record(question.clone(), option))
    }

    /// Select an option for the question currently shown.
    ///
    /// # Errors
    ///
    /// Same as `select_answer`.
    pub fn select_current(&mut self, option: usize) -> Result<Option<usize>, QuizSessionError> {
        let id = self.current_question().id().clone();
        self.select_answer(&id, option)
    }

    /// Move to the next question, or into the results view from the last one.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionNotMet` if the current question is unanswered or
    /// the session is not in progress.
    pub fn go_next(&mut self) -> Result<Advance, QuizSessionError> {
        self.ensure_in_progress()?;
        self.ensure_current_answered()?;

        if self.is_last_question() {
            self.phase = QuizPhase::ShowingResults;
            return Ok(Advance::ShowingResults);
        }
        self.current += 1;
        Ok(Advance::Moved {
            index: self.current,
        })
    }

    /// Step back one question. Returns `false` (and does nothing) on the first
    /// question or outside the question flow.
    pub fn go_previous(&mut self) -> bool {
        if self.phase != QuizPhase::InProgress || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Submit the quiz, marking it completed and showing results.
    ///
    /// Accepted on the last question once it is answered, or from the results
    /// view reached through `go_next`.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionNotMet` when not on the last question, when the
    /// last question is unanswered, or when already submitted.
    pub fn submit(&mut self) -> Result<Score, QuizSessionError> {
        match self.phase {
            QuizPhase::Completed => {
                return Err(QuizSessionError::PreconditionNotMet(
                    Precondition::AlreadyCompleted,
                ));
            }
            QuizPhase::InProgress => {
                if !self.is_last_question() {
                    return Err(QuizSessionError::PreconditionNotMet(
                        Precondition::NotOnLastQuestion,
                    ));
                }
                self.ensure_current_answered()?;
            }
            QuizPhase::ShowingResults => {}
        }
        self.phase = QuizPhase::Completed;
        Ok(self.compute_score())
    }

    #[must_use]
    pub fn compute_score(&self) -> Score {
        score_answers(self.quiz.questions(), &self.answers)
    }

    /// The results view; `None` while questions are still being answered.
    #[must_use]
    pub fn results(&self) -> Option<QuizResults> {
        if !self.is_showing_results() {
            return None;
        }
        let outcomes = self
            .quiz
            .questions()
            .iter()
            .map(|q| QuestionOutcome {
                question_id: q.id().clone(),
                selected: self.answers.get(q.id()),
                correct_option: q.correct_option(),
            })
            .collect();
        Some(QuizResults {
            score: self.compute_score(),
            outcomes,
        })
    }

    /// Start over: clear answers, go back to the first question.
    pub fn retake(&mut self) {
        self.answers.clear();
        self.current = 0;
        self.phase = QuizPhase::InProgress;
    }

    fn ensure_in_progress(&self) -> Result<(), QuizSessionError> {
        if self.phase == QuizPhase::InProgress {
            Ok(())
        } else {
            Err(QuizSessionError::PreconditionNotMet(
                Precondition::NotInProgress,
            ))
        }
    }

    fn ensure_current_answered(&self) -> Result<(), QuizSessionError> {
        if self.is_current_answered() {
            Ok(())
        } else {
            Err(QuizSessionError::PreconditionNotMet(
                Precondition::CurrentUnanswered,
            ))
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizId;

    fn question(id: &str, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Prompt {id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn two_question_session() -> QuizSession {
        let quiz = Quiz::new(
            QuizId::new("q1"),
            "Machine Learning Basics",
            vec![question("q1", 1), question("q2", 3)],
        )
        .unwrap();
        QuizSession::new(quiz)
    }

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    #[test]
    fn select_answer_records_and_overwrites() {
        let mut session = two_question_session();
        for i in 0..4 {
            session.select_answer(&qid("q2"), i).unwrap();
            assert_eq!(session.selected_for(&qid("q2")), Some(i));
        }
        let previous = session.select_answer(&qid("q2"), 0).unwrap();
        assert_eq!(previous, Some(3));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.phase(), QuizPhase::InProgress);
    }

    #[test]
    fn select_answer_rejects_out_of_range_and_unknown() {
        let mut session = two_question_session();
        let err = session.select_answer(&qid("q1"), 4).unwrap_err();
        assert_eq!(
            err,
            QuizSessionError::InvalidIndex {
                question: qid("q1"),
                index: 4,
                len: 4
            }
        );
        let err = session.select_answer(&qid("nope"), 0).unwrap_err();
        assert_eq!(err, QuizSessionError::UnknownQuestion(qid("nope")));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn go_next_requires_an_answer() {
        let mut session = two_question_session();
        assert!(!session.can_go_next());
        let err = session.go_next().unwrap_err();
        assert_eq!(
            err,
            QuizSessionError::PreconditionNotMet(Precondition::CurrentUnanswered)
        );
        assert_eq!(session.current_index(), 0);

        session.select_current(0).unwrap();
        assert_eq!(session.go_next().unwrap(), Advance::Moved { index: 1 });
        assert_eq!(session.position(), (2, 2));
    }

    #[test]
    fn go_next_on_last_question_shows_results() {
        let mut session = two_question_session();
        session.select_answer(&qid("q1"), 1).unwrap();
        session.go_next().unwrap();
        session.select_answer(&qid("q2"), 3).unwrap();

        assert_eq!(session.go_next().unwrap(), Advance::ShowingResults);
        assert!(session.is_showing_results());
        assert!(!session.is_completed());
        assert_eq!(session.current_index(), 1);

        let results = session.results().unwrap();
        assert_eq!(results.score.correct(), 2);
        assert_eq!(results.score.total(), 2);
        assert_eq!(results.score.percentage(), 100);
        assert!(results.outcomes.iter().all(QuestionOutcome::is_correct));
    }

    #[test]
    fn results_hidden_while_in_progress() {
        let session = two_question_session();
        assert!(session.results().is_none());
    }

    #[test]
    fn go_previous_is_noop_on_first_question() {
        let mut session = two_question_session();
        assert!(!session.go_previous());
        assert_eq!(session.current_index(), 0);

        session.select_current(2).unwrap();
        session.go_next().unwrap();
        assert!(session.go_previous());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected_for(&qid("q1")), Some(2));
    }

    #[test]
    fn submit_only_from_answered_last_question() {
        let mut session = two_question_session();
        session.select_current(1).unwrap();
        assert_eq!(
            session.submit().unwrap_err(),
            QuizSessionError::PreconditionNotMet(Precondition::NotOnLastQuestion)
        );

        session.go_next().unwrap();
        assert_eq!(
            session.submit().unwrap_err(),
            QuizSessionError::PreconditionNotMet(Precondition::CurrentUnanswered)
        );
        assert_eq!(session.phase(), QuizPhase::InProgress);

        session.select_current(0).unwrap();
        let score = session.submit().unwrap();
        assert_eq!(score.correct(), 1);
        assert_eq!(score.percentage(), 50);
        assert!(session.is_completed());
        assert!(session.is_showing_results());

        assert_eq!(
            session.submit().unwrap_err(),
            QuizSessionError::PreconditionNotMet(Precondition::AlreadyCompleted)
        );
    }

    #[test]
    fn submit_from_results_view_completes() {
        let mut session = two_question_session();
        session.select_current(1).unwrap();
        session.go_next().unwrap();
        session.select_current(3).unwrap();
        session.go_next().unwrap();

        session.submit().unwrap();
        assert_eq!(session.phase(), QuizPhase::Completed);
    }

    #[test]
    fn answers_are_frozen_once_results_show() {
        let mut session = two_question_session();
        session.select_current(1).unwrap();
        session.go_next().unwrap();
        session.select_current(3).unwrap();
        session.go_next().unwrap();

        let err = session.select_answer(&qid("q1"), 0).unwrap_err();
        assert_eq!(
            err,
            QuizSessionError::PreconditionNotMet(Precondition::NotInProgress)
        );
        assert!(!session.go_previous());
        assert_eq!(session.selected_for(&qid("q1")), Some(1));
    }

    #[test]
    fn retake_resets_everything() {
        let mut session = two_question_session();
        session.select_current(1).unwrap();
        session.go_next().unwrap();
        session.select_current(3).unwrap();
        session.submit().unwrap();

        session.retake();
        assert_eq!(session.phase(), QuizPhase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());

        let score = session.compute_score();
        assert_eq!((score.correct(), score.total(), score.percentage()), (0, 2, 0));
    }

    #[test]
    fn score_counts_partial_and_empty() {
        let questions = vec![question("q1", 1), question("q2", 3)];
        let answers: AnswerRecord = [(qid("q1"), 1), (qid("q2"), 0)].into_iter().collect();
        let score = score_answers(&questions, &answers);
        assert_eq!((score.correct(), score.total(), score.percentage()), (1, 2, 50));

        let empty = score_answers(&[], &AnswerRecord::new());
        assert_eq!((empty.correct(), empty.total(), empty.percentage()), (0, 0, 0));
    }

    #[test]
    fn single_question_quiz_goes_straight_to_results() {
        let quiz = Quiz::new(QuizId::new("solo"), "Solo", vec![question("only", 0)]).unwrap();
        let mut session = QuizSession::new(quiz);
        assert!(session.is_first_question() && session.is_last_question());
        session.select_current(0).unwrap();
        assert_eq!(session.go_next().unwrap(), Advance::ShowingResults);
    }

    #[test]
    fn quiz_definition_is_untouched_by_session() {
        let mut session = two_question_session();
        let before = session.quiz().clone();
        session.select_current(2).unwrap();
        session.go_next().unwrap();
        session.select_current(2).unwrap();
        session.submit().unwrap();
        assert_eq!(session.quiz(), &before);
        assert!(!session.quiz().completed());
    }
}
