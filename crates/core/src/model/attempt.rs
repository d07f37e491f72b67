use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{CourseId, QuizId, Score};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizAttemptError {
    #[error("an attempt must cover at least one question")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed question count ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },
}

/// Stored outcome of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    course_id: CourseId,
    quiz_id: QuizId,
    correct: u32,
    total: u32,
    completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Build an attempt from a session score.
    ///
    /// # Errors
    ///
    /// Returns `QuizAttemptError` if the score covers no questions or the
    /// counts do not fit in `u32`.
    pub fn from_score(
        course_id: CourseId,
        quiz_id: QuizId,
        score: Score,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizAttemptError> {
        let total = u32::try_from(score.total())
            .map_err(|_| QuizAttemptError::TooManyQuestions { len: score.total() })?;
        let correct = u32::try_from(score.correct())
            .map_err(|_| QuizAttemptError::TooManyQuestions { len: score.total() })?;
        Self::from_persisted(course_id, quiz_id, correct, total, completed_at)
    }

    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizAttemptError` if `total` is zero or `correct > total`.
    pub fn from_persisted(
        course_id: CourseId,
        quiz_id: QuizId,
        correct: u32,
        total: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizAttemptError> {
        if total == 0 {
            return Err(QuizAttemptError::NoQuestions);
        }
        if correct > total {
            return Err(QuizAttemptError::CountMismatch { correct, total });
        }
        Ok(Self {
            course_id,
            quiz_id,
            correct,
            total,
            completed_at,
        })
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score::new(self.correct as usize, self.total as usize)
    }
}
