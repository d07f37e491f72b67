use std::sync::Arc;

use course_core::model::{CourseId, QuizAttempt, QuizId, Score};
use course_core::session::QuizSession;
use storage::repository::{CourseRepository, QuizAttemptRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::QuizServiceError;

/// Outcome of a persisted quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    pub attempt_id: i64,
    pub score: Score,
}

/// Starts quiz sessions from stored courses and records submitted attempts.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            attempts,
        }
    }

    /// Start a fresh session for a quiz of a stored course.
    ///
    /// The quiz is flagged completed when an attempt was stored before.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownQuiz` if the course has no such quiz,
    /// or `Storage` if the course cannot be loaded.
    pub async fn start_quiz(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<QuizSession, QuizServiceError> {
        let course = self.courses.get_course(course_id).await?;
        let quiz = course
            .quiz(quiz_id)
            .cloned()
            .ok_or_else(|| QuizServiceError::UnknownQuiz {
                course: course_id.clone(),
                quiz: quiz_id.clone(),
            })?;
        let attempted = self
            .attempts
            .latest_attempt(course_id, quiz_id)
            .await?
            .is_some();

        info!(
            course = %course_id,
            quiz = %quiz_id,
            questions = quiz.len(),
            "quiz started"
        );
        let completed = quiz.completed() || attempted;
        Ok(QuizSession::new(quiz.with_completed(completed)))
    }

    /// Submit the session and store the attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the session rejects the submit
    /// (unanswered last question, not on the last question, already
    /// submitted), or `Storage` if the attempt cannot be stored. In the latter
    /// case the session stays completed and `record_attempt` can be retried.
    pub async fn submit(
        &self,
        course_id: &CourseId,
        session: &mut QuizSession,
    ) -> Result<QuizSubmission, QuizServiceError> {
        session.submit()?;
        self.record_attempt(course_id, session).await
    }

    /// Store the attempt of an already completed session.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotCompleted` if the session was not
    /// submitted, or storage errors.
    pub async fn record_attempt(
        &self,
        course_id: &CourseId,
        session: &QuizSession,
    ) -> Result<QuizSubmission, QuizServiceError> {
        if !session.is_completed() {
            return Err(QuizServiceError::NotCompleted);
        }
        let score = session.compute_score();
        let attempt = QuizAttempt::from_score(
            course_id.clone(),
            session.quiz().id().clone(),
            score,
            self.clock.now(),
        )?;
        let attempt_id = self.attempts.append_attempt(&attempt).await?;

        info!(
            course = %course_id,
            quiz = %session.quiz().id(),
            correct = score.correct(),
            total = score.total(),
            percentage = score.percentage(),
            "quiz submitted"
        );
        Ok(QuizSubmission { attempt_id, score })
    }

    /// Most recent stored attempt for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on backend failures.
    pub async fn latest_attempt(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizAttempt>, QuizServiceError> {
        let attempt = self.attempts.latest_attempt(course_id, quiz_id).await?;
        debug!(course = %course_id, quiz = %quiz_id, found = attempt.is_some(), "latest attempt");
        Ok(attempt)
    }
}
