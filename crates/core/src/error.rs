use thiserror::Error;

use crate::model::{CourseError, LessonError, QuestionError, QuizAttemptError, QuizError};
use crate::session::{ProgressError, QuizSessionError};

/// Any error raised by the core crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Attempt(#[from] QuizAttemptError),
    #[error(transparent)]
    QuizSession(#[from] QuizSessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
