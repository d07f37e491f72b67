//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseId, QuizAttemptError, QuizId};
use course_core::session::{ProgressError, QuizSessionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz {quiz} not found in course {course}")]
    UnknownQuiz { course: CourseId, quiz: QuizId },
    #[error("quiz session is not completed yet")]
    NotCompleted,
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Attempt(#[from] QuizAttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown course filter: {0}")]
    UnknownFilter(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Reasons a course request is rejected before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    #[error("title must be at least 2 characters")]
    TitleTooShort,
    #[error("at least one output format must be selected")]
    NoOutputFormat,
    #[error("a document is required for document input")]
    MissingDocument,
}

/// Reasons an uploaded source document is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    #[error("invalid file type, accepted: {accepted}")]
    InvalidType { accepted: String },
    #[error("file size exceeds the maximum limit of {max_mb}MB")]
    TooLarge { max_mb: u32 },
}

/// Errors emitted by `GenerationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("course generation is not configured")]
    Disabled,
    #[error("a course generation request is already in flight")]
    InFlight,
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("course generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to encode course request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("course generation failed: {0}")]
    Rejected(String),
    #[error("generated course is invalid: {0}")]
    InvalidCourse(#[from] course_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
