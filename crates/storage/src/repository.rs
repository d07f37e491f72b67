use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{Course, CourseId, LessonId, QuizAttempt, QuizId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read/write access to course definitions.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or replace a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError>;

    /// All stored courses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Remove a course together with its progress and attempts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn delete_course(&self, id: &CourseId) -> Result<(), StorageError>;
}

/// Persisted learner progress for a course.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Completed lesson ids saved for a course (empty if none).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_completed(&self, course_id: &CourseId) -> Result<Vec<LessonId>, StorageError>;

    /// Replace the saved completed set for a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_completed(
        &self,
        course_id: &CourseId,
        completed: &[LessonId],
    ) -> Result<(), StorageError>;

    /// Record that the course was opened at `at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn touch(&self, course_id: &CourseId, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// When the course was last opened, if ever.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn last_accessed(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError>;
}

/// Append-only log of submitted quizzes.
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    /// Store an attempt and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError>;

    /// Most recent attempt for a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn latest_attempt(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizAttempt>, StorageError>;
}

#[derive(Default)]
struct ProgressEntry {
    completed: Vec<LessonId>,
    last_accessed: Option<DateTime<Utc>>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    progress: Arc<Mutex<HashMap<CourseId, ProgressEntry>>>,
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(poisoned)?;
        guard.insert(course.id().clone(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(courses)
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), StorageError> {
        {
            let mut guard = self.courses.lock().map_err(poisoned)?;
            guard.remove(id).ok_or(StorageError::NotFound)?;
        }
        self.progress.lock().map_err(poisoned)?.remove(id);
        self.attempts
            .lock()
            .map_err(poisoned)?
            .retain(|a| a.course_id() != id);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_completed(&self, course_id: &CourseId) -> Result<Vec<LessonId>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard
            .get(course_id)
            .map(|entry| entry.completed.clone())
            .unwrap_or_default())
    }

    async fn save_completed(
        &self,
        course_id: &CourseId,
        completed: &[LessonId],
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.entry(course_id.clone()).or_default().completed = completed.to_vec();
        Ok(())
    }

    async fn touch(&self, course_id: &CourseId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.entry(course_id.clone()).or_default().last_accessed = Some(at);
        Ok(())
    }

    async fn last_accessed(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(course_id).and_then(|entry| entry.last_accessed))
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        guard.push(attempt.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Conflict)
    }

    async fn latest_attempt(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .rev()
            .find(|a| a.course_id() == course_id && a.quiz_id() == quiz_id)
            .cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn QuizAttemptRepository> = Arc::new(repo);
        Self {
            courses,
            progress,
            attempts,
        }
    }
}
