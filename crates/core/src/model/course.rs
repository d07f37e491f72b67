use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, QuizId};
use crate::model::lesson::Lesson;
use crate::model::quiz::Quiz;

/// Minimum trimmed length of a course title.
pub const MIN_TITLE_CHARS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course id cannot be empty")]
    EmptyId,

    #[error("course title must be at least 2 characters")]
    TitleTooShort,

    #[error("duplicate lesson id in course: {0}")]
    DuplicateLesson(LessonId),

    #[error("duplicate quiz id in course: {0}")]
    DuplicateQuiz(QuizId),
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A generated course: ordered lessons plus the quizzes that go with them.
///
/// The definition is read-only once built. Completion percentage is never
/// stored here; see `CourseProgress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    lessons: Vec<Lesson>,
    quizzes: Vec<Quiz>,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Build a validated course.
    ///
    /// A course may have zero lessons (progress is then 0%).
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the id is blank, the title is shorter than
    /// two characters, or lesson/quiz ids repeat.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        lessons: Vec<Lesson>,
        quizzes: Vec<Quiz>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        if id.is_blank() {
            return Err(CourseError::EmptyId);
        }
        let title = title.into().trim().to_string();
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(CourseError::TitleTooShort);
        }

        let mut lesson_ids = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if !lesson_ids.insert(lesson.id()) {
                return Err(CourseError::DuplicateLesson(lesson.id().clone()));
            }
        }
        let mut quiz_ids = HashSet::with_capacity(quizzes.len());
        for quiz in &quizzes {
            if !quiz_ids.insert(quiz.id()) {
                return Err(CourseError::DuplicateQuiz(quiz.id().clone()));
            }
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title,
            description,
            lessons,
            quizzes,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    /// Position of a lesson in course order.
    #[must_use]
    pub fn lesson_index(&self, id: &LessonId) -> Option<usize> {
        self.lessons.iter().position(|l| l.id() == id)
    }

    #[must_use]
    pub fn quiz(&self, id: &QuizId) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id() == id)
    }

    /// Lessons flagged as completed in the supplied content.
    pub fn initially_completed(&self) -> impl Iterator<Item = &LessonId> {
        self.lessons
            .iter()
            .filter(|l| l.completed())
            .map(Lesson::id)
    }
}
