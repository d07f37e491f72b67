//! Serialized course shape shared by fixtures, the generation backend and
//! the `SQLite` course table.
//!
//! Field names follow the JSON the content generator emits (`question`,
//! `correctAnswer`, ...). Records are validated into domain types on load.

use chrono::{DateTime, Utc};
use course_core::model::{
    Course, CourseId, Lesson, LessonId, Question, QuestionId, Quiz, QuizId,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
    #[serde(default)]
    pub quizzes: Vec<QuizRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: LessonId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl CourseRecord {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        Self {
            id: course.id().clone(),
            title: course.title().to_owned(),
            description: course.description().map(ToOwned::to_owned),
            created_at: Some(course.created_at()),
            lessons: course
                .lessons()
                .iter()
                .map(|l| LessonRecord {
                    id: l.id().clone(),
                    title: l.title().to_owned(),
                    content: l.content().to_owned(),
                    completed: l.completed(),
                })
                .collect(),
            quizzes: course
                .quizzes()
                .iter()
                .map(|q| QuizRecord {
                    id: q.id().clone(),
                    title: q.title().to_owned(),
                    completed: q.completed(),
                    questions: q
                        .questions()
                        .iter()
                        .map(|question| QuestionRecord {
                            id: question.id().clone(),
                            prompt: question.prompt().to_owned(),
                            options: question.options().to_vec(),
                            correct_answer: question.correct_option(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Convert the record into a validated domain `Course`.
    ///
    /// `created_at` falls back to `default_created_at` when the record has none.
    ///
    /// # Errors
    ///
    /// Returns `course_core::Error` if any lesson, question, quiz or the
    /// course itself fails validation.
    pub fn into_course(self, default_created_at: DateTime<Utc>) -> Result<Course, course_core::Error> {
        let mut lessons = Vec::with_capacity(self.lessons.len());
        for lesson in self.lessons {
            lessons.push(
                Lesson::new(lesson.id, lesson.title, lesson.content)?
                    .with_completed(lesson.completed),
            );
        }

        let mut quizzes = Vec::with_capacity(self.quizzes.len());
        for quiz in self.quizzes {
            let mut questions = Vec::with_capacity(quiz.questions.len());
            for q in quiz.questions {
                questions.push(Question::new(q.id, q.prompt, q.options, q.correct_answer)?);
            }
            quizzes.push(Quiz::new(quiz.id, quiz.title, questions)?.with_completed(quiz.completed));
        }

        Ok(Course::new(
            self.id,
            self.title,
            self.description,
            lessons,
            quizzes,
            self.created_at.unwrap_or(default_created_at),
        )?)
    }
}

/// Parse a JSON array of course records.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is malformed.
pub fn parse_course_records(json: &str) -> Result<Vec<CourseRecord>, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
}
