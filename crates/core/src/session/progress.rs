use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Course, Lesson, LessonId, rounded_percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("lesson {0} is not part of this course")]
    UnknownLesson(LessonId),
}

/// Direction for stepping through lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Tracks which lessons of a course are done and which one is being viewed.
///
/// The completed set only grows. The percentage is always derived from it.
#[derive(Debug, Clone)]
pub struct CourseProgress {
    course: Course,
    completed: HashSet<LessonId>,
    current: Option<usize>,
}

impl CourseProgress {
    /// Start tracking a course. Lessons already flagged as completed in the
    /// content count as done; the first lesson is selected.
    #[must_use]
    pub fn new(course: Course) -> Self {
        let completed = course.initially_completed().cloned().collect();
        let current = if course.lessons().is_empty() {
            None
        } else {
            Some(0)
        };
        Self {
            course,
            completed,
            current,
        }
    }

    /// Rebuild progress from a previously saved completed set.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLesson` if a saved id no longer belongs
    /// to the course.
    pub fn restore(
        course: Course,
        completed: impl IntoIterator<Item = LessonId>,
    ) -> Result<Self, ProgressError> {
        let mut progress = Self::new(course);
        for id in completed {
            progress.mark_lesson_complete(&id)?;
        }
        Ok(progress)
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current.and_then(|i| self.course.lessons().get(i))
    }

    /// Adds a lesson to the completed set. Returns `true` if it was newly added.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLesson` for ids outside the course.
    pub fn mark_lesson_complete(&mut self, lesson: &LessonId) -> Result<bool, ProgressError> {
        if self.course.lesson(lesson).is_none() {
            return Err(ProgressError::UnknownLesson(lesson.clone()));
        }
        Ok(self.completed.insert(lesson.clone()))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLesson` for ids outside the course.
    pub fn set_current_lesson(&mut self, lesson: &LessonId) -> Result<(), ProgressError> {
        let index = self
            .course
            .lesson_index(lesson)
            .ok_or_else(|| ProgressError::UnknownLesson(lesson.clone()))?;
        self.current = Some(index);
        Ok(())
    }

    /// Move to the adjacent lesson. Returns `false` at either end.
    pub fn advance(&mut self, direction: Direction) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let target = match direction {
            Direction::Previous => current.checked_sub(1),
            Direction::Next => Some(current + 1).filter(|&i| i < self.course.lessons().len()),
        };
        match target {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Mark the current lesson complete, then move on to the next one if any.
    ///
    /// Returns `true` if the lesson was newly completed.
    pub fn complete_current_and_advance(&mut self) -> bool {
        let Some(lesson) = self.current_lesson().map(|l| l.id().clone()) else {
            return false;
        };
        let newly = self.completed.insert(lesson);
        self.advance(Direction::Next);
        newly
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current
            .is_some_and(|i| i + 1 < self.course.lessons().len())
    }

    #[must_use]
    pub fn is_lesson_complete(&self, lesson: &LessonId) -> bool {
        self.completed.contains(lesson)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Completed lesson ids in course order.
    #[must_use]
    pub fn completed_lessons(&self) -> Vec<&LessonId> {
        self.course
            .lessons()
            .iter()
            .map(Lesson::id)
            .filter(|id| self.completed.contains(*id))
            .collect()
    }

    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        rounded_percentage(self.completed.len(), self.course.lessons().len())
    }

    #[must_use]
    pub fn is_course_complete(&self) -> bool {
        !self.course.lessons().is_empty() && self.completed.len() == self.course.lessons().len()
    }
}
