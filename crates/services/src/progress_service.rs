use std::sync::Arc;

use course_core::model::{Course, CourseId, LessonId};
use course_core::session::CourseProgress;
use storage::repository::{CourseRepository, ProgressRepository, StorageError};
use tracing::{info, warn};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Loads and persists lesson completion for stored courses.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            progress,
        }
    }

    /// Open a course for reading and record the access time.
    ///
    /// Saved lesson ids that no longer exist in the course are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the course or its progress
    /// cannot be loaded.
    pub async fn open_course(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseProgress, ProgressServiceError> {
        let progress = self.load(course_id).await?;
        self.progress.touch(course_id, self.clock.now()).await?;
        info!(
            course = %course_id,
            completed = progress.completed_count(),
            percentage = progress.progress_percentage(),
            "course opened"
        );
        Ok(progress)
    }

    /// Progress of a course without touching its access time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on backend failures.
    pub async fn load(&self, course_id: &CourseId) -> Result<CourseProgress, ProgressServiceError> {
        let course = self.courses.get_course(course_id).await?;
        let saved = self.progress.load_completed(course_id).await?;
        Ok(restore_progress(course, saved)?)
    }

    /// Mark a lesson complete and persist the completed set.
    ///
    /// Returns `true` if the lesson was newly completed. `progress` is left
    /// untouched when saving fails.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` for lessons outside the course,
    /// or `Storage` if saving fails.
    pub async fn mark_complete(
        &self,
        progress: &mut CourseProgress,
        lesson: &LessonId,
    ) -> Result<bool, ProgressServiceError> {
        let mut next = progress.clone();
        let newly = next.mark_lesson_complete(lesson)?;
        if newly {
            self.save(&next).await?;
            info!(
                course = %next.course().id(),
                lesson = %lesson,
                percentage = next.progress_percentage(),
                "lesson completed"
            );
        }
        *progress = next;
        Ok(newly)
    }

    /// Complete the current lesson, persist, and move to the next lesson.
    ///
    /// Returns `true` if the lesson was newly completed. `progress` is left
    /// untouched when saving fails.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if saving fails.
    pub async fn complete_current_and_advance(
        &self,
        progress: &mut CourseProgress,
    ) -> Result<bool, ProgressServiceError> {
        let mut next = progress.clone();
        let newly = next.complete_current_and_advance();
        if newly {
            self.save(&next).await?;
        }
        *progress = next;
        Ok(newly)
    }

    async fn save(&self, progress: &CourseProgress) -> Result<(), StorageError> {
        let completed: Vec<LessonId> = progress
            .completed_lessons()
            .into_iter()
            .cloned()
            .collect();
        self.progress
            .save_completed(progress.course().id(), &completed)
            .await
    }
}

/// Rebuild progress from saved ids, skipping ids the course no longer has.
pub(crate) fn restore_progress(
    course: Course,
    saved: Vec<LessonId>,
) -> Result<CourseProgress, course_core::session::ProgressError> {
    let (known, stale): (Vec<_>, Vec<_>) = saved
        .into_iter()
        .partition(|id| course.lesson(id).is_some());
    for id in &stale {
        warn!(course = %course.id(), lesson = %id, "dropping unknown completed lesson");
    }
    CourseProgress::restore(course, known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::Lesson;
    use course_core::time::fixed_now;

    fn course() -> Course {
        Course::new(
            CourseId::new("c1"),
            "Rust basics",
            None,
            vec![
                Lesson::new(LessonId::new("a"), "A", "").unwrap(),
                Lesson::new(LessonId::new("b"), "B", "").unwrap(),
            ],
            Vec::new(),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn restore_skips_stale_lessons() {
        let progress =
            restore_progress(course(), vec![LessonId::new("gone"), LessonId::new("b")]).unwrap();
        assert_eq!(progress.completed_count(), 1);
        assert!(progress.is_lesson_complete(&LessonId::new("b")));
        assert_eq!(progress.progress_percentage(), 50);
    }
}
