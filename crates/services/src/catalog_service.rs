use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use course_core::model::CourseId;
use storage::repository::{CourseRepository, ProgressRepository};
use tracing::info;

use crate::error::CatalogError;
use crate::progress_service::restore_progress;

/// Which courses a listing should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseFilter {
    #[default]
    All,
    /// Started but not finished.
    InProgress,
    Completed,
}

impl CourseFilter {
    #[must_use]
    pub fn matches(self, progress: u8) -> bool {
        match self {
            Self::All => true,
            Self::InProgress => progress > 0 && progress < 100,
            Self::Completed => progress == 100,
        }
    }
}

impl FromStr for CourseFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(CatalogError::UnknownFilter(other.to_string())),
        }
    }
}

impl fmt::Display for CourseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        })
    }
}

/// Course listing entry with derived progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOverview {
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub lesson_count: usize,
    pub quiz_count: usize,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Lists and removes stored courses.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { courses, progress }
    }

    /// List courses newest first, keeping those that match the filter.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` on backend failures.
    pub async fn list(&self, filter: CourseFilter) -> Result<Vec<CourseOverview>, CatalogError> {
        let mut out = Vec::new();
        for course in self.courses.list_courses().await? {
            let saved = self.progress.load_completed(course.id()).await?;
            let last_accessed = self.progress.last_accessed(course.id()).await?;
            let course_id = course.id().clone();
            let title = course.title().to_owned();
            let description = course.description().map(ToOwned::to_owned);
            let lesson_count = course.lessons().len();
            let quiz_count = course.quizzes().len();
            let created_at = course.created_at();
            let progress = restore_progress(course, saved)
                .map(|p| p.progress_percentage())
                .unwrap_or_default();

            if filter.matches(progress) {
                out.push(CourseOverview {
                    course_id,
                    title,
                    description,
                    lesson_count,
                    quiz_count,
                    progress,
                    created_at,
                    last_accessed,
                });
            }
        }
        Ok(out)
    }

    /// Delete a course together with its progress and attempts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` (including `NotFound`) on failure.
    pub async fn delete(&self, course_id: &CourseId) -> Result<(), CatalogError> {
        self.courses.delete_course(course_id).await?;
        info!(course = %course_id, "course deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_boundaries() {
        assert!(CourseFilter::All.matches(0));
        assert!(!CourseFilter::InProgress.matches(0));
        assert!(CourseFilter::InProgress.matches(50));
        assert!(!CourseFilter::InProgress.matches(100));
        assert!(CourseFilter::Completed.matches(100));
        assert!(!CourseFilter::Completed.matches(99));
    }

    #[test]
    fn filter_parses_cli_names() {
        assert_eq!("all".parse::<CourseFilter>().unwrap(), CourseFilter::All);
        assert_eq!(
            "In-Progress".parse::<CourseFilter>().unwrap(),
            CourseFilter::InProgress
        );
        assert_eq!(
            "completed".parse::<CourseFilter>().unwrap(),
            CourseFilter::Completed
        );
        assert!(matches!(
            "archived".parse::<CourseFilter>(),
            Err(CatalogError::UnknownFilter(name)) if name == "archived"
        ));
        assert_eq!(CourseFilter::InProgress.to_string(), "in-progress");
    }
}
