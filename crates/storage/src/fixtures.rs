//! Bundled sample content used for seeding and demos.

use chrono::{DateTime, Utc};
use course_core::model::Course;

use crate::record::parse_course_records;
use crate::repository::{CourseRepository, StorageError};

const SAMPLE_COURSES_JSON: &str = include_str!("../fixtures/sample_courses.json");

/// Parse and validate the bundled sample courses.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the bundled JSON does not
/// describe valid courses.
pub fn sample_courses(default_created_at: DateTime<Utc>) -> Result<Vec<Course>, StorageError> {
    parse_course_records(SAMPLE_COURSES_JSON)?
        .into_iter()
        .map(|record| {
            record
                .into_course(default_created_at)
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .collect()
}

/// Store every sample course, replacing existing ones with the same id.
///
/// Returns the number of courses written.
///
/// # Errors
///
/// Returns `StorageError` if parsing or persistence fails.
pub async fn seed_sample_courses(
    courses: &dyn CourseRepository,
    default_created_at: DateTime<Utc>,
) -> Result<usize, StorageError> {
    let samples = sample_courses(default_created_at)?;
    for course in &samples {
        courses.upsert_course(course).await?;
    }
    Ok(samples.len())
}
