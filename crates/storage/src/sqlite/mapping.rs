use chrono::{DateTime, Utc};
use course_core::model::{Course, CourseId, QuizAttempt, QuizId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::record::CourseRecord;
use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn course_to_body(course: &Course) -> Result<String, StorageError> {
    serde_json::to_string(&CourseRecord::from_course(course)).map_err(ser)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    let body: String = row.try_get("body").map_err(ser)?;
    let record: CourseRecord = serde_json::from_str(&body).map_err(ser)?;
    record.into_course(created_at).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<QuizAttempt, StorageError> {
    let course_id = CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?);
    let quiz_id = QuizId::new(row.try_get::<String, _>("quiz_id").map_err(ser)?);
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    QuizAttempt::from_persisted(course_id, quiz_id, correct, total, completed_at).map_err(ser)
}
