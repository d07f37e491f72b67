use chrono::{DateTime, Utc};
use course_core::model::{CourseId, LessonId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_completed(&self, course_id: &CourseId) -> Result<Vec<LessonId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT lesson_id
            FROM completed_lessons
            WHERE course_id = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(course_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("lesson_id")
                    .map(LessonId::new)
                    .map_err(ser)
            })
            .collect()
    }

    async fn save_completed(
        &self,
        course_id: &CourseId,
        completed: &[LessonId],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM completed_lessons WHERE course_id = ?1")
            .bind(course_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for lesson in completed {
            sqlx::query(
                r"
                INSERT INTO completed_lessons (course_id, lesson_id)
                VALUES (?1, ?2)
                ON CONFLICT(course_id, lesson_id) DO NOTHING
                ",
            )
            .bind(course_id.as_str())
            .bind(lesson.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn touch(&self, course_id: &CourseId, at: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_access (course_id, last_accessed_at)
            VALUES (?1, ?2)
            ON CONFLICT(course_id) DO UPDATE SET
                last_accessed_at = excluded.last_accessed_at
            ",
        )
        .bind(course_id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn last_accessed(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query("SELECT last_accessed_at FROM course_access WHERE course_id = ?1")
            .bind(course_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| r.try_get("last_accessed_at").map_err(ser))
            .transpose()
    }
}
