use course_core::model::{CourseId, QuizAttempt, QuizId};

use super::SqliteRepository;
use super::mapping::{conn, map_attempt_row};
use crate::repository::{QuizAttemptRepository, StorageError};

#[async_trait::async_trait]
impl QuizAttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (course_id, quiz_id, correct, total, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(attempt.course_id().as_str())
        .bind(attempt.quiz_id().as_str())
        .bind(i64::from(attempt.correct()))
        .bind(i64::from(attempt.total()))
        .bind(attempt.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn latest_attempt(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT course_id, quiz_id, correct, total, completed_at
                FROM quiz_attempts
                WHERE course_id = ?1 AND quiz_id = ?2
                ORDER BY completed_at DESC, id DESC
                LIMIT 1
            ",
        )
        .bind(course_id.as_str())
        .bind(quiz_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_attempt_row).transpose()
    }
}
