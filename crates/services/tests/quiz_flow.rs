use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use course_core::model::{CourseId, QuestionId, QuizAttempt, QuizId};
use course_core::session::{Advance, QuizPhase, QuizSessionError};
use course_core::time::fixed_now;
use services::{Clock, QuizService, QuizServiceError};
use storage::fixtures::seed_sample_courses;
use storage::repository::{InMemoryRepository, QuizAttemptRepository, StorageError};

/// Attempt store that rejects the first append.
#[derive(Clone)]
struct FlakyAttempts {
    inner: InMemoryRepository,
    failed_once: Arc<AtomicBool>,
}

#[async_trait]
impl QuizAttemptRepository for FlakyAttempts {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Connection("database is locked".into()));
        }
        self.inner.append_attempt(attempt).await
    }

    async fn latest_attempt(
        &self,
        course_id: &CourseId,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        self.inner.latest_attempt(course_id, quiz_id).await
    }
}

async fn setup() -> (InMemoryRepository, QuizService) {
    let repo = InMemoryRepository::new();
    seed_sample_courses(&repo, fixed_now()).await.unwrap();
    let service = QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );
    (repo, service)
}

#[tokio::test]
async fn submitting_a_quiz_persists_the_attempt() {
    let (repo, service) = setup().await;
    let course_id = CourseId::new("1");
    let quiz_id = QuizId::new("q1");

    let mut session = service.start_quiz(&course_id, &quiz_id).await.unwrap();
    assert!(!session.quiz().completed());
    assert_eq!(session.position(), (1, 2));

    // First question right, second wrong.
    session.select_current(1).unwrap();
    assert_eq!(session.go_next().unwrap(), Advance::Moved { index: 1 });
    session.select_current(0).unwrap();

    let submission = service.submit(&course_id, &mut session).await.unwrap();
    assert_eq!(submission.score.correct(), 1);
    assert_eq!(submission.score.percentage(), 50);
    assert_eq!(session.phase(), QuizPhase::Completed);

    let stored = repo
        .latest_attempt(&course_id, &quiz_id)
        .await
        .unwrap()
        .expect("attempt stored");
    assert_eq!(stored.correct(), 1);
    assert_eq!(stored.total(), 2);
    assert_eq!(stored.completed_at(), fixed_now());

    let again = service.start_quiz(&course_id, &quiz_id).await.unwrap();
    assert!(again.quiz().completed());
    assert!(again.answers().is_empty());
}

#[tokio::test]
async fn submit_requires_an_answered_last_question() {
    let (repo, service) = setup().await;
    let course_id = CourseId::new("1");
    let quiz_id = QuizId::new("q1");

    let mut session = service.start_quiz(&course_id, &quiz_id).await.unwrap();
    session
        .select_answer(&QuestionId::new("q1-1"), 1)
        .unwrap();
    let err = service.submit(&course_id, &mut session).await.unwrap_err();
    assert!(matches!(
        err,
        QuizServiceError::Session(QuizSessionError::PreconditionNotMet(_))
    ));
    assert!(!session.is_completed());
    assert!(
        repo.latest_attempt(&course_id, &quiz_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn record_attempt_rejects_unsubmitted_sessions() {
    let (_repo, service) = setup().await;
    let course_id = CourseId::new("1");
    let session = service
        .start_quiz(&course_id, &QuizId::new("q1"))
        .await
        .unwrap();
    assert!(matches!(
        service.record_attempt(&course_id, &session).await,
        Err(QuizServiceError::NotCompleted)
    ));
}

#[tokio::test]
async fn unknown_quiz_is_reported() {
    let (_repo, service) = setup().await;
    let err = service
        .start_quiz(&CourseId::new("2"), &QuizId::new("q1"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizServiceError::UnknownQuiz { .. }));
}

#[tokio::test]
async fn failed_attempt_store_can_be_retried() {
    let repo = InMemoryRepository::new();
    seed_sample_courses(&repo, fixed_now()).await.unwrap();
    let attempts = FlakyAttempts {
        inner: repo.clone(),
        failed_once: Arc::new(AtomicBool::new(false)),
    };
    let service = QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(attempts),
    );
    let course_id = CourseId::new("1");
    let quiz_id = QuizId::new("q1");

    let mut session = service.start_quiz(&course_id, &quiz_id).await.unwrap();
    session.select_current(1).unwrap();
    session.go_next().unwrap();
    session.select_current(3).unwrap();

    assert!(matches!(
        service.submit(&course_id, &mut session).await,
        Err(QuizServiceError::Storage(_))
    ));
    assert!(session.is_completed());
    assert!(repo.latest_attempt(&course_id, &quiz_id).await.unwrap().is_none());

    let submission = service.record_attempt(&course_id, &session).await.unwrap();
    assert_eq!(submission.score.percentage(), 100);
    let stored = repo.latest_attempt(&course_id, &quiz_id).await.unwrap().unwrap();
    assert_eq!(stored.correct(), 2);
}
