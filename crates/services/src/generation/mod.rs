//! Course generation through an external content backend.

mod request;

pub use request::{ContentStructure, CourseRequest, InputType, Upload, UploadPolicy};

use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use course_core::model::{Course, CourseId};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use storage::record::{CourseRecord, LessonRecord, QuizRecord};
use storage::repository::CourseRepository;
use tracing::{info, warn};
use url::Url;

use crate::Clock;
use crate::error::GenerationError;

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl GenerationConfig {
    /// Reads `COURSE_GENERATOR_URL` and the optional `COURSE_GENERATOR_API_KEY`.
    ///
    /// Returns `None` when no valid endpoint is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let raw = env::var("COURSE_GENERATOR_URL").ok()?;
        let api_key = env::var("COURSE_GENERATOR_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(&raw, api_key)
    }

    #[must_use]
    pub fn new(endpoint: &str, api_key: Option<String>) -> Option<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return None;
        }
        match Url::parse(endpoint) {
            Ok(endpoint) => Some(Self { endpoint, api_key }),
            Err(err) => {
                warn!(error = %err, "ignoring invalid course generator url");
                None
            }
        }
    }
}

/// Generated content returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
    #[serde(default)]
    pub quizzes: Vec<QuizRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub content: Option<GeneratedContent>,
}

/// Turn a backend response into a validated course.
///
/// # Errors
///
/// Returns `GenerationError::Rejected` when the backend reports failure, or
/// `InvalidCourse` when the generated content does not validate.
pub fn course_from_response(
    request: &CourseRequest,
    response: GenerationResponse,
    id: CourseId,
    now: DateTime<Utc>,
) -> Result<Course, GenerationError> {
    if !response.success {
        return Err(GenerationError::Rejected(
            response
                .error
                .unwrap_or_else(|| "Course generation failed.".to_string()),
        ));
    }
    let content = response.content.unwrap_or_default();
    let record = CourseRecord {
        id,
        title: request.title.clone(),
        description: Some(request.description.clone()),
        created_at: Some(now),
        lessons: content.lessons,
        quizzes: content.quizzes,
    };
    Ok(record.into_course(now)?)
}

/// Sends course requests to the generator and stores the results.
///
/// Only one request may be outstanding; failed requests are not retried.
#[derive(Clone)]
pub struct GenerationService {
    client: Client,
    config: Option<GenerationConfig>,
    policy: UploadPolicy,
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    in_flight: Arc<AtomicBool>,
}

impl GenerationService {
    #[must_use]
    pub fn new(
        config: Option<GenerationConfig>,
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            client: Client::new(),
            config,
            policy: UploadPolicy::default(),
            clock,
            courses,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate, send and store a generated course.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the service is disabled, the request or
    /// upload is invalid, another request is in flight, the backend fails, or
    /// the course cannot be stored.
    pub async fn generate(
        &self,
        request: &CourseRequest,
        upload: Option<Upload>,
    ) -> Result<Course, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;
        request.validate(upload.as_ref())?;
        if let Some(upload) = &upload {
            self.policy.check(upload)?;
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        info!(title = %request.title, endpoint = %config.endpoint, "course generation started");

        let response = match self.send(config, request, upload).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "course generation failed");
                return Err(err);
            }
        };
        let course = course_from_response(
            request,
            response,
            CourseId::generate(),
            self.clock.now(),
        )?;
        self.courses.upsert_course(&course).await?;

        info!(
            course = %course.id(),
            lessons = course.lessons().len(),
            quizzes = course.quizzes().len(),
            "course generated"
        );
        Ok(course)
    }

    async fn send(
        &self,
        config: &GenerationConfig,
        request: &CourseRequest,
        upload: Option<Upload>,
    ) -> Result<GenerationResponse, GenerationError> {
        let data = serde_json::to_string(request)?;
        let mut form = Form::new().text("data", data);
        if let Some(upload) = upload {
            let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
            if !upload.mime_type.trim().is_empty() {
                part = part.mime_str(&upload.mime_type)?;
            }
            form = form.part("file", part);
        }

        let mut builder = self.client.post(config.endpoint.clone()).multipart(form);
        if let Some(key) = &config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }
        Ok(response.json::<GenerationResponse>().await?)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, GenerationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GenerationError::InFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn response(json: &str) -> GenerationResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn builds_course_from_generated_content() {
        let request = CourseRequest::new("Intro to Rust");
        let body = r#"{
            "success": true,
            "content": {
                "lessons": [{"id": "l1", "title": "Ownership", "content": "Moves"}],
                "quizzes": [{
                    "id": "q1",
                    "title": "Basics",
                    "questions": [{
                        "id": "q1-1",
                        "question": "Who owns a value?",
                        "options": ["One owner", "Everyone"],
                        "correctAnswer": 0
                    }]
                }]
            }
        }"#;

        let course =
            course_from_response(&request, response(body), CourseId::new("gen"), fixed_now())
                .unwrap();
        assert_eq!(course.title(), "Intro to Rust");
        assert_eq!(course.description(), None);
        assert_eq!(course.lessons().len(), 1);
        assert_eq!(course.quizzes()[0].len(), 1);
        assert_eq!(course.created_at(), fixed_now());
    }

    #[test]
    fn backend_failure_is_reported() {
        let request = CourseRequest::new("Intro to Rust");
        let err = course_from_response(
            &request,
            response(r#"{"success": false, "error": "quota"}"#),
            CourseId::new("gen"),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Rejected(msg) if msg == "quota"));

        let err = course_from_response(
            &request,
            response(r#"{"success": false}"#),
            CourseId::new("gen"),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Rejected(msg) if msg == "Course generation failed."));
    }

    #[test]
    fn invalid_generated_quiz_is_rejected() {
        let body = r#"{
            "success": true,
            "content": {"quizzes": [{"id": "q1", "title": "Empty", "questions": []}]}
        }"#;
        let err = course_from_response(
            &CourseRequest::new("Intro"),
            response(body),
            CourseId::new("gen"),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidCourse(_)));
    }

    #[test]
    fn config_requires_valid_url() {
        assert!(GenerationConfig::new("", None).is_none());
        assert!(GenerationConfig::new("not a url", None).is_none());
        let config = GenerationConfig::new("http://localhost:3000/api/generate", None).unwrap();
        assert_eq!(config.endpoint.path(), "/api/generate");
    }

    #[test]
    fn in_flight_guard_blocks_second_request() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag).unwrap();
        assert!(matches!(
            InFlightGuard::acquire(&flag),
            Err(GenerationError::InFlight)
        ));
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn disabled_service_rejects_requests() {
        let service = GenerationService::new(
            None,
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
        );
        assert!(!service.enabled());
        let err = service
            .generate(&CourseRequest::new("Intro"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_sending() {
        let config = GenerationConfig::new("http://127.0.0.1:9/generate", None);
        let service = GenerationService::new(
            config,
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
        );
        let err = service
            .generate(&CourseRequest::new("I"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Request(_)));
        assert!(!service.is_generating());
    }
}
