#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod generation;
pub mod progress_service;
pub mod quiz_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, CourseFilter, CourseOverview};
pub use error::{
    AppServicesError, CatalogError, GenerationError, ProgressServiceError, QuizServiceError,
    RequestError, UploadError,
};
pub use generation::{
    CourseRequest, GenerationConfig, GenerationService, InputType, Upload, UploadPolicy,
};
pub use progress_service::ProgressService;
pub use quiz_service::{QuizService, QuizSubmission};
