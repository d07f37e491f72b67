use std::sync::Arc;

use storage::fixtures::seed_sample_courses;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::generation::{GenerationConfig, GenerationService};
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    quizzes: Arc<QuizService>,
    progress: Arc<ProgressService>,
    catalog: Arc<CatalogService>,
    generation: Arc<GenerationService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        generation: Option<GenerationConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, generation))
    }

    #[must_use]
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        generation: Option<GenerationConfig>,
    ) -> Self {
        let quizzes = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.attempts),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
        ));
        let generation = Arc::new(GenerationService::new(
            generation,
            clock,
            Arc::clone(&storage.courses),
        ));

        Self {
            clock,
            storage,
            quizzes,
            progress,
            catalog,
            generation,
        }
    }

    /// Store the bundled sample courses. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if seeding fails.
    pub async fn seed_samples(&self) -> Result<usize, AppServicesError> {
        let written = seed_sample_courses(self.storage.courses.as_ref(), self.clock.now()).await?;
        info!(courses = written, "sample courses seeded");
        Ok(written)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn generation(&self) -> Arc<GenerationService> {
        Arc::clone(&self.generation)
    }
}
