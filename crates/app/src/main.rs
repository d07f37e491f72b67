//! Terminal front end for browsing courses, tracking lessons and taking quizzes.

mod config;
mod quiz_runner;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use course_core::model::{CourseId, LessonId, QuizId};
use course_core::time::relative_label;
use services::generation::ContentStructure;
use services::{
    AppServices, Clock, CourseFilter, CourseRequest, InputType, QuizServiceError, Upload,
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::quiz_runner::RunOutcome;

#[derive(Parser)]
#[command(name = "course", version, about = "Course progress and quiz runner")]
struct Cli {
    /// `SQLite` database URL
    #[arg(long, global = true, env = "COURSE_DB_URL")]
    db: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the bundled sample courses
    Seed,
    /// List courses with their progress
    Courses {
        /// all, in-progress or completed
        #[arg(long, default_value = "all")]
        filter: CourseFilter,
    },
    /// Show lesson progress for a course
    Progress { course: CourseId },
    /// Mark a lesson as complete
    Complete { course: CourseId, lesson: LessonId },
    /// Delete a course with its progress and quiz attempts
    Delete { course: CourseId },
    /// Take a quiz interactively
    Quiz { course: CourseId, quiz: QuizId },
    /// Generate a course with the configured content backend
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    topic: String,
    #[arg(long, value_enum, default_value_t = StructureArg::Modular)]
    structure: StructureArg,
    /// Output format, repeatable
    #[arg(long = "format", default_value = "text")]
    formats: Vec<String>,
    /// Extra feature, repeatable
    #[arg(long = "feature")]
    features: Vec<String>,
    /// Source document (.pdf, .docx, .txt)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StructureArg {
    Modular,
    Flexible,
    Difficulty,
    Practice,
    Paths,
}

impl From<StructureArg> for ContentStructure {
    fn from(arg: StructureArg) -> Self {
        match arg {
            StructureArg::Modular => Self::Modular,
            StructureArg::Flexible => Self::Flexible,
            StructureArg::Difficulty => Self::Difficulty,
            StructureArg::Practice => Self::Practice,
            StructureArg::Paths => Self::Paths,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.db_url = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let clock = Clock::default();
    let app = AppServices::new_sqlite(&config.db_url, clock, config.generator.clone())
        .await
        .with_context(|| format!("failed to open {}", config.db_url))?;

    match cli.command {
        Command::Seed => {
            let written = app.seed_samples().await?;
            println!("Seeded {written} courses.");
        }
        Command::Courses { filter } => list_courses(&app, clock, filter).await?,
        Command::Progress { course } => show_progress(&app, &course).await?,
        Command::Complete { course, lesson } => {
            let progress = app.progress();
            let mut state = progress.open_course(&course).await?;
            if progress.mark_complete(&mut state, &lesson).await? {
                println!(
                    "Marked {lesson} complete ({}% done).",
                    state.progress_percentage()
                );
            } else {
                println!("{lesson} was already complete.");
            }
        }
        Command::Delete { course } => {
            app.catalog().delete(&course).await?;
            println!("Deleted course {course}.");
        }
        Command::Quiz { course, quiz } => take_quiz(&app, &course, &quiz).await?,
        Command::Generate(args) => generate(&app, args).await?,
    }
    Ok(())
}

async fn list_courses(app: &AppServices, clock: Clock, filter: CourseFilter) -> Result<()> {
    let courses = app.catalog().list(filter).await?;
    if courses.is_empty() {
        println!("No {filter} courses.");
        return Ok(());
    }
    let now = clock.now();
    for course in courses {
        let accessed = course
            .last_accessed
            .map_or_else(|| "never".to_string(), |at| relative_label(at, now));
        println!(
            "{:<12} {:>3}%  {} ({} lessons, {} quizzes, last accessed {accessed})",
            course.course_id, course.progress, course.title, course.lesson_count, course.quiz_count
        );
        if let Some(description) = &course.description {
            println!("             {description}");
        }
    }
    Ok(())
}

async fn show_progress(app: &AppServices, course_id: &CourseId) -> Result<()> {
    let progress = app.progress().open_course(course_id).await?;
    let course = progress.course();
    println!(
        "{} ({}/{} lessons, {}%)",
        course.title(),
        progress.completed_count(),
        course.lessons().len(),
        progress.progress_percentage()
    );
    for lesson in course.lessons() {
        let mark = if progress.is_lesson_complete(lesson.id()) { 'x' } else { ' ' };
        println!("  [{mark}] {:<8} {}", lesson.id(), lesson.title());
    }
    for quiz in course.quizzes() {
        let latest = app.quizzes().latest_attempt(course_id, quiz.id()).await?;
        let status = latest.map_or_else(
            || "not taken".to_string(),
            |a| format!("last score {}%", a.score().percentage()),
        );
        println!("  quiz {:<8} {} ({status})", quiz.id(), quiz.title());
    }
    Ok(())
}

async fn take_quiz(app: &AppServices, course_id: &CourseId, quiz_id: &QuizId) -> Result<()> {
    let quizzes = app.quizzes();
    let mut session = quizzes.start_quiz(course_id, quiz_id).await?;
    println!("{}", session.quiz().title());
    if session.quiz().completed() {
        println!("(taken before)");
    }

    let outcome = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        quiz_runner::drive(&mut session, &mut input, &mut out)?
    };
    if outcome == RunOutcome::Quit {
        println!("Quiz abandoned.");
        return Ok(());
    }

    let submission = match quizzes.submit(course_id, &mut session).await {
        Err(QuizServiceError::Storage(err)) => {
            warn!(error = %err, "storing quiz attempt failed, retrying once");
            quizzes
                .record_attempt(course_id, &session)
                .await
                .context("quiz was completed but the attempt was not saved")?
        }
        other => other?,
    };
    println!(
        "Submitted: {}% ({} of {}).",
        submission.score.percentage(),
        submission.score.correct(),
        submission.score.total()
    );
    Ok(())
}

async fn generate(app: &AppServices, args: GenerateArgs) -> Result<()> {
    let upload = args.file.as_deref().map(read_upload).transpose()?;
    let request = CourseRequest {
        title: args.title,
        description: args.description,
        input_type: if upload.is_some() {
            InputType::Document
        } else {
            InputType::Text
        },
        topic: args.topic,
        content_structure: args.structure.into(),
        output_formats: args.formats,
        features: args.features,
    };

    let course = app.generation().generate(&request, upload).await?;
    println!(
        "Created course {} \"{}\" with {} lessons and {} quizzes.",
        course.id(),
        course.title(),
        course.lessons().len(),
        course.quizzes().len()
    );
    Ok(())
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        _ => "",
    };
    Ok(Upload {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}
