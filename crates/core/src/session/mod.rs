mod answers;
mod progress;
mod quiz;

pub use answers::AnswerRecord;
pub use progress::{CourseProgress, Direction, ProgressError};
pub use quiz::{
    Advance, Precondition, QuestionOutcome, QuizPhase, QuizResults, QuizSession,
    QuizSessionError, score_answers,
};
