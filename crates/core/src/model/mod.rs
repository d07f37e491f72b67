mod attempt;
mod course;
mod ids;
mod lesson;
mod question;
mod quiz;
mod score;

pub use ids::{CourseId, LessonId, ParseIdError, QuestionId, QuizId};

pub use attempt::{QuizAttempt, QuizAttemptError};
pub use course::{Course, CourseError, MIN_TITLE_CHARS};
pub use lesson::{Lesson, LessonError};
pub use question::{MIN_OPTIONS, Question, QuestionError};
pub use quiz::{Quiz, QuizError};
pub use score::{Score, rounded_percentage};
