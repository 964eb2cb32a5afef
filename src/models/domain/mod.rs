pub mod analytics;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;

pub use analytics::{QuizAnalytics, UserAnalytics};
pub use question::{Question, QuestionType};
pub use quiz::Quiz;
pub use quiz_attempt::{QuestionAttempt, QuizAttempt};
