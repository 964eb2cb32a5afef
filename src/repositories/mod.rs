pub mod analytics_repository;
pub mod quiz_attempt_repository;
pub mod quiz_repository;

pub use analytics_repository::{
    MongoQuizAnalyticsRepository, MongoUserAnalyticsRepository, QuizAnalyticsPatch,
    QuizAnalyticsRepository, UserAnalyticsPatch, UserAnalyticsRepository,
};
pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
