pub mod analytics_service;
pub mod answer_evaluator;
pub mod attempt_scorer;
pub mod attempt_service;
pub mod learning_metrics;
pub mod quiz_service;
pub mod recommendation_service;

pub use analytics_service::AnalyticsService;
pub use answer_evaluator::AnswerEvaluator;
pub use attempt_scorer::{AttemptScorer, QuestionResult, ScoredAttempt};
pub use attempt_service::AttemptService;
pub use learning_metrics::{LearningMetrics, LearningMetricsCalculator};
pub use quiz_service::QuizService;
pub use recommendation_service::{RecommendationFactors, RecommendationService};
