use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizAnalyticsRepository, MongoQuizAttemptRepository, MongoQuizRepository,
        MongoUserAnalyticsRepository,
    },
    services::{AnalyticsService, AttemptService, QuizService, RecommendationService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub attempt_service: Arc<AttemptService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub recommendation_service: Arc<RecommendationService>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let user_analytics_repository = Arc::new(MongoUserAnalyticsRepository::new(&db));
        user_analytics_repository.ensure_indexes().await?;

        let quiz_analytics_repository = Arc::new(MongoQuizAnalyticsRepository::new(&db));
        quiz_analytics_repository.ensure_indexes().await?;

        let quiz_service = Arc::new(QuizService::new(quiz_repository.clone()));
        let analytics_service = Arc::new(AnalyticsService::new(
            attempt_repository.clone(),
            user_analytics_repository.clone(),
            quiz_analytics_repository.clone(),
        ));
        let attempt_service = Arc::new(AttemptService::new(
            quiz_repository.clone(),
            attempt_repository.clone(),
            analytics_service.clone(),
        ));
        let recommendation_service = Arc::new(RecommendationService::new(
            quiz_repository,
            attempt_repository,
            user_analytics_repository,
            quiz_analytics_repository,
        ));

        Ok(Self {
            quiz_service,
            attempt_service,
            analytics_service,
            recommendation_service,
            config: Arc::new(config),
            db,
        })
    }
}
