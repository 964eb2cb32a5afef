use async_graphql::{Context, Object, ID};

use crate::{
    app_state::AppState,
    errors::AppResult,
    graphql::helpers::parse_id,
    models::dto::{
        request::QuizFilterInput,
        response::{
            QuizForTaking, QuizSummary, RecommendedQuiz, UserAnalyticsSummary, UserStats,
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A quiz prepared for taking, with the answer key stripped.
    async fn quiz(&self, ctx: &Context<'_>, id: ID) -> AppResult<QuizForTaking> {
        let state = ctx.data::<AppState>()?;

        let id_str = parse_id(&id)?;
        let quiz = state.quiz_service.get_quiz_for_taking(&id_str).await?;

        Ok(QuizForTaking::from_quiz(&quiz))
    }

    async fn quizzes(
        &self,
        ctx: &Context<'_>,
        filter: Option<QuizFilterInput>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> AppResult<Vec<QuizSummary>> {
        let state = ctx.data::<AppState>()?;

        let filter = filter.unwrap_or_default();
        let offset = offset.unwrap_or(0).max(0);
        let limit = limit.unwrap_or(20).clamp(1, 50);

        let quizzes = state.quiz_service.list_quizzes(&filter, offset, limit).await?;

        Ok(quizzes.iter().map(QuizSummary::from).collect())
    }

    async fn recommended_quizzes(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        limit: Option<i32>,
    ) -> AppResult<Vec<RecommendedQuiz>> {
        let state = ctx.data::<AppState>()?;

        let limit = limit
            .map(|l| l.clamp(1, 50) as usize)
            .unwrap_or(state.config.recommendation_limit);

        state.recommendation_service.generate(&user_id, limit).await
    }

    async fn user_stats(&self, ctx: &Context<'_>, user_id: String) -> AppResult<UserStats> {
        let state = ctx.data::<AppState>()?;
        state.attempt_service.get_user_stats(&user_id).await
    }

    async fn user_analytics(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        days: Option<i64>,
    ) -> AppResult<UserAnalyticsSummary> {
        let state = ctx.data::<AppState>()?;

        let days = days
            .unwrap_or(state.config.analytics_window_days)
            .clamp(1, 365);

        state.analytics_service.summarize_user(&user_id, days).await
    }
}
