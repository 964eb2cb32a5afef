use async_graphql::{Context, Object};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    graphql::helpers::parse_id,
    models::dto::{
        request::{StartQuizAttemptInput, SubmitQuizAttemptInput},
        response::QuizAttemptResponse,
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn start_quiz_attempt(
        &self,
        ctx: &Context<'_>,
        input: StartQuizAttemptInput,
    ) -> AppResult<QuizAttemptResponse> {
        let state = ctx.data::<AppState>()?;

        input.validate().map_err(AppError::from)?;
        let quiz_id = parse_id(&input.quiz_id)?;

        let attempt = state
            .attempt_service
            .start_quiz_attempt(&input.user_id, &quiz_id)
            .await?;

        Ok(QuizAttemptResponse::from(attempt))
    }

    async fn submit_quiz_attempt(
        &self,
        ctx: &Context<'_>,
        input: SubmitQuizAttemptInput,
    ) -> AppResult<QuizAttemptResponse> {
        let state = ctx.data::<AppState>()?;

        input.validate().map_err(AppError::from)?;
        let attempt_id = parse_id(&input.attempt_id)?;

        let attempt = state
            .attempt_service
            .submit_quiz_attempt(&attempt_id, &input.answers)
            .await?;

        Ok(QuizAttemptResponse::from(attempt))
    }
}
