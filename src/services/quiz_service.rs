use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Quiz,
    models::dto::request::QuizFilterInput,
    repositories::QuizRepository,
};

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
}

impl QuizService {
    pub fn new(repository: Arc<dyn QuizRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;

        Ok(quiz)
    }

    /// Like `get_quiz`, but rejects quizzes that may not be taken.
    pub async fn get_quiz_for_taking(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self.get_quiz(id).await?;

        if !quiz.is_active {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' is not active",
                id
            )));
        }

        Ok(quiz)
    }

    pub async fn list_quizzes(
        &self,
        filter: &QuizFilterInput,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Quiz>> {
        self.repository.list(filter, offset, limit).await
    }
}
