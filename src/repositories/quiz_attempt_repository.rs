use std::collections::HashSet;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::QuizAttempt};

#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    /// Atomically transitions a started attempt to completed, writing the
    /// scoring results. Returns `None` when the attempt does not exist or
    /// was already completed, so only the first of two concurrent
    /// submissions succeeds.
    async fn complete(&self, attempt: &QuizAttempt) -> AppResult<Option<QuizAttempt>>;
    /// Completed attempts, most recent first.
    async fn find_recent_completed_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<QuizAttempt>>;
    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn completed_quiz_ids(&self, user_id: &str) -> AppResult<HashSet<String>>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_completed_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_completed".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_completed_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn complete(&self, attempt: &QuizAttempt) -> AppResult<Option<QuizAttempt>> {
        // The completed_at guard makes the update conditional: a second
        // submission for the same attempt matches nothing and gets None.
        let update = doc! {
            "$set": {
                "completed_at": to_bson(&attempt.completed_at)?,
                "score": attempt.score,
                "total_questions": attempt.total_questions as i32,
                "correct_answers": attempt.correct_answers as i32,
                "time_spent": attempt.time_spent,
                "learning_gain": attempt.learning_gain,
                "retention_score": attempt.retention_score,
                "engagement_score": attempt.engagement_score,
                "question_attempts": to_bson(&attempt.question_attempts)?,
            }
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "id": &attempt.id, "completed_at": null }, update)
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn find_recent_completed_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id, "completed_at": { "$ne": null } })
            .sort(doc! { "completed_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(attempts)
    }

    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id, "completed_at": { "$ne": null } })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(attempts)
    }

    async fn completed_quiz_ids(&self, user_id: &str) -> AppResult<HashSet<String>> {
        let ids = self
            .collection
            .distinct(
                "quiz_id",
                doc! { "user_id": user_id, "completed_at": { "$ne": null } },
            )
            .await?;

        Ok(ids
            .into_iter()
            .filter_map(|value| value.as_str().map(|s| s.to_string()))
            .collect())
    }
}
