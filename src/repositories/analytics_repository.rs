use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};
use uuid::Uuid;

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{QuizAnalytics, UserAnalytics},
};

/// One completed attempt's contribution to a (user, day) rollup.
/// Counters are added to the stored row; derived fields replace it.
#[derive(Clone, Debug, PartialEq)]
pub struct UserAnalyticsPatch {
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub questions_answered: i64,
    pub correct_answers: i64,
    pub time_spent: i64,
    pub quizzes_completed: i64,
    pub knowledge_gain: f64,
    pub retention_rate: f64,
    pub learning_velocity: f64,
    pub engagement_score: f64,
    pub optimal_difficulty: i16,
    pub preferred_topics: Vec<String>,
}

/// One attempt's contribution to a (quiz, day) rollup, same policy.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizAnalyticsPatch {
    pub quiz_id: String,
    pub date: DateTime<Utc>,
    pub attempts: i64,
    pub completions: i64,
    pub average_score: Option<f64>,
    pub average_engagement: Option<f64>,
}

#[async_trait]
pub trait UserAnalyticsRepository: Send + Sync {
    async fn find_by_user_and_date(
        &self,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> AppResult<Option<UserAnalytics>>;
    /// Day rows on or after `since`, newest first.
    async fn find_recent_by_user(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<UserAnalytics>>;
    async fn upsert_day(&self, patch: &UserAnalyticsPatch) -> AppResult<()>;
}

#[async_trait]
pub trait QuizAnalyticsRepository: Send + Sync {
    async fn find_recent_by_quiz(
        &self,
        quiz_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<QuizAnalytics>>;
    async fn upsert_day(&self, patch: &QuizAnalyticsPatch) -> AppResult<()>;
}

pub struct MongoUserAnalyticsRepository {
    collection: Collection<UserAnalytics>,
}

impl MongoUserAnalyticsRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("user_analytics");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for user_analytics collection");

        let user_date_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "date": -1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_date_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_date_index).await?;

        log::info!("Successfully created indexes for user_analytics collection");
        Ok(())
    }
}

#[async_trait]
impl UserAnalyticsRepository for MongoUserAnalyticsRepository {
    async fn find_by_user_and_date(
        &self,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> AppResult<Option<UserAnalytics>> {
        let row = self
            .collection
            .find_one(doc! { "user_id": user_id, "date": to_bson(&date)? })
            .await?;
        Ok(row)
    }

    async fn find_recent_by_user(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<UserAnalytics>> {
        let rows = self
            .collection
            .find(doc! { "user_id": user_id, "date": { "$gte": to_bson(&since)? } })
            .sort(doc! { "date": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }

    async fn upsert_day(&self, patch: &UserAnalyticsPatch) -> AppResult<()> {
        // $inc keeps concurrent same-day completions additive; the derived
        // scores are last-writer-wins by policy.
        let update = doc! {
            "$setOnInsert": { "id": Uuid::new_v4().to_string() },
            "$inc": {
                "questions_answered": patch.questions_answered,
                "correct_answers": patch.correct_answers,
                "time_spent": patch.time_spent,
                "quizzes_completed": patch.quizzes_completed,
            },
            "$set": {
                "knowledge_gain": patch.knowledge_gain,
                "retention_rate": patch.retention_rate,
                "learning_velocity": patch.learning_velocity,
                "engagement_score": patch.engagement_score,
                "optimal_difficulty": patch.optimal_difficulty as i32,
                "preferred_topics": to_bson(&patch.preferred_topics)?,
            },
        };

        self.collection
            .update_one(
                doc! { "user_id": &patch.user_id, "date": to_bson(&patch.date)? },
                update,
            )
            .upsert(true)
            .await?;

        Ok(())
    }
}

pub struct MongoQuizAnalyticsRepository {
    collection: Collection<QuizAnalytics>,
}

impl MongoQuizAnalyticsRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_analytics");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_analytics collection");

        let quiz_date_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "date": -1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("quiz_date_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(quiz_date_index).await?;

        log::info!("Successfully created indexes for quiz_analytics collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAnalyticsRepository for MongoQuizAnalyticsRepository {
    async fn find_recent_by_quiz(
        &self,
        quiz_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<QuizAnalytics>> {
        let rows = self
            .collection
            .find(doc! { "quiz_id": quiz_id, "date": { "$gte": to_bson(&since)? } })
            .sort(doc! { "date": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }

    async fn upsert_day(&self, patch: &QuizAnalyticsPatch) -> AppResult<()> {
        let mut set = doc! {};
        if let Some(average_score) = patch.average_score {
            set.insert("average_score", average_score);
        }
        if let Some(average_engagement) = patch.average_engagement {
            set.insert("average_engagement", average_engagement);
        }

        // A field may not appear in both $set and $setOnInsert, so the
        // insert defaults only cover averages this patch does not carry.
        let mut set_on_insert = doc! { "id": Uuid::new_v4().to_string() };
        if patch.average_score.is_none() {
            set_on_insert.insert("average_score", 0.0);
        }
        if patch.average_engagement.is_none() {
            set_on_insert.insert("average_engagement", 0.0);
        }

        let mut update = doc! {
            "$setOnInsert": set_on_insert,
            "$inc": {
                "attempts": patch.attempts,
                "completions": patch.completions,
            },
        };
        if !set.is_empty() {
            update.insert("$set", set);
        }

        self.collection
            .update_one(
                doc! { "quiz_id": &patch.quiz_id, "date": to_bson(&patch.date)? },
                update,
            )
            .upsert(true)
            .await?;

        Ok(())
    }
}
