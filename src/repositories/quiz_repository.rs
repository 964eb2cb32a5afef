use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database, errors::AppResult, models::domain::Quiz, models::dto::request::QuizFilterInput,
};

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    /// Active, public quizzes matching the filter, in stable stored order.
    async fn list(&self, filter: &QuizFilterInput, offset: i64, limit: i64)
        -> AppResult<Vec<Quiz>>;
    /// The full active, public pool for recommendation candidate selection.
    async fn list_active_public(&self) -> AppResult<Vec<Quiz>>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quizzes");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let category_index = IndexModel::builder()
            .keys(doc! { "category": 1, "difficulty": 1 })
            .options(
                IndexOptions::builder()
                    .name("category_difficulty".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(category_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }

    fn filter_document(filter: &QuizFilterInput) -> mongodb::bson::Document {
        let mut filter_doc = doc! { "is_active": true, "is_public": true };

        if let Some(category) = &filter.category {
            filter_doc.insert("category", category);
        }

        if filter.difficulty_min.is_some() || filter.difficulty_max.is_some() {
            let mut range = doc! {};
            if let Some(min) = filter.difficulty_min {
                range.insert("$gte", min as i32);
            }
            if let Some(max) = filter.difficulty_max {
                range.insert("$lte", max as i32);
            }
            filter_doc.insert("difficulty", range);
        }

        if let Some(language) = &filter.language {
            filter_doc.insert("language", language);
        }

        if let Some(tags) = &filter.tags {
            if !tags.is_empty() {
                filter_doc.insert("tags", doc! { "$in": tags });
            }
        }

        filter_doc
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn list(
        &self,
        filter: &QuizFilterInput,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Quiz>> {
        let filter_doc = Self::filter_document(filter);

        let quizzes = self
            .collection
            .find(filter_doc)
            .sort(doc! { "effectiveness": -1, "id": 1 })
            .skip(offset.max(0) as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(quizzes)
    }

    async fn list_active_public(&self) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .collection
            .find(doc! { "is_active": true, "is_public": true })
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(quizzes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_document_defaults_to_active_public() {
        let doc = MongoQuizRepository::filter_document(&QuizFilterInput::default());

        assert_eq!(doc.get_bool("is_active").unwrap(), true);
        assert_eq!(doc.get_bool("is_public").unwrap(), true);
        assert!(doc.get("category").is_none());
    }

    #[test]
    fn filter_document_includes_difficulty_range() {
        let filter = QuizFilterInput {
            difficulty_min: Some(2),
            difficulty_max: Some(8),
            ..Default::default()
        };

        let doc = MongoQuizRepository::filter_document(&filter);
        let range = doc.get_document("difficulty").unwrap();

        assert_eq!(range.get_i32("$gte").unwrap(), 2);
        assert_eq!(range.get_i32("$lte").unwrap(), 8);
    }

    #[test]
    fn filter_document_matches_any_requested_tag() {
        let filter = QuizFilterInput {
            tags: Some(vec!["math".to_string(), "basic".to_string()]),
            ..Default::default()
        };

        let doc = MongoQuizRepository::filter_document(&filter);
        let tags = doc.get_document("tags").unwrap();

        assert_eq!(tags.get_array("$in").unwrap().len(), 2);
    }
}
