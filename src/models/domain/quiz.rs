use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::Question;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub difficulty: i16, // 1-10
    pub language: String,
    pub tags: Vec<String>,
    pub estimated_time: i64, // seconds
    pub effectiveness: f64,  // 0-1 quality prior
    pub is_active: bool,
    pub is_public: bool,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn new(title: &str, category: &str, difficulty: i16, estimated_time: i64) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            category: category.to_string(),
            difficulty,
            language: "en".to_string(),
            tags: Vec::new(),
            estimated_time,
            effectiveness: 0.5,
            is_active: true,
            is_public: true,
            questions: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// Questions sorted by their position within the quiz.
    pub fn questions_in_order(&self) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self.questions.iter().collect();
        questions.sort_by_key(|q| q.order);
        questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::QuestionType;

    fn question(id: &str, order: i16) -> Question {
        Question {
            id: id.to_string(),
            question_type: QuestionType::TrueFalse,
            prompt: "prompt".to_string(),
            options: Some(vec!["True".to_string(), "False".to_string()]),
            correct_answer: "True".to_string(),
            explanation: None,
            difficulty: 3,
            points: 1,
            time_limit: Some(20),
            order,
        }
    }

    #[test]
    fn questions_in_order_sorts_by_position() {
        let mut quiz = Quiz::new("Ordering", "Testing", 3, 120);
        quiz.questions = vec![question("q3", 2), question("q1", 0), question("q2", 1)];

        let ordered: Vec<&str> = quiz
            .questions_in_order()
            .iter()
            .map(|q| q.id.as_str())
            .collect();

        assert_eq!(ordered, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn quiz_round_trip_serialization_preserves_metadata() {
        let mut quiz = Quiz::new("Basic Mathematics", "Mathematics", 3, 300);
        quiz.tags = vec!["math".to_string(), "basic".to_string()];
        quiz.effectiveness = 0.75;

        let json = serde_json::to_string(&quiz).expect("quiz should serialize");
        let parsed: Quiz = serde_json::from_str(&json).expect("quiz should deserialize");

        assert_eq!(parsed.category, "Mathematics");
        assert_eq!(parsed.difficulty, 3);
        assert_eq!(parsed.estimated_time, 300);
        assert!((parsed.effectiveness - 0.75).abs() < f64::EPSILON);
        assert!(parsed.is_active);
        assert!(parsed.is_public);
    }
}
