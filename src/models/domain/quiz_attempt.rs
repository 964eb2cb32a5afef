use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::Quiz;

/// One user's pass through a quiz, from `start` to completion.
///
/// The attempt snapshots the quiz's category and difficulty so that
/// analytics and recommendation factors can group historical attempts
/// without re-reading quizzes that may have changed since.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub quiz_category: String,
    pub quiz_difficulty: i16,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub score: f64, // 0-100
    pub total_questions: i16,
    pub correct_answers: i16,
    pub time_spent: i64, // seconds
    pub learning_gain: f64,
    pub retention_score: f64,
    pub engagement_score: f64,
    pub question_attempts: Vec<QuestionAttempt>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionAttempt {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub time_spent: i64, // seconds
    pub confidence: f64, // 0-1
    pub hints_used: i16,
    pub retries: i16,
}

impl QuizAttempt {
    pub fn start(user_id: &str, quiz: &Quiz) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz.id.clone(),
            quiz_category: quiz.category.clone(),
            quiz_difficulty: quiz.difficulty,
            started_at: Utc::now(),
            completed_at: None,
            score: 0.0,
            total_questions: quiz.questions.len() as i16,
            correct_answers: 0,
            time_spent: 0,
            learning_gain: 0.0,
            retention_score: 0.0,
            engagement_score: 0.0,
            question_attempts: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_attempt_is_not_completed() {
        let quiz = Quiz::new("Basics", "Programming", 4, 480);
        let attempt = QuizAttempt::start("user-1", &quiz);

        assert!(!attempt.is_completed());
        assert_eq!(attempt.quiz_id, quiz.id);
        assert_eq!(attempt.quiz_category, "Programming");
        assert_eq!(attempt.quiz_difficulty, 4);
        assert_eq!(attempt.score, 0.0);
        assert!(attempt.question_attempts.is_empty());
    }

    #[test]
    fn attempt_round_trip_serialization_preserves_metrics() {
        let quiz = Quiz::new("Basics", "Programming", 4, 480);
        let mut attempt = QuizAttempt::start("user-1", &quiz);
        attempt.completed_at = Some(Utc::now());
        attempt.score = 83.5;
        attempt.correct_answers = 5;
        attempt.learning_gain = 0.42;
        attempt.retention_score = 0.77;
        attempt.engagement_score = 0.9;
        attempt.question_attempts = vec![QuestionAttempt {
            id: "qa-1".to_string(),
            attempt_id: attempt.id.clone(),
            question_id: "q-1".to_string(),
            user_answer: Some("42".to_string()),
            is_correct: true,
            time_spent: 12,
            confidence: 0.8,
            hints_used: 0,
            retries: 0,
        }];

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: QuizAttempt = serde_json::from_str(&json).expect("attempt should deserialize");

        assert!(parsed.is_completed());
        assert_eq!(parsed.score, 83.5);
        assert_eq!(parsed.correct_answers, 5);
        assert_eq!(parsed.question_attempts.len(), 1);
        assert!(parsed.question_attempts[0].is_correct);
    }
}
