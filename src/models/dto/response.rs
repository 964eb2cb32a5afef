use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    question::QuestionType, Question, Quiz, QuizAttempt,
};

/// A question as shown to a user taking the quiz, with the answer key and
/// explanation stripped.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionForTaking {
    pub id: String,
    pub question_type: QuestionType,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub difficulty: i16,
    pub points: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    pub order: i16,
}

impl From<&Question> for QuestionForTaking {
    fn from(question: &Question) -> Self {
        QuestionForTaking {
            id: question.id.clone(),
            question_type: question.question_type,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty,
            points: question.points,
            time_limit: question.time_limit,
            order: question.order,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizForTaking {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub difficulty: i16,
    pub language: String,
    pub tags: Vec<String>,
    pub estimated_time: i64,
    pub questions: Vec<QuestionForTaking>,
}

impl QuizForTaking {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        QuizForTaking {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            category: quiz.category.clone(),
            difficulty: quiz.difficulty,
            language: quiz.language.clone(),
            tags: quiz.tags.clone(),
            estimated_time: quiz.estimated_time,
            questions: quiz
                .questions_in_order()
                .into_iter()
                .map(QuestionForTaking::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionAttemptDto {
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub time_spent: i64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizAttemptResponse {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub score: f64,
    pub total_questions: i16,
    pub correct_answers: i16,
    pub time_spent: i64,
    pub learning_gain: f64,
    pub retention_score: f64,
    pub engagement_score: f64,
    pub question_results: Vec<QuestionAttemptDto>,
}

impl From<QuizAttempt> for QuizAttemptResponse {
    fn from(attempt: QuizAttempt) -> Self {
        QuizAttemptResponse {
            id: attempt.id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            score: attempt.score,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            time_spent: attempt.time_spent,
            learning_gain: attempt.learning_gain,
            retention_score: attempt.retention_score,
            engagement_score: attempt.engagement_score,
            question_results: attempt
                .question_attempts
                .into_iter()
                .map(|qa| QuestionAttemptDto {
                    question_id: qa.question_id,
                    user_answer: qa.user_answer,
                    is_correct: qa.is_correct,
                    time_spent: qa.time_spent,
                    confidence: qa.confidence,
                })
                .collect(),
        }
    }
}

/// Quiz metadata without its question list, for listings and
/// recommendations.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub difficulty: i16,
    pub language: String,
    pub tags: Vec<String>,
    pub estimated_time: i64,
    pub effectiveness: f64,
    pub question_count: i16,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        QuizSummary {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            category: quiz.category.clone(),
            difficulty: quiz.difficulty,
            language: quiz.language.clone(),
            tags: quiz.tags.clone(),
            estimated_time: quiz.estimated_time,
            effectiveness: quiz.effectiveness,
            question_count: quiz.questions.len() as i16,
        }
    }
}

/// A recommendation candidate paired with its computed ranking signal.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct RecommendedQuiz {
    pub quiz: QuizSummary,
    pub recommendation_score: f64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserStats {
    pub total_attempts: i64,
    pub completed_quizzes: i64,
    pub average_score: f64,
    pub total_time_spent: i64,
    pub preferred_categories: Vec<String>,
    pub strongest_areas: Vec<String>,
    pub improvement_areas: Vec<String>,
}

/// Window aggregation over a user's daily analytics rows: counters are
/// summed, derived scores averaged across the rows in the window.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserAnalyticsSummary {
    pub questions_answered: i64,
    pub correct_answers: i64,
    pub time_spent: i64,
    pub quizzes_completed: i64,
    pub knowledge_gain: f64,
    pub retention_rate: f64,
    pub learning_velocity: f64,
    pub engagement_score: f64,
    pub days: i64,
}
