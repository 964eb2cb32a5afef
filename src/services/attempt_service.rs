use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{QuestionAttempt, QuizAttempt},
    models::dto::response::UserStats,
    repositories::{QuizAttemptRepository, QuizRepository},
    services::analytics_service::AnalyticsService,
    services::attempt_scorer::AttemptScorer,
    services::learning_metrics::LearningMetricsCalculator,
};

const STRONG_AREA_THRESHOLD: f64 = 70.0;
const AREA_LIMIT: usize = 3;

/// Drives the attempt lifecycle: start, score-and-complete, and the
/// derived per-user statistics.
pub struct AttemptService {
    quiz_repository: Arc<dyn QuizRepository>,
    attempt_repository: Arc<dyn QuizAttemptRepository>,
    analytics_service: Arc<AnalyticsService>,
}

impl AttemptService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        analytics_service: Arc<AnalyticsService>,
    ) -> Self {
        Self {
            quiz_repository,
            attempt_repository,
            analytics_service,
        }
    }

    pub async fn start_quiz_attempt(&self, user_id: &str, quiz_id: &str) -> AppResult<QuizAttempt> {
        let quiz = self
            .quiz_repository
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        if !quiz.is_active {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' is not active",
                quiz_id
            )));
        }

        let attempt = QuizAttempt::start(user_id, &quiz);
        let attempt = self.attempt_repository.create(attempt).await?;
        self.analytics_service.record_attempt_started(&attempt).await?;

        log::info!(
            "Quiz attempt {} started for quiz {} by user {}",
            attempt.id,
            quiz_id,
            user_id
        );
        Ok(attempt)
    }

    pub async fn submit_quiz_attempt(
        &self,
        attempt_id: &str,
        answers: &[String],
    ) -> AppResult<QuizAttempt> {
        let attempt = self
            .attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Quiz attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.is_completed() {
            return Err(AppError::InvalidState(format!(
                "Quiz attempt '{}' was already completed",
                attempt_id
            )));
        }

        let quiz = self
            .quiz_repository
            .find_by_id(&attempt.quiz_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Quiz with id '{}' not found", attempt.quiz_id))
            })?;

        let completed_at = Utc::now();
        let time_spent = (completed_at - attempt.started_at).num_seconds().max(0);

        let scored = AttemptScorer::score(&quiz, answers, time_spent);
        let metrics = LearningMetricsCalculator::compute(
            &quiz,
            &scored.per_question,
            scored.correct_count,
            scored.time_efficiency,
        );

        let question_attempts = scored
            .per_question
            .into_iter()
            .map(|result| QuestionAttempt {
                id: Uuid::new_v4().to_string(),
                attempt_id: attempt.id.clone(),
                question_id: result.question_id,
                user_answer: result.user_answer,
                is_correct: result.is_correct,
                time_spent: result.time_spent,
                confidence: result.confidence,
                hints_used: 0,
                retries: 0,
            })
            .collect();

        let mut completed = attempt;
        completed.completed_at = Some(completed_at);
        completed.score = scored.adjusted_score;
        completed.total_questions = quiz.questions.len() as i16;
        completed.correct_answers = scored.correct_count;
        completed.time_spent = time_spent;
        completed.learning_gain = metrics.learning_gain;
        completed.retention_score = metrics.retention_score;
        completed.engagement_score = metrics.engagement_score;
        completed.question_attempts = question_attempts;

        // The conditional update decides the winner when two submissions
        // race; the loser observes None here.
        let stored = self
            .attempt_repository
            .complete(&completed)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Quiz attempt '{}' was already completed",
                    attempt_id
                ))
            })?;

        self.analytics_service.apply_completed_attempt(&stored).await?;

        log::info!(
            "Quiz attempt {} completed with score {:.1} ({}/{} correct)",
            stored.id,
            stored.score,
            stored.correct_answers,
            stored.total_questions
        );
        Ok(stored)
    }

    pub async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStats> {
        let attempts = self.attempt_repository.find_completed_by_user(user_id).await?;

        if attempts.is_empty() {
            return Ok(UserStats {
                total_attempts: 0,
                completed_quizzes: 0,
                average_score: 0.0,
                total_time_spent: 0,
                preferred_categories: Vec::new(),
                strongest_areas: Vec::new(),
                improvement_areas: Vec::new(),
            });
        }

        let total_score: f64 = attempts.iter().map(|a| a.score).sum();
        let total_time: i64 = attempts.iter().map(|a| a.time_spent).sum();

        let mut category_stats: HashMap<&str, (f64, usize)> = HashMap::new();
        for attempt in &attempts {
            let entry = category_stats
                .entry(attempt.quiz_category.as_str())
                .or_insert((0.0, 0));
            entry.0 += attempt.score;
            entry.1 += 1;
        }

        let mut performance: Vec<(String, f64, usize)> = category_stats
            .into_iter()
            .map(|(category, (sum, count))| (category.to_string(), sum / count as f64, count))
            .collect();
        performance.sort_by(|a, b| a.0.cmp(&b.0));

        let mut preferred: Vec<(String, usize)> = performance
            .iter()
            .map(|(category, _, count)| (category.clone(), *count))
            .collect();
        preferred.sort_by(|a, b| b.1.cmp(&a.1));
        let preferred_categories = preferred
            .into_iter()
            .take(AREA_LIMIT)
            .map(|(category, _)| category)
            .collect();

        let mut strongest: Vec<(String, f64)> = performance
            .iter()
            .filter(|(_, mean, _)| *mean >= STRONG_AREA_THRESHOLD)
            .map(|(category, mean, _)| (category.clone(), *mean))
            .collect();
        strongest.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut improvement: Vec<(String, f64)> = performance
            .iter()
            .filter(|(_, mean, _)| *mean < STRONG_AREA_THRESHOLD)
            .map(|(category, mean, _)| (category.clone(), *mean))
            .collect();
        improvement.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(UserStats {
            total_attempts: attempts.len() as i64,
            completed_quizzes: attempts.len() as i64,
            average_score: total_score / attempts.len() as f64,
            total_time_spent: total_time,
            preferred_categories,
            strongest_areas: strongest
                .into_iter()
                .take(AREA_LIMIT)
                .map(|(category, _)| category)
                .collect(),
            improvement_areas: improvement
                .into_iter()
                .take(AREA_LIMIT)
                .map(|(category, _)| category)
                .collect(),
        })
    }
}
