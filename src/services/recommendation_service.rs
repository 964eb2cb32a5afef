use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    errors::AppResult,
    models::domain::{Quiz, QuizAttempt, UserAnalytics},
    models::dto::response::{QuizSummary, RecommendedQuiz},
    repositories::{
        QuizAnalyticsRepository, QuizAttemptRepository, QuizRepository, UserAnalyticsRepository,
    },
};

const ATTEMPT_HISTORY_WINDOW: i64 = 10;
const ANALYTICS_WINDOW_DAYS: i64 = 7;
const CATEGORY_INTEREST_COUNT: usize = 3;
const NEUTRAL_DIFFICULTY: f64 = 5.0;

const DIFFICULTY_WEIGHT: f64 = 0.30;
const CATEGORY_WEIGHT: f64 = 0.25;
const QUALITY_WEIGHT: f64 = 0.25;
const ENGAGEMENT_WEIGHT: f64 = 0.20;

/// Per-request snapshot of a user's learning profile. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationFactors {
    pub difficulty_preference: f64,
    pub category_interests: Vec<String>,
    pub learning_velocity: f64,
    pub retention_pattern: f64,
    pub engagement_level: f64,
}

pub struct RecommendationService {
    quiz_repository: Arc<dyn QuizRepository>,
    attempt_repository: Arc<dyn QuizAttemptRepository>,
    user_analytics_repository: Arc<dyn UserAnalyticsRepository>,
    quiz_analytics_repository: Arc<dyn QuizAnalyticsRepository>,
}

impl RecommendationService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        user_analytics_repository: Arc<dyn UserAnalyticsRepository>,
        quiz_analytics_repository: Arc<dyn QuizAnalyticsRepository>,
    ) -> Self {
        Self {
            quiz_repository,
            attempt_repository,
            user_analytics_repository,
            quiz_analytics_repository,
        }
    }

    pub async fn generate(&self, user_id: &str, limit: usize) -> AppResult<Vec<RecommendedQuiz>> {
        let recent_attempts = self
            .attempt_repository
            .find_recent_completed_by_user(user_id, ATTEMPT_HISTORY_WINDOW)
            .await?;
        let since = Utc::now() - Duration::days(ANALYTICS_WINDOW_DAYS);
        let recent_analytics = self
            .user_analytics_repository
            .find_recent_by_user(user_id, since)
            .await?;

        let factors = Self::derive_factors(&recent_attempts, &recent_analytics);
        let completed = self.attempt_repository.completed_quiz_ids(user_id).await?;

        let pool = self.quiz_repository.list_active_public().await?;
        let mut recommendations = Vec::new();

        for quiz in &pool {
            if completed.contains(&quiz.id) {
                continue;
            }
            if !Self::is_candidate(quiz, &factors) {
                continue;
            }

            let engagement_rows = self
                .quiz_analytics_repository
                .find_recent_by_quiz(&quiz.id, since)
                .await?;
            let avg_recent_engagement = if engagement_rows.is_empty() {
                0.0
            } else {
                engagement_rows
                    .iter()
                    .map(|row| row.average_engagement)
                    .sum::<f64>()
                    / engagement_rows.len() as f64
            };

            recommendations.push(RecommendedQuiz {
                quiz: QuizSummary::from(quiz),
                recommendation_score: Self::score_candidate(quiz, &factors, avg_recent_engagement),
            });
        }

        // Stable sort keeps discovery order for tied scores.
        recommendations.sort_by(|a, b| {
            b.recommendation_score
                .partial_cmp(&a.recommendation_score)
                .unwrap_or(Ordering::Equal)
        });
        recommendations.truncate(limit);

        log::info!(
            "Generated {} recommendations for user {}",
            recommendations.len(),
            user_id
        );
        Ok(recommendations)
    }

    /// Profile from the most recent attempts and the last week of daily
    /// analytics; neutral defaults when the user has no history.
    pub fn derive_factors(
        attempts: &[QuizAttempt],
        analytics: &[UserAnalytics],
    ) -> RecommendationFactors {
        let difficulty_preference = if attempts.is_empty() {
            NEUTRAL_DIFFICULTY
        } else {
            attempts
                .iter()
                .map(|a| a.quiz_difficulty as f64)
                .sum::<f64>()
                / attempts.len() as f64
        };

        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (index, attempt) in attempts.iter().enumerate() {
            let entry = counts
                .entry(attempt.quiz_category.as_str())
                .or_insert((0, index));
            entry.0 += 1;
        }
        let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        let category_interests = ranked
            .into_iter()
            .take(CATEGORY_INTEREST_COUNT)
            .map(|(category, _)| category.to_string())
            .collect();

        let window = analytics.len() as f64;
        let (learning_velocity, retention_pattern, engagement_level) = if analytics.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                analytics.iter().map(|r| r.learning_velocity).sum::<f64>() / window,
                analytics.iter().map(|r| r.retention_rate).sum::<f64>() / window,
                analytics.iter().map(|r| r.engagement_score).sum::<f64>() / window,
            )
        };

        RecommendationFactors {
            difficulty_preference,
            category_interests,
            learning_velocity,
            retention_pattern,
            engagement_level,
        }
    }

    /// A candidate must interest the user by category OR sit within one
    /// difficulty step of their preference; either suffices.
    pub fn is_candidate(quiz: &Quiz, factors: &RecommendationFactors) -> bool {
        let category_match = factors
            .category_interests
            .iter()
            .any(|c| c == &quiz.category);
        let difficulty_match =
            (quiz.difficulty as f64 - factors.difficulty_preference).abs() <= 1.0;
        category_match || difficulty_match
    }

    pub fn score_candidate(
        quiz: &Quiz,
        factors: &RecommendationFactors,
        avg_recent_engagement: f64,
    ) -> f64 {
        let difficulty_match =
            1.0 - (quiz.difficulty as f64 - factors.difficulty_preference).abs() / 10.0;

        let category_bonus = factors
            .category_interests
            .iter()
            .position(|c| c == &quiz.category)
            .map(|rank| 1.0 - rank as f64 * 0.2)
            .unwrap_or(0.0);

        DIFFICULTY_WEIGHT * difficulty_match
            + CATEGORY_WEIGHT * category_bonus
            + QUALITY_WEIGHT * quiz.effectiveness
            + ENGAGEMENT_WEIGHT * avg_recent_engagement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Quiz;

    fn attempt_for(category: &str, difficulty: i16) -> QuizAttempt {
        let quiz = Quiz::new("q", category, difficulty, 300);
        let mut attempt = QuizAttempt::start("user-1", &quiz);
        attempt.completed_at = Some(Utc::now());
        attempt.score = 80.0;
        attempt
    }

    #[test]
    fn factors_default_to_neutral_difficulty_without_history() {
        let factors = RecommendationService::derive_factors(&[], &[]);

        assert_eq!(factors.difficulty_preference, NEUTRAL_DIFFICULTY);
        assert!(factors.category_interests.is_empty());
        assert_eq!(factors.engagement_level, 0.0);
    }

    #[test]
    fn factors_average_recent_difficulty() {
        let attempts = vec![
            attempt_for("Math", 2),
            attempt_for("Math", 4),
            attempt_for("Programming", 6),
        ];

        let factors = RecommendationService::derive_factors(&attempts, &[]);

        assert!((factors.difficulty_preference - 4.0).abs() < 1e-9);
    }

    #[test]
    fn category_interests_rank_by_frequency_then_recency() {
        let attempts = vec![
            attempt_for("Math", 3),
            attempt_for("Programming", 3),
            attempt_for("Math", 3),
            attempt_for("Science", 3),
            attempt_for("History", 3),
        ];

        let factors = RecommendationService::derive_factors(&attempts, &[]);

        assert_eq!(factors.category_interests.len(), 3);
        assert_eq!(factors.category_interests[0], "Math");
        // Programming was seen before Science and History at equal counts.
        assert_eq!(factors.category_interests[1], "Programming");
    }

    #[test]
    fn candidate_filter_is_a_union_of_category_and_difficulty() {
        let factors = RecommendationFactors {
            difficulty_preference: 3.0,
            category_interests: vec!["Math".to_string()],
            learning_velocity: 0.0,
            retention_pattern: 0.0,
            engagement_level: 0.0,
        };

        // Interesting category, distant difficulty: still a candidate.
        let far_math = Quiz::new("far", "Math", 9, 300);
        assert!(RecommendationService::is_candidate(&far_math, &factors));

        // Boring category, adjacent difficulty: still a candidate.
        let near_history = Quiz::new("near", "History", 4, 300);
        assert!(RecommendationService::is_candidate(&near_history, &factors));

        // Boring category and distant difficulty: excluded.
        let far_history = Quiz::new("far2", "History", 8, 300);
        assert!(!RecommendationService::is_candidate(&far_history, &factors));
    }

    #[test]
    fn score_weights_follow_the_ranking_model() {
        let factors = RecommendationFactors {
            difficulty_preference: 3.0,
            category_interests: vec!["Math".to_string(), "Programming".to_string()],
            learning_velocity: 0.0,
            retention_pattern: 0.0,
            engagement_level: 0.0,
        };

        let mut quiz = Quiz::new("q", "Math", 3, 300);
        quiz.effectiveness = 0.8;

        let score = RecommendationService::score_candidate(&quiz, &factors, 0.5);

        // 0.30*1.0 + 0.25*1.0 + 0.25*0.8 + 0.20*0.5
        assert!((score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn second_ranked_category_gets_a_reduced_bonus() {
        let factors = RecommendationFactors {
            difficulty_preference: 5.0,
            category_interests: vec!["Math".to_string(), "Programming".to_string()],
            learning_velocity: 0.0,
            retention_pattern: 0.0,
            engagement_level: 0.0,
        };

        let math = Quiz::new("a", "Math", 5, 300);
        let programming = Quiz::new("b", "Programming", 5, 300);

        let math_score = RecommendationService::score_candidate(&math, &factors, 0.0);
        let programming_score =
            RecommendationService::score_candidate(&programming, &factors, 0.0);

        // Rank 0 earns the full category weight, rank 1 eighty percent.
        assert!((math_score - programming_score - 0.25 * 0.2).abs() < 1e-9);
    }
}
