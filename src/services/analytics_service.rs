use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{analytics::day_bucket, QuizAttempt, UserAnalytics},
    models::dto::response::UserAnalyticsSummary,
    repositories::{
        QuizAnalyticsPatch, QuizAnalyticsRepository, QuizAttemptRepository, UserAnalyticsPatch,
        UserAnalyticsRepository,
    },
};

/// Fallback when no difficulty bucket averages above the qualifying score.
pub const DEFAULT_OPTIMAL_DIFFICULTY: i16 = 5;
const OPTIMAL_DIFFICULTY_ATTEMPT_WINDOW: i64 = 10;
const QUALIFYING_MEAN_SCORE: f64 = 70.0;
const PREFERRED_TOPICS_CAP: usize = 5;

/// Folds completed attempts into per-user and per-quiz daily rollups.
///
/// Counters on a day row are summed across attempts while derived scores
/// are replaced by the latest attempt's values. The asymmetry is inherited
/// deliberately: a day's quality signals track the most recent attempt,
/// its activity counts the whole day.
pub struct AnalyticsService {
    attempt_repository: Arc<dyn QuizAttemptRepository>,
    user_analytics_repository: Arc<dyn UserAnalyticsRepository>,
    quiz_analytics_repository: Arc<dyn QuizAnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        user_analytics_repository: Arc<dyn UserAnalyticsRepository>,
        quiz_analytics_repository: Arc<dyn QuizAnalyticsRepository>,
    ) -> Self {
        Self {
            attempt_repository,
            user_analytics_repository,
            quiz_analytics_repository,
        }
    }

    /// Counts a freshly started attempt toward the quiz's daily attempts.
    pub async fn record_attempt_started(&self, attempt: &QuizAttempt) -> AppResult<()> {
        self.quiz_analytics_repository
            .upsert_day(&QuizAnalyticsPatch {
                quiz_id: attempt.quiz_id.clone(),
                date: day_bucket(attempt.started_at),
                attempts: 1,
                completions: 0,
                average_score: None,
                average_engagement: None,
            })
            .await
    }

    pub async fn apply_completed_attempt(&self, attempt: &QuizAttempt) -> AppResult<UserAnalytics> {
        let completed_at = attempt.completed_at.ok_or_else(|| {
            AppError::InvalidState("cannot aggregate an attempt that is not completed".to_string())
        })?;
        let date = day_bucket(completed_at);

        let knowledge_gain = (attempt.score / 100.0)
            * (attempt.quiz_difficulty as f64 / 10.0)
            * attempt.learning_gain;
        let learning_velocity = Self::learning_velocity(
            attempt.total_questions,
            attempt.correct_answers,
            attempt.time_spent,
        );

        let recent = self
            .attempt_repository
            .find_recent_completed_by_user(&attempt.user_id, OPTIMAL_DIFFICULTY_ATTEMPT_WINDOW)
            .await?;
        let optimal_difficulty = Self::optimal_difficulty(&recent);

        let existing_topics = self
            .user_analytics_repository
            .find_by_user_and_date(&attempt.user_id, date)
            .await?
            .map(|row| row.preferred_topics)
            .unwrap_or_default();
        let preferred_topics = Self::rolled_topics(existing_topics, &attempt.quiz_category);

        let patch = UserAnalyticsPatch {
            user_id: attempt.user_id.clone(),
            date,
            questions_answered: attempt.total_questions as i64,
            correct_answers: attempt.correct_answers as i64,
            time_spent: attempt.time_spent,
            quizzes_completed: 1,
            knowledge_gain,
            retention_rate: attempt.retention_score,
            learning_velocity,
            engagement_score: attempt.engagement_score,
            optimal_difficulty,
            preferred_topics,
        };
        self.user_analytics_repository.upsert_day(&patch).await?;

        self.quiz_analytics_repository
            .upsert_day(&QuizAnalyticsPatch {
                quiz_id: attempt.quiz_id.clone(),
                date,
                attempts: 0,
                completions: 1,
                average_score: Some(attempt.score),
                average_engagement: Some(attempt.engagement_score),
            })
            .await?;

        log::info!(
            "Updated analytics for user {} on {}",
            attempt.user_id,
            date.date_naive()
        );

        self.user_analytics_repository
            .find_by_user_and_date(&attempt.user_id, date)
            .await?
            .ok_or_else(|| {
                AppError::InternalError("analytics row missing after upsert".to_string())
            })
    }

    /// Windowed aggregation over daily rows: counters summed, derived
    /// scores averaged across the rows present in the window.
    pub async fn summarize_user(&self, user_id: &str, days: i64) -> AppResult<UserAnalyticsSummary> {
        let since = day_bucket(Utc::now()) - Duration::days(days.max(1) - 1);
        let rows = self
            .user_analytics_repository
            .find_recent_by_user(user_id, since)
            .await?;

        let mut summary = UserAnalyticsSummary {
            questions_answered: 0,
            correct_answers: 0,
            time_spent: 0,
            quizzes_completed: 0,
            knowledge_gain: 0.0,
            retention_rate: 0.0,
            learning_velocity: 0.0,
            engagement_score: 0.0,
            days,
        };

        for row in &rows {
            summary.questions_answered += row.questions_answered;
            summary.correct_answers += row.correct_answers;
            summary.time_spent += row.time_spent;
            summary.quizzes_completed += row.quizzes_completed;
            summary.knowledge_gain += row.knowledge_gain;
            summary.retention_rate += row.retention_rate;
            summary.learning_velocity += row.learning_velocity;
            summary.engagement_score += row.engagement_score;
        }

        let count = rows.len().max(1) as f64;
        summary.knowledge_gain /= count;
        summary.retention_rate /= count;
        summary.learning_velocity /= count;
        summary.engagement_score /= count;

        Ok(summary)
    }

    /// Questions per minute weighted by accuracy. Zero elapsed time counts
    /// as one second so a lightning-fast attempt cannot produce an
    /// infinite velocity.
    fn learning_velocity(total_questions: i16, correct_answers: i16, time_spent: i64) -> f64 {
        if total_questions == 0 {
            return 0.0;
        }
        let minutes = time_spent.max(1) as f64 / 60.0;
        let questions = total_questions as f64;
        (questions / minutes) * (correct_answers as f64 / questions)
    }

    /// Best mean-score difficulty among the recent attempts, restricted to
    /// buckets averaging above the qualifying score. A single lucky run on
    /// an otherwise poor tier cannot win: tiers below the bar are ignored
    /// entirely and the mid-scale default is kept instead.
    fn optimal_difficulty(recent: &[QuizAttempt]) -> i16 {
        let mut buckets: BTreeMap<i16, (f64, u32)> = BTreeMap::new();
        for attempt in recent {
            let entry = buckets.entry(attempt.quiz_difficulty).or_insert((0.0, 0));
            entry.0 += attempt.score;
            entry.1 += 1;
        }

        let mut best: Option<(i16, f64)> = None;
        for (difficulty, (sum, count)) in buckets {
            let mean = sum / count as f64;
            if mean <= QUALIFYING_MEAN_SCORE {
                continue;
            }
            match best {
                Some((_, best_mean)) if mean <= best_mean => {}
                _ => best = Some((difficulty, mean)),
            }
        }

        best.map(|(difficulty, _)| difficulty)
            .unwrap_or(DEFAULT_OPTIMAL_DIFFICULTY)
    }

    /// Appends a newly seen category and keeps the five most recent.
    fn rolled_topics(mut topics: Vec<String>, category: &str) -> Vec<String> {
        if !topics.iter().any(|t| t == category) {
            topics.push(category.to_string());
        }
        while topics.len() > PREFERRED_TOPICS_CAP {
            topics.remove(0);
        }
        topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Quiz;

    fn completed_attempt(difficulty: i16, score: f64) -> QuizAttempt {
        let quiz = Quiz::new("t", "Testing", difficulty, 300);
        let mut attempt = QuizAttempt::start("user-1", &quiz);
        attempt.completed_at = Some(Utc::now());
        attempt.score = score;
        attempt
    }

    #[test]
    fn optimal_difficulty_picks_best_qualifying_bucket() {
        let attempts = vec![
            completed_attempt(3, 80.0),
            completed_attempt(3, 90.0),
            completed_attempt(5, 75.0),
            completed_attempt(7, 40.0),
        ];

        // Difficulty 3 averages 85, difficulty 5 averages 75, difficulty 7
        // fails to qualify.
        assert_eq!(AnalyticsService::optimal_difficulty(&attempts), 3);
    }

    #[test]
    fn optimal_difficulty_defaults_when_no_bucket_qualifies() {
        let attempts = vec![
            completed_attempt(2, 50.0),
            completed_attempt(4, 65.0),
            completed_attempt(9, 70.0), // exactly 70 does not qualify
        ];

        assert_eq!(
            AnalyticsService::optimal_difficulty(&attempts),
            DEFAULT_OPTIMAL_DIFFICULTY
        );
    }

    #[test]
    fn optimal_difficulty_defaults_with_no_history() {
        assert_eq!(
            AnalyticsService::optimal_difficulty(&[]),
            DEFAULT_OPTIMAL_DIFFICULTY
        );
    }

    #[test]
    fn rolled_topics_appends_new_and_skips_known_categories() {
        let topics = AnalyticsService::rolled_topics(vec!["Math".to_string()], "Programming");
        assert_eq!(topics, vec!["Math", "Programming"]);

        let topics = AnalyticsService::rolled_topics(topics, "Math");
        assert_eq!(topics, vec!["Math", "Programming"]);
    }

    #[test]
    fn rolled_topics_drops_oldest_beyond_cap() {
        let topics: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

        let rolled = AnalyticsService::rolled_topics(topics, "f");

        assert_eq!(rolled, vec!["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn learning_velocity_guards_zero_elapsed_time() {
        let velocity = AnalyticsService::learning_velocity(10, 10, 0);

        assert!(velocity.is_finite());
        // 10 questions in one second, all correct.
        assert!((velocity - 600.0).abs() < 1e-9);
    }

    #[test]
    fn learning_velocity_weights_by_accuracy() {
        let all_correct = AnalyticsService::learning_velocity(10, 10, 300);
        let half_correct = AnalyticsService::learning_velocity(10, 5, 300);

        assert!((all_correct - 2.0).abs() < 1e-9);
        assert!((half_correct - 1.0).abs() < 1e-9);
    }

    #[test]
    fn learning_velocity_is_zero_for_empty_attempt() {
        assert_eq!(AnalyticsService::learning_velocity(0, 0, 120), 0.0);
    }
}
