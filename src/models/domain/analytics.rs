use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Daily learning rollup for one user. At most one row exists per
/// (user, UTC calendar day).
///
/// Counters accumulate across the day's attempts; the derived scores are
/// replaced by each newly completed attempt rather than averaged in place.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct UserAnalytics {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>, // UTC midnight bucket
    pub questions_answered: i64,
    pub correct_answers: i64,
    pub time_spent: i64, // seconds
    pub quizzes_completed: i64,
    pub knowledge_gain: f64,
    pub retention_rate: f64,
    pub learning_velocity: f64,
    pub engagement_score: f64,
    pub optimal_difficulty: i16,
    pub preferred_topics: Vec<String>,
}

/// Daily rollup for one quiz, mirroring the user-side policy: counters
/// accumulate, derived averages track the latest completion.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct QuizAnalytics {
    pub id: String,
    pub quiz_id: String,
    pub date: DateTime<Utc>, // UTC midnight bucket
    pub attempts: i64,
    pub completions: i64,
    pub average_score: f64,
    pub average_engagement: f64,
}

/// Truncates a timestamp to its UTC day bucket.
pub fn day_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bucket_truncates_to_utc_midnight() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let bucket = day_bucket(ts);

        assert_eq!(bucket, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_bucket_is_idempotent() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        assert_eq!(day_bucket(day_bucket(ts)), day_bucket(ts));
    }

    #[test]
    fn same_day_timestamps_share_a_bucket() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 15, 22, 30, 0).unwrap();

        assert_eq!(day_bucket(morning), day_bucket(evening));
    }
}
