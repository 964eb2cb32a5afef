use crate::models::domain::Quiz;
use crate::services::attempt_scorer::QuestionResult;

/// Applied when a question carries no explicit time limit.
pub const DEFAULT_TIME_LIMIT_SECS: i64 = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LearningMetrics {
    pub learning_gain: f64,
    pub retention_score: f64,
    pub engagement_score: f64,
}

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Confidence estimate for a single answered question: answering quickly
/// relative to the limit raises it, correctness adds a fixed bonus and
/// incorrectness a fixed penalty.
pub fn question_confidence(time_spent: i64, time_limit: Option<i64>, is_correct: bool) -> f64 {
    let limit = time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECS).max(1) as f64;
    let pace = (time_spent as f64 / limit).min(1.0);
    let base = 1.0 - 0.5 * pace;
    let adjustment = if is_correct { 0.3 } else { -0.2 };
    clamp01(base + adjustment)
}

/// Derives the three attempt-level learning metrics from scored question
/// results and quiz metadata. Intermediate arithmetic may leave [0,1]
/// transiently; each output is clamped as a final step.
pub struct LearningMetricsCalculator;

impl LearningMetricsCalculator {
    pub fn compute(
        quiz: &Quiz,
        per_question: &[QuestionResult],
        correct_count: i16,
        time_efficiency: f64,
    ) -> LearningMetrics {
        let total = quiz.questions.len();
        if total == 0 {
            return LearningMetrics::default();
        }
        let total_f = total as f64;

        let avg_difficulty = quiz
            .questions
            .iter()
            .map(|q| q.difficulty as f64)
            .sum::<f64>()
            / total_f;

        let correct_ratio = correct_count as f64 / total_f;
        let learning_gain = correct_ratio * (avg_difficulty / 10.0) * time_efficiency;

        let avg_confidence = if per_question.is_empty() {
            0.0
        } else {
            per_question.iter().map(|r| r.confidence).sum::<f64>() / per_question.len() as f64
        };
        let retention_score = 0.7 * avg_confidence + 0.3 * time_efficiency;

        let answered = per_question
            .iter()
            .filter(|r| r.user_answer.is_some())
            .count();
        let completion_rate = answered as f64 / total_f;

        let avg_time_per_question = if per_question.is_empty() {
            0.0
        } else {
            per_question.iter().map(|r| r.time_spent as f64).sum::<f64>()
                / per_question.len() as f64
        };
        let expected_per_question = quiz.estimated_time as f64 / total_f;
        let engagement_from_time = if expected_per_question <= 0.0 {
            1.0
        } else {
            (avg_time_per_question / (expected_per_question * 0.5)).min(1.0)
        };

        let engagement_score =
            0.5 * completion_rate + 0.3 * engagement_from_time + 0.2 * avg_confidence;

        LearningMetrics {
            learning_gain: clamp01(learning_gain),
            retention_score: clamp01(retention_score),
            engagement_score: clamp01(engagement_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_math_quiz;

    fn result(question_id: &str, answer: Option<&str>, is_correct: bool, time_spent: i64) -> QuestionResult {
        QuestionResult {
            question_id: question_id.to_string(),
            user_answer: answer.map(|a| a.to_string()),
            is_correct,
            time_spent,
            confidence: question_confidence(time_spent, Some(30), is_correct),
        }
    }

    #[test]
    fn confidence_rewards_speed_and_correctness() {
        // Fast and correct beats slow and correct.
        let fast = question_confidence(5, Some(30), true);
        let slow = question_confidence(30, Some(30), true);
        assert!(fast > slow);

        // Correctness beats incorrectness at equal pace.
        let correct = question_confidence(15, Some(30), true);
        let incorrect = question_confidence(15, Some(30), false);
        assert!(correct > incorrect);
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        // Instant correct answer: 1.0 + 0.3 would exceed the bound.
        assert_eq!(question_confidence(0, Some(30), true), 1.0);

        // Overrunning the limit never drives confidence negative.
        let floor = question_confidence(600, Some(30), false);
        assert!((0.0..=1.0).contains(&floor));
    }

    #[test]
    fn confidence_defaults_the_time_limit() {
        // 30s against the 60s default is half the pace of 30s against 30s.
        let with_default = question_confidence(30, None, true);
        let with_explicit = question_confidence(30, Some(30), true);
        assert!(with_default > with_explicit);
    }

    #[test]
    fn metrics_are_clamped_and_bounded() {
        let quiz = sample_math_quiz();
        let per_question = vec![
            result("q1", Some("42"), true, 40),
            result("q2", Some("56"), true, 40),
            result("q3", Some("True"), true, 40),
        ];

        let metrics = LearningMetricsCalculator::compute(&quiz, &per_question, 3, 1.0);

        assert!((0.0..=1.0).contains(&metrics.learning_gain));
        assert!((0.0..=1.0).contains(&metrics.retention_score));
        assert!((0.0..=1.0).contains(&metrics.engagement_score));
    }

    #[test]
    fn all_correct_within_budget_maximizes_learning_gain_for_difficulty() {
        let quiz = sample_math_quiz(); // difficulties 2, 3, 4 => avg 3.0

        let per_question = vec![
            result("q1", Some("42"), true, 40),
            result("q2", Some("56"), true, 40),
            result("q3", Some("True"), true, 40),
        ];
        let metrics = LearningMetricsCalculator::compute(&quiz, &per_question, 3, 1.0);

        // (3/3) * (3.0/10) * 1.0
        assert!((metrics.learning_gain - 0.3).abs() < 1e-9);
    }

    #[test]
    fn unanswered_questions_lower_completion_and_engagement() {
        let quiz = sample_math_quiz();

        let full = vec![
            result("q1", Some("42"), true, 40),
            result("q2", Some("56"), true, 40),
            result("q3", Some("True"), true, 40),
        ];
        let partial = vec![
            result("q1", Some("42"), true, 40),
            result("q2", None, false, 40),
            result("q3", None, false, 40),
        ];

        let full_metrics = LearningMetricsCalculator::compute(&quiz, &full, 3, 1.0);
        let partial_metrics = LearningMetricsCalculator::compute(&quiz, &partial, 1, 1.0);

        assert!(partial_metrics.engagement_score < full_metrics.engagement_score);
    }

    #[test]
    fn zero_question_quiz_produces_zero_metrics() {
        let mut quiz = sample_math_quiz();
        quiz.questions.clear();

        let metrics = LearningMetricsCalculator::compute(&quiz, &[], 0, 1.0);

        assert_eq!(metrics, LearningMetrics::default());
    }
}
