use crate::models::domain::Quiz;
use crate::services::answer_evaluator::AnswerEvaluator;
use crate::services::learning_metrics::question_confidence;

/// Evaluation of a single question within an attempt. `time_spent` is the
/// attempt's elapsed time divided evenly across questions; there is no
/// per-question telemetry.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionResult {
    pub question_id: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub time_spent: i64,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredAttempt {
    pub raw_score: f64,
    pub adjusted_score: f64,
    pub correct_count: i16,
    pub time_efficiency: f64,
    pub per_question: Vec<QuestionResult>,
}

/// Scores a full attempt: questions in their fixed order zipped with the
/// submitted answers. A short answers array leaves the tail unattempted;
/// surplus answers are ignored.
pub struct AttemptScorer;

impl AttemptScorer {
    pub fn score(quiz: &Quiz, answers: &[String], time_spent: i64) -> ScoredAttempt {
        let questions = quiz.questions_in_order();
        let total = questions.len();

        if total == 0 {
            return ScoredAttempt {
                raw_score: 0.0,
                adjusted_score: 0.0,
                correct_count: 0,
                time_efficiency: Self::time_efficiency(quiz.estimated_time, time_spent),
                per_question: Vec::new(),
            };
        }

        let per_question_time = time_spent / total as i64;
        let mut correct_count: i16 = 0;
        let mut per_question = Vec::with_capacity(total);

        for (index, question) in questions.iter().enumerate() {
            let answer = answers.get(index).map(|a| a.as_str());
            let is_correct = AnswerEvaluator::evaluate(question, answer);
            if is_correct {
                correct_count += 1;
            }

            per_question.push(QuestionResult {
                question_id: question.id.clone(),
                user_answer: answer.map(|a| a.to_string()),
                is_correct,
                time_spent: per_question_time,
                confidence: question_confidence(per_question_time, question.time_limit, is_correct),
            });
        }

        let raw_score = correct_count as f64 / total as f64 * 100.0;
        let time_efficiency = Self::time_efficiency(quiz.estimated_time, time_spent);
        let adjusted_score = (raw_score * (0.8 + 0.2 * time_efficiency)).clamp(0.0, 100.0);

        ScoredAttempt {
            raw_score,
            adjusted_score,
            correct_count,
            time_efficiency,
            per_question,
        }
    }

    /// 1.0 within the estimated budget, otherwise the fraction of budget
    /// used, floored at 0.3.
    pub fn time_efficiency(estimated_time: i64, actual_time: i64) -> f64 {
        if actual_time <= estimated_time {
            1.0
        } else {
            (estimated_time as f64 / actual_time as f64).max(0.3)
        }
    }
}
