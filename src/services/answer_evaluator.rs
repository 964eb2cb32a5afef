use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::{question::QuestionType, Question};

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

/// Judges a single submitted answer against a question's answer key.
///
/// Stateless; `None` signals a timed-out or unanswered question and is
/// always incorrect regardless of any buffered answer text.
pub struct AnswerEvaluator;

impl AnswerEvaluator {
    pub fn evaluate(question: &Question, answer: Option<&str>) -> bool {
        let Some(answer) = answer else {
            return false;
        };

        let expected = question.correct_answer.trim().to_lowercase();
        let submitted = answer.trim().to_lowercase();

        match question.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueFalse => submitted == expected,
            QuestionType::FillInBlank => {
                // Exact match first, then tolerate spacing variance by
                // collapsing whitespace runs on both sides.
                submitted == expected
                    || WHITESPACE.replace_all(&submitted, "")
                        == WHITESPACE.replace_all(&expected, "")
            }
        }
    }
}
