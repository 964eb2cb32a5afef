use async_graphql::InputObject;
use serde::Deserialize;
use validator::Validate;

/// Filter for quiz listings. All fields are optional; absent fields do not
/// constrain the result set.
#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct QuizFilterInput {
    pub category: Option<String>,

    #[validate(range(min = 1, max = 10))]
    pub difficulty_min: Option<i16>,

    #[validate(range(min = 1, max = 10))]
    pub difficulty_max: Option<i16>,

    pub language: Option<String>,

    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct StartQuizAttemptInput {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,

    #[validate(length(min = 1, max = 100))]
    pub quiz_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SubmitQuizAttemptInput {
    #[validate(length(min = 1, max = 100))]
    pub attempt_id: String,

    /// Answers in question order. May be shorter than the question list;
    /// unanswered tail questions count as unattempted.
    #[validate(length(max = 500))]
    pub answers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_filter_validates_difficulty_bounds() {
        let filter = QuizFilterInput {
            difficulty_min: Some(0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let filter = QuizFilterInput {
            difficulty_min: Some(2),
            difficulty_max: Some(8),
            ..Default::default()
        };
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn submit_input_rejects_blank_attempt_id() {
        let input = SubmitQuizAttemptInput {
            attempt_id: String::new(),
            answers: vec!["42".to_string()],
        };
        assert!(input.validate().is_err());
    }
}
