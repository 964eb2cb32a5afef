pub mod graphql_handler;
pub mod quiz_handler;

pub use graphql_handler::{graphiql_handler, graphql_handler};
pub use quiz_handler::{get_quiz, health_check, list_quizzes};
