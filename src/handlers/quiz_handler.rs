use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::QuizFilterInput,
        response::{QuizForTaking, QuizSummary},
    },
};

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz_for_taking(&id).await?;
    Ok(HttpResponse::Ok().json(QuizForTaking::from_quiz(&quiz)))
}

#[get("/api/quizzes")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    filter: web::Query<QuizFilterInput>,
) -> Result<HttpResponse, AppError> {
    let quizzes = state
        .quiz_service
        .list_quizzes(&filter.into_inner(), 0, 50)
        .await?;

    let summaries: Vec<QuizSummary> = quizzes.iter().map(QuizSummary::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    match state.db.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "database": "up",
        })),
        Err(err) => {
            log::error!("Health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "degraded",
                "database": "down",
            }))
        }
    }
}
