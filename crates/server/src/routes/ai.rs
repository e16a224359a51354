use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use services::services::ai::{Flashcard, QuizQuestion, StudyPlan, SubtaskSuggestion};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const DEFAULT_SUMMARY_SENTENCES: u8 = 3;
const DEFAULT_ITEM_COUNT: u8 = 5;

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    pub max_sentences: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    pub title: String,
    pub description: Option<String>,
    pub estimated_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub topic: String,
    pub count: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct StudyPlanRequest {
    pub goal: String,
    pub available_hours_per_day: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AiHealth {
    pub configured: bool,
}

pub async fn ai_health(State(state): State<AppState>) -> ResponseJson<ApiResponse<AiHealth>> {
    ResponseJson(ApiResponse::success(AiHealth {
        configured: state.ai().is_configured(),
    }))
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> Result<ResponseJson<ApiResponse<SummarizeResponse>>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    let max_sentences = payload.max_sentences.unwrap_or(DEFAULT_SUMMARY_SENTENCES);
    let summary = state
        .ai()
        .summarize_or_fallback(&payload.text, max_sentences)
        .await;
    Ok(ResponseJson(ApiResponse::success(SummarizeResponse {
        summary,
    })))
}

pub async fn breakdown(
    State(state): State<AppState>,
    Json(payload): Json<BreakdownRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<SubtaskSuggestion>>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    let subtasks = state
        .ai()
        .breakdown_or_fallback(
            &payload.title,
            payload.description.as_deref(),
            payload.estimated_minutes,
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(subtasks)))
}

pub async fn quiz(
    State(state): State<AppState>,
    Json(payload): Json<TopicRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<QuizQuestion>>>, ApiError> {
    if payload.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic must not be empty".to_string()));
    }
    let count = payload.count.unwrap_or(DEFAULT_ITEM_COUNT);
    let questions = state.ai().quiz_or_fallback(&payload.topic, count).await;
    Ok(ResponseJson(ApiResponse::success(questions)))
}

pub async fn flashcards(
    State(state): State<AppState>,
    Json(payload): Json<TopicRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<Flashcard>>>, ApiError> {
    if payload.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic must not be empty".to_string()));
    }
    let count = payload.count.unwrap_or(DEFAULT_ITEM_COUNT);
    let cards = state.ai().flashcards_or_fallback(&payload.topic, count).await;
    Ok(ResponseJson(ApiResponse::success(cards)))
}

pub async fn study_plan(
    State(state): State<AppState>,
    Json(payload): Json<StudyPlanRequest>,
) -> Result<ResponseJson<ApiResponse<StudyPlan>>, ApiError> {
    if payload.goal.trim().is_empty() {
        return Err(ApiError::BadRequest("goal must not be empty".to_string()));
    }
    let plan = state
        .ai()
        .study_plan_or_fallback(&payload.goal, payload.available_hours_per_day)
        .await;
    Ok(ResponseJson(ApiResponse::success(plan)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai/health", get(ai_health))
        .route("/ai/summarize", post(summarize))
        .route("/ai/breakdown", post(breakdown))
        .route("/ai/quiz", post(quiz))
        .route("/ai/flashcards", post(flashcards))
        .route("/ai/study-plan", post(study_plan))
}
