use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::study_session::{CreateStudySession, StudySession};
use db::models::user::User;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateStudySession>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<StudySession>>), ApiError> {
    let session = StudySession::create(state.conn(), &user.id, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(session))))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<StudySession>>>, ApiError> {
    let sessions = StudySession::find_by_user(state.conn(), &user.id).await?;
    Ok(ResponseJson(ApiResponse::success(sessions)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(session_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<StudySession>>, ApiError> {
    let session = StudySession::find_by_id(state.conn(), session_id, &user.id)
        .await?
        .ok_or(ApiError::NotFound("study session not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(session_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<StudySession>>, ApiError> {
    let session = StudySession::start(state.conn(), session_id, &user.id).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub async fn finish_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(session_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<StudySession>>, ApiError> {
    let session = StudySession::finish(state.conn(), session_id, &user.id).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(session_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = StudySession::delete(state.conn(), session_id, &user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("study session not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Study session deleted",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/study/sessions", get(list_sessions).post(create_session))
        .route(
            "/study/sessions/{session_id}",
            get(get_session).delete(delete_session),
        )
        .route("/study/sessions/{session_id}/start", post(start_session))
        .route("/study/sessions/{session_id}/finish", post(finish_session))
}
