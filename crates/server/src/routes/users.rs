use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::{UpdateProfile, User};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn get_me(
    Extension(user): Extension<User>,
) -> ResponseJson<ApiResponse<User>> {
    ResponseJson(ApiResponse::success(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfile>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let updated = User::update_profile(state.conn(), &user.id, &payload)
        .await?
        .ok_or(ApiError::NotFound("user not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).put(update_me))
}
