use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::task::Task;
use db::models::user::User;
use serde::Serialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const XP_PER_LEVEL: i64 = 100;

#[derive(Debug, Serialize)]
pub struct GamificationStats {
    pub xp_points: i64,
    pub level: i32,
    pub xp_to_next_level: i64,
    pub tasks_completed: u64,
    pub current_streak: i32,
    pub longest_streak: i32,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<GamificationStats>>, ApiError> {
    let tasks_completed = Task::completed_count(state.conn(), &user.id).await?;
    let next_level_at = i64::from(user.level) * XP_PER_LEVEL;
    let stats = GamificationStats {
        xp_points: user.xp_points,
        level: user.level,
        xp_to_next_level: (next_level_at - user.xp_points).max(0),
        tasks_completed,
        current_streak: user.current_streak,
        longest_streak: user.longest_streak,
    };
    Ok(ResponseJson(ApiResponse::success(stats)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/gamification/stats", get(get_stats))
}
