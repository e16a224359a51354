use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use db::models::user::User;
use db::types::{TaskPriority, TaskStatus};
use serde::Deserialize;
use services::services::task::CompletionOutcome;
use utils::response::{ApiResponse, Paginated};

use crate::{AppState, error::ApiError};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<u64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteQuery {
    pub actual_minutes: Option<i32>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TaskListQuery>,
) -> Result<ResponseJson<ApiResponse<Paginated<Task>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        search: query.search,
    };
    let (tasks, total) = Task::search(state.conn(), &user.id, &filter, query.skip, limit).await?;
    Ok(ResponseJson(ApiResponse::success(Paginated::new(
        tasks, total, query.skip, limit,
    ))))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    let task = state.tasks().create(state.conn(), &user.id, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(task))))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::find_by_id(state.conn(), task_id, &user.id)
        .await?
        .ok_or(ApiError::NotFound("task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<i64>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let (task, reward) = state
        .tasks()
        .update(state.conn(), task_id, &user.id, &payload)
        .await?;
    if let Some(reward) = reward {
        if reward.xp > 0 {
            User::add_xp(state.conn(), &user.id, reward.xp).await?;
        }
        return Ok(ResponseJson(ApiResponse::success_with_message(
            task,
            &format!("Task completed! +{} XP", reward.xp),
        )));
    }
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Task::delete(state.conn(), task_id, &user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("task not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Task deleted",
    )))
}

pub async fn complete_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<i64>,
    Query(query): Query<CompleteQuery>,
) -> Result<ResponseJson<ApiResponse<CompletionOutcome>>, ApiError> {
    let outcome = state
        .tasks()
        .complete(state.conn(), task_id, &user.id, query.actual_minutes)
        .await?;
    if outcome.xp_awarded > 0 {
        User::add_xp(state.conn(), &user.id, outcome.xp_awarded).await?;
    }
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub async fn overdue_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = Task::find_overdue(state.conn(), &user.id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn tasks_by_priority(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(priority): Path<TaskPriority>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = Task::find_by_priority(state.conn(), &user.id, priority).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{task_id}/complete", post(complete_task))
        .route("/tasks/stats/overdue", get(overdue_tasks))
        .route("/tasks/stats/priority/{priority}", get(tasks_by_priority))
}
