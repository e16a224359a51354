use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::DbErr;
use db::models::study_session::SessionError;
use db::models::task::TaskError;
use services::services::ai::AiError;
use services::services::auth::AuthError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::Task(err) => match err {
                TaskError::NotFound => StatusCode::NOT_FOUND,
                TaskError::Validation(_) => StatusCode::BAD_REQUEST,
                TaskError::Database(db_err) => database_status(db_err),
            },
            ApiError::Session(err) => match err {
                SessionError::NotFound => StatusCode::NOT_FOUND,
                SessionError::Validation(_) => StatusCode::BAD_REQUEST,
                SessionError::Database(db_err) => database_status(db_err),
            },
            ApiError::Auth(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Ai(err) => match err {
                AiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Database(db_err) => database_status(db_err),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Internal failures get logged in full but reported generically.
        let message = if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ApiResponse::<()>::error(&message));
        (status_code, body).into_response()
    }
}

fn database_status(err: &DbErr) -> StatusCode {
    match err {
        DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
