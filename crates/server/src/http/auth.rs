use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use utils::response::ApiResponse;

use crate::AppState;

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

/// Resolves the bearer token to a user row and stashes it in request
/// extensions for the handlers downstream.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
        .map(str::to_string)
    else {
        return unauthorized("Missing bearer token");
    };

    let identity = match state.auth().authenticate(&token).await {
        Ok(identity) => identity,
        Err(error) => {
            tracing::debug!(%error, "token rejected");
            return unauthorized("Invalid or expired token");
        }
    };

    let user = match User::find_or_create(
        state.conn(),
        &identity.user_id,
        identity.email.as_deref(),
        identity.name.as_deref(),
    )
    .await
    {
        Ok(user) => user,
        Err(error) => {
            tracing::error!(%error, "failed to load user for authenticated request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Internal server error")),
            )
                .into_response();
        }
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}
