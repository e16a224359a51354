use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::{AppState, routes};

mod auth;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::tasks::router())
        .merge(routes::users::router())
        .merge(routes::gamification::router())
        .merge(routes::study::router())
        .merge(routes::ai::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use db::DbService;
    use serde_json::{Value, json};
    use services::services::ai::AiService;
    use services::services::auth::{AuthMode, AuthService};
    use tower::ServiceExt;

    use crate::AppState;

    async fn test_app() -> Router {
        let db = DbService::new_in_memory().await.unwrap();
        let auth = AuthService::new(AuthMode::Development);
        let ai = AiService::new(None, "gpt-4o-mini".to_string(), Duration::from_secs(1));
        super::router(AppState::new(db, auth, ai))
    }

    async fn send(
        app: &Router,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn api_requires_bearer_token() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn task_crud_round_trip() {
        let app = test_app().await;
        let token = Some("alice-token");

        let (status, created) = send(
            &app,
            "POST",
            "/api/tasks",
            token,
            Some(json!({"title": "Read chapter 4", "tags": ["reading", "Reading"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let task_id = created["data"]["id"].as_i64().unwrap();
        assert_eq!(created["data"]["status"], json!("todo"));
        assert_eq!(created["data"]["tags"].as_array().unwrap().len(), 1);

        let (status, fetched) =
            send(&app, "GET", &format!("/api/tasks/{task_id}"), token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["title"], json!("Read chapter 4"));

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/tasks/{task_id}"),
            token,
            Some(json!({"priority": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["priority"], json!("high"));

        let (status, _) =
            send(&app, "DELETE", &format!("/api/tasks/{task_id}"), token, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) =
            send(&app, "GET", &format!("/api/tasks/{task_id}"), token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_pages_are_disjoint_with_stable_total() {
        let app = test_app().await;
        let token = Some("alice-token");
        for i in 0..5 {
            let (status, _) = send(
                &app,
                "POST",
                "/api/tasks",
                token,
                Some(json!({"title": format!("task {i}")})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, page1) = send(&app, "GET", "/api/tasks?skip=0&limit=2", token, None).await;
        let (_, page2) = send(&app, "GET", "/api/tasks?skip=2&limit=2", token, None).await;
        assert_eq!(page1["data"]["total"], json!(5));
        assert_eq!(page2["data"]["total"], json!(5));
        assert_eq!(page1["data"]["has_more"], json!(true));
        let ids1: Vec<i64> = page1["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect();
        for task in page2["data"]["items"].as_array().unwrap() {
            assert!(!ids1.contains(&task["id"].as_i64().unwrap()));
        }
    }

    #[tokio::test]
    async fn tasks_are_isolated_between_users() {
        let app = test_app().await;
        let (_, created) = send(
            &app,
            "POST",
            "/api/tasks",
            Some("alice-token"),
            Some(json!({"title": "private"})),
        )
        .await;
        let task_id = created["data"]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/tasks/{task_id}"),
            Some("bob-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listing) = send(&app, "GET", "/api/tasks", Some("bob-token"), None).await;
        assert_eq!(listing["data"]["total"], json!(0));
    }

    #[tokio::test]
    async fn completion_awards_xp_exactly_once() {
        let app = test_app().await;
        let token = Some("alice-token");
        let (_, created) = send(
            &app,
            "POST",
            "/api/tasks",
            token,
            Some(json!({
                "title": "problem set",
                "difficulty": "hard",
                "estimated_minutes": 100
            })),
        )
        .await;
        let task_id = created["data"]["id"].as_i64().unwrap();

        let (status, first) = send(
            &app,
            "POST",
            &format!("/api/tasks/{task_id}/complete?actual_minutes=70"),
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["xp_awarded"], json!(30));
        let unlocked = first["data"]["achievements_unlocked"].as_array().unwrap();
        assert!(unlocked.contains(&json!("First Task Completed")));
        assert!(unlocked.contains(&json!("Challenge Accepted")));

        let (_, second) = send(
            &app,
            "POST",
            &format!("/api/tasks/{task_id}/complete?actual_minutes=70"),
            token,
            None,
        )
        .await;
        assert_eq!(second["data"]["xp_awarded"], json!(0));

        let (_, stats) = send(&app, "GET", "/api/gamification/stats", token, None).await;
        assert_eq!(stats["data"]["xp_points"], json!(30));
        assert_eq!(stats["data"]["tasks_completed"], json!(1));
    }

    #[tokio::test]
    async fn status_update_to_done_also_awards() {
        let app = test_app().await;
        let token = Some("alice-token");
        let (_, created) = send(
            &app,
            "POST",
            "/api/tasks",
            token,
            Some(json!({"title": "reading"})),
        )
        .await;
        let task_id = created["data"]["id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/tasks/{task_id}"),
            token,
            Some(json!({"status": "done"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["is_completed"], json!(true));
        assert!(updated["message"].as_str().unwrap().contains("+15 XP"));

        let (_, stats) = send(&app, "GET", "/api/gamification/stats", token, None).await;
        assert_eq!(stats["data"]["xp_points"], json!(15));
    }

    #[tokio::test]
    async fn create_without_ai_provider_skips_enrichment() {
        let app = test_app().await;
        let (status, created) = send(
            &app,
            "POST",
            "/api/tasks",
            Some("alice-token"),
            Some(json!({
                "title": "thesis chapter",
                "description": "Draft the methods section, add figures, and incorporate all supervisor feedback."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["ai_generated"], json!(false));
        assert_eq!(created["data"]["detailed_instructions"], Value::Null);
    }

    #[tokio::test]
    async fn ai_routes_fall_back_without_provider() {
        let app = test_app().await;
        let token = Some("alice-token");
        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/summarize",
            token,
            Some(json!({"text": "A long text about the French revolution and its causes."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["summary"].as_str().unwrap().contains("French"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/breakdown",
            token,
            Some(json!({"title": "essay", "estimated_minutes": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/summarize",
            token,
            Some(json!({"text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn study_session_lifecycle() {
        let app = test_app().await;
        let token = Some("alice-token");
        let start = chrono::Utc::now() - chrono::Duration::minutes(30);
        let end = start + chrono::Duration::minutes(60);

        let (status, created) = send(
            &app,
            "POST",
            "/api/study/sessions",
            token,
            Some(json!({
                "title": "calculus review",
                "scheduled_start": start.to_rfc3339(),
                "scheduled_end": end.to_rfc3339(),
                "focus_mode": "deep_work"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let session_id = created["data"]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/study/sessions/{session_id}/start"),
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, finished) = send(
            &app,
            "POST",
            &format!("/api/study/sessions/{session_id}/finish"),
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let score = finished["data"]["focus_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/study/sessions/{session_id}"),
            Some("bob-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
