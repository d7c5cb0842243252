//! HTTP surface.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET | /api/tasks | 200 `[Task]` |
//! | POST | /api/tasks | 201 `Task` |
//! | PUT | /api/tasks/{id} | 200 `Task` |
//! | DELETE | /api/tasks/{id} | 200 `{"success": true}` |
//! | PATCH | /api/tasks/{id}/complete | 200 `Task` |
//! | PATCH | /api/tasks/{id}/status | 200 `Task` |
//! | GET | /health | 200 |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use taskdeck_core::error::Result as TaskResult;
use taskdeck_core::validation::{decode_create, decode_status, decode_update};
use taskdeck_core::{DeleteResponse, Task, TaskId, TaskService};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::{AppState, DynRepository};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/complete", patch(complete_task))
        .route("/api/tasks/{id}/status", patch(set_task_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_tasks(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Vec<Task>>> {
    let scope = caller.scope();
    run_service(&state, "Failed to fetch tasks", move |service| {
        service.list_tasks(&scope)
    })
    .await
    .map(Json)
}

async fn create_task(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(payload) = payload?;
    let request = decode_create(&payload).map_err(ApiError::validation)?;
    let scope = caller.scope();
    let task = run_service(&state, "Failed to create task", move |service| {
        service.create_task(&scope, request)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(payload) = payload?;
    let request = decode_update(&payload).map_err(ApiError::validation)?;
    let scope = caller.scope();
    run_service(&state, "Failed to update task", move |service| {
        service.update_task(&scope, &TaskId::new(id), request)
    })
    .await
    .map(Json)
}

async fn delete_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let scope = caller.scope();
    run_service(&state, "Failed to delete task", move |service| {
        service.delete_task(&scope, &TaskId::new(id))
    })
    .await?;
    Ok(Json(DeleteResponse { success: true }))
}

async fn complete_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let scope = caller.scope();
    run_service(&state, "Failed to complete task", move |service| {
        service.complete_task(&scope, &TaskId::new(id))
    })
    .await
    .map(Json)
}

async fn set_task_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(payload) = payload?;
    let request = decode_status(&payload).map_err(ApiError::validation)?;
    let scope = caller.scope();
    run_service(&state, "Failed to set task status", move |service| {
        service.set_status(&scope, &TaskId::new(id), request)
    })
    .await
    .map(Json)
}

/// Runs a service call on the blocking pool. The file store reads and
/// rewrites its document with `std::fs`.
async fn run_service<T, F>(state: &AppState, fallback: &'static str, call: F) -> ApiResult<T>
where
    F: FnOnce(&TaskService<DynRepository>) -> TaskResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|join| {
            tracing::error!(error = %join, "{fallback}");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        })?
        .map_err(|e| ApiError::from_task(e, fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::json;
    use taskdeck_core::{
        InMemoryTaskRepository, Scope, TaskError, TaskPatch, TaskRepository, TaskStatus, UserId,
    };
    use tower::ServiceExt;

    use crate::identity::USER_ID_HEADER;

    fn app_with(repo: impl TaskRepository + Send + Sync + 'static) -> Router {
        create_router(AppState::new(Box::new(repo)))
    }

    fn app() -> Router {
        app_with(InMemoryTaskRepository::new())
    }

    fn seeded(id: &str, user: &str) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::from(id),
            title: "Buy milk".to_string(),
            description: Some("semi-skimmed".to_string()),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            user_id: UserId::new(user),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Fails every call as the hosted backend would on an outage, except
    /// `insert`, which reports a uniqueness violation.
    struct BrokenRepository;

    impl TaskRepository for BrokenRepository {
        fn list(&self, _scope: &Scope) -> TaskResult<Vec<Task>> {
            Err(TaskError::Backend(anyhow!("connection reset")))
        }
        fn get(&self, _scope: &Scope, _id: &TaskId) -> TaskResult<Option<Task>> {
            Err(TaskError::Backend(anyhow!("connection reset")))
        }
        fn insert(&self, task: Task) -> TaskResult<Task> {
            Err(TaskError::Conflict(task.id))
        }
        fn update(&self, _scope: &Scope, _id: &TaskId, _patch: &TaskPatch) -> TaskResult<Task> {
            Err(TaskError::Backend(anyhow!("connection reset")))
        }
        fn delete(&self, _scope: &Scope, _id: &TaskId) -> TaskResult<()> {
            Err(TaskError::Backend(anyhow!("connection reset")))
        }
        fn set_status(
            &self,
            _scope: &Scope,
            _id: &TaskId,
            _status: TaskStatus,
        ) -> TaskResult<Task> {
            Err(TaskError::Backend(anyhow!("connection reset")))
        }
    }

    mod health_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn health_check_returns_200() {
            let (status, body) = send(app(), empty_request("GET", "/health")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "healthy");
        }
    }

    mod create_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn creates_pending_task() {
            let (status, body) = send(
                app(),
                json_request("POST", "/api/tasks", json!({"title": "Buy milk", "user_id": "u1"})),
            )
            .await;

            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["title"], "Buy milk");
            assert_eq!(body["user_id"], "u1");
            assert_eq!(body["status"], "pending");
            assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
            assert!(body["created_at"].is_string());
            assert!(body["updated_at"].is_string());
        }

        #[rstest]
        #[case("completed")]
        #[case("pending")]
        #[case("archived")]
        #[tokio::test]
        async fn ignores_supplied_status(#[case] supplied: &str) {
            let (status, body) = send(
                app(),
                json_request(
                    "POST",
                    "/api/tasks",
                    json!({"title": "Buy milk", "user_id": "u1", "status": supplied}),
                ),
            )
            .await;

            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["status"], "pending");
        }

        #[rstest]
        #[tokio::test]
        async fn empty_title_is_400_naming_title() {
            let (status, body) = send(
                app(),
                json_request("POST", "/api/tasks", json!({"title": "", "user_id": "u1"})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Validation error");
            assert!(body["details"]["title"].is_array());
            assert!(body["details"].get("user_id").is_none());
        }

        #[rstest]
        #[tokio::test]
        async fn malformed_body_is_400() {
            let request = Request::builder()
                .method("POST")
                .uri("/api/tasks")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap();
            let (status, body) = send(app(), request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["details"], json!({"body": ["Malformed JSON"]}));
        }

        #[rstest]
        #[tokio::test]
        async fn wrong_type_is_400_naming_the_field() {
            let (status, body) = send(
                app(),
                json_request("POST", "/api/tasks", json!({"title": 5, "user_id": "u1"})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Validation error");
            assert_eq!(body["details"], json!({"title": ["Expected a string"]}));
        }

        #[rstest]
        #[tokio::test]
        async fn non_object_body_is_400() {
            let (status, body) =
                send(app(), json_request("POST", "/api/tasks", json!("Buy milk"))).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["details"]["body"].is_array());
        }

        #[rstest]
        #[tokio::test]
        async fn caller_must_own_new_task() {
            let mut request = json_request(
                "POST",
                "/api/tasks",
                json!({"title": "Buy milk", "user_id": "bob"}),
            );
            request
                .headers_mut()
                .insert(USER_ID_HEADER, "alice".parse().unwrap());
            let (status, body) = send(app(), request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["details"]["user_id"].is_array());
        }

        #[rstest]
        #[tokio::test]
        async fn duplicate_is_409() {
            let (status, body) = send(
                app_with(BrokenRepository),
                json_request("POST", "/api/tasks", json!({"title": "Buy milk", "user_id": "u1"})),
            )
            .await;

            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body["error"], "Task already exists");
        }
    }

    mod list_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn returns_tasks_newest_first() {
            let mut older = seeded("old", "u1");
            older.created_at = older.created_at - chrono::Duration::hours(1);
            let newer = seeded("new", "u1");
            let repo = InMemoryTaskRepository::with_tasks(vec![older, newer]);

            let (status, body) = send(app_with(repo), empty_request("GET", "/api/tasks")).await;

            assert_eq!(status, StatusCode::OK);
            let ids: Vec<&str> = body
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|t| t["id"].as_str())
                .collect();
            assert_eq!(ids, vec!["new", "old"]);
        }

        #[rstest]
        #[tokio::test]
        async fn scoped_to_caller() {
            let repo = InMemoryTaskRepository::with_tasks(vec![
                seeded("mine", "alice"),
                seeded("theirs", "bob"),
            ]);
            let mut request = empty_request("GET", "/api/tasks");
            request
                .headers_mut()
                .insert(USER_ID_HEADER, "alice".parse().unwrap());

            let (_, body) = send(app_with(repo), request).await;
            let tasks = body.as_array().unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0]["id"], "mine");
        }

        #[rstest]
        #[tokio::test]
        async fn backend_failure_is_generic_500() {
            let (status, body) =
                send(app_with(BrokenRepository), empty_request("GET", "/api/tasks")).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"error": "Failed to fetch tasks"}));
        }
    }

    mod update_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn partial_update() {
            let repo = InMemoryTaskRepository::with_tasks(vec![seeded("t1", "u1")]);
            let (status, body) = send(
                app_with(repo),
                json_request("PUT", "/api/tasks/t1", json!({"title": "Buy oat milk"})),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["title"], "Buy oat milk");
            assert_eq!(body["description"], "semi-skimmed");
            assert_eq!(body["status"], "pending");
        }

        #[rstest]
        #[tokio::test]
        async fn accepts_whole_task_echoed_back() {
            let task = seeded("t1", "u1");
            let mut echoed = serde_json::to_value(&task).unwrap();
            echoed["status"] = json!("completed");
            let repo = InMemoryTaskRepository::with_tasks(vec![task]);

            let (status, body) =
                send(app_with(repo), json_request("PUT", "/api/tasks/t1", echoed)).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "completed");
        }

        #[rstest]
        #[tokio::test]
        async fn missing_row_is_404() {
            let app = app();
            let (status, body) = send(
                app.clone(),
                json_request("PUT", "/api/tasks/nope", json!({"title": "x"})),
            )
            .await;

            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "Task not found");

            let (_, listed) = send(app, empty_request("GET", "/api/tasks")).await;
            assert_eq!(listed, json!([]));
        }

        #[rstest]
        #[tokio::test]
        async fn invalid_status_is_400() {
            let repo = InMemoryTaskRepository::with_tasks(vec![seeded("t1", "u1")]);
            let (status, body) = send(
                app_with(repo),
                json_request("PUT", "/api/tasks/t1", json!({"status": "done"})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["details"]["status"].is_array());
        }

        #[rstest]
        #[tokio::test]
        async fn wrong_type_leaves_row_untouched() {
            let repo = InMemoryTaskRepository::with_tasks(vec![seeded("t1", "u1")]);
            let app = app_with(repo);
            let (status, body) = send(
                app.clone(),
                json_request("PUT", "/api/tasks/t1", json!({"title": "x", "description": 7})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["details"], json!({"description": ["Expected a string"]}));

            let (_, listed) = send(app, empty_request("GET", "/api/tasks")).await;
            assert_eq!(listed[0]["title"], "Buy milk");
        }
    }

    mod delete_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn delete_then_delete_again() {
            let app = app_with(InMemoryTaskRepository::with_tasks(vec![seeded("t1", "u1")]));

            let (status, body) = send(app.clone(), empty_request("DELETE", "/api/tasks/t1")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"success": true}));

            let (status, _) = send(app, empty_request("DELETE", "/api/tasks/t1")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[rstest]
        #[tokio::test]
        async fn backend_failure_is_500() {
            let (status, body) = send(
                app_with(BrokenRepository),
                empty_request("DELETE", "/api/tasks/t1"),
            )
            .await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "Failed to delete task");
        }
    }

    mod complete_endpoint {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn completes_and_keeps_other_fields() {
            let task = seeded("u1", "u1");
            let repo = InMemoryTaskRepository::with_tasks(vec![task.clone()]);

            let (status, body) =
                send(app_with(repo), empty_request("PATCH", "/api/tasks/u1/complete")).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "completed");
            assert_eq!(body["id"], "u1");
            assert_eq!(body["title"], task.title);
            assert_eq!(body["description"], "semi-skimmed");
            assert_eq!(body["user_id"], "u1");
            assert_eq!(
                body["created_at"],
                serde_json::to_value(task.created_at).unwrap()
            );
        }

        #[rstest]
        #[tokio::test]
        async fn missing_row_is_404() {
            let (status, _) = send(app(), empty_request("PATCH", "/api/tasks/x/complete")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[rstest]
        #[tokio::test]
        async fn reopen_via_status() {
            let mut task = seeded("t1", "u1");
            task.status = TaskStatus::Completed;
            let repo = InMemoryTaskRepository::with_tasks(vec![task]);

            let (status, body) = send(
                app_with(repo),
                json_request("PATCH", "/api/tasks/t1/status", json!({"status": "pending"})),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "pending");
        }

        #[rstest]
        #[tokio::test]
        async fn status_requires_known_value() {
            let repo = InMemoryTaskRepository::with_tasks(vec![seeded("t1", "u1")]);
            let (status, _) = send(
                app_with(repo),
                json_request("PATCH", "/api/tasks/t1/status", json!({"status": "later"})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
}
