use crate::errors::AppError;
use crate::models::{
    HealthResponse, ListFilters, MessageResponse, ReorderRequest, Todo, TodoPayload, TodoStats,
};
use crate::store::TodoStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub fn router(store: Arc<TodoStore>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/stats", get(get_stats))
        .route("/api/todos/search", get(search_todos))
        .route("/api/todos/backup", post(backup_now))
        .route("/api/todos/restore/:name", post(restore_backup))
        .route("/api/todos/order", put(reorder_todo))
        .route("/api/todos/:id", put(update_todo).delete(delete_todo))
        .with_state(store)
}

/// Serve the store over HTTP at the given address (e.g. `"0.0.0.0:5000"`).
pub async fn serve(store: Arc<TodoStore>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Io(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

async fn list_todos(
    State(store): State<Arc<TodoStore>>,
    Query(filters): Query<ListFilters>,
) -> Json<Vec<Todo>> {
    Json(store.list(&filters))
}

async fn create_todo(
    State(store): State<Arc<TodoStore>>,
    Json(payload): Json<TodoPayload>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = store.create(payload)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
    Json(payload): Json<TodoPayload>,
) -> Result<Json<Todo>, AppError> {
    Ok(Json(store.update(&id, payload)?))
}

async fn delete_todo(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    store.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_stats(State(store): State<Arc<TodoStore>>) -> Json<TodoStats> {
    Json(store.stats())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_todos(
    State(store): State<Arc<TodoStore>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Todo>> {
    Json(store.search(params.q.as_deref().unwrap_or_default()))
}

async fn backup_now(State(store): State<Arc<TodoStore>>) -> Result<Json<MessageResponse>, AppError> {
    store.backup_now()?;
    Ok(Json(MessageResponse {
        message: "Backup created successfully".to_string(),
    }))
}

async fn restore_backup(
    State(store): State<Arc<TodoStore>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    store.restore(&name)?;
    Ok(Json(MessageResponse {
        message: "Restore successful".to_string(),
    }))
}

async fn reorder_todo(
    State(store): State<Arc<TodoStore>>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    store.reorder(&request.todo_id, &request.target_id)?;
    Ok(Json(MessageResponse {
        message: "Order updated successfully".to_string(),
    }))
}
