//! Route handlers.
//!
//! The repository is synchronous, so every call runs on the blocking pool.

use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use todo_core::{Task, search};
use todo_store::pagination::{normalize_page, normalize_per_page};
use todo_store::repository::ALL;
use todo_store::TaskRepository;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::server::AppState;

/// Run `op` against the repository on the blocking pool.
async fn with_repo<F, T>(repo: &TaskRepository, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&TaskRepository) -> todo_store::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let repo = repo.clone();
    tokio::task::spawn_blocking(move || op(&repo))
        .await
        .map_err(|e| ApiError::Internal(format!("repository task failed: {e}")))?
        .map_err(ApiError::from)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidRequest(format!("invalid task id: {raw:?}")))
}

fn json_body(body: Result<Json<Task>, JsonRejection>) -> Result<Task, ApiError> {
    body.map(|Json(task)| task)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

/// `GET /task/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let tasks = with_repo(&state.repo, move |repo| repo.get_by_id(id)).await?;
    match tasks.into_iter().next() {
        Some(task) => Ok(Json(task)),
        None => {
            info!(id, "no task found");
            Err(ApiError::TaskNotFound(format!("task {id} not found")))
        }
    }
}

/// Page arguments for `get_all`.
///
/// With neither parameter present the whole table is returned. A literal
/// `-1` is passed through as the "everything" sentinel; any other value is
/// normalized.
fn list_pagination(params: &HashMap<String, String>) -> (i64, i64) {
    let page = params.get(search::PAGE);
    let per_page = params.get(search::PER_PAGE);
    if page.is_none() && per_page.is_none() {
        return (ALL, ALL);
    }

    let pick = |raw: Option<&String>, normalize: fn(&str) -> i64| match raw.map(String::as_str) {
        Some("-1") => ALL,
        other => normalize(other.unwrap_or_default()),
    };
    (pick(page, normalize_page), pick(per_page, normalize_per_page))
}

/// `GET /tasks?page=&perPage=`
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let (page, per_page) = list_pagination(&params);
    let tasks = with_repo(&state.repo, move |repo| repo.get_all(page, per_page)).await?;
    info!(count = tasks.len(), page, per_page, "fetched tasks");
    Ok(Json(tasks))
}

/// `GET /tasks/search?...`
pub async fn search_tasks(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    for key in params.keys().filter(|key| !search::is_supported(key)) {
        debug!(key = %key, "ignoring unknown search parameter");
    }
    let params = search::with_defaults(params);
    let tasks = with_repo(&state.repo, move |repo| repo.search_map(&params)).await?;
    Ok(Json(tasks))
}

/// `POST /task`
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let task = json_body(body)?;
    let (id, task) = with_repo(&state.repo, move |repo| {
        let id = repo.create(&task)?;
        Ok((id, task))
    })
    .await?;
    info!(id, "created task");
    Ok(Json(task.with_id(id)))
}

/// `PUT /task/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let task = json_body(body)?;
    if task.id != id {
        return Err(ApiError::InvalidRequest(format!(
            "task id {} in body does not match id {id} in path",
            task.id
        )));
    }

    let task = with_repo(&state.repo, move |repo| {
        repo.update(&task, id)?;
        Ok(task)
    })
    .await?;
    Ok(Json(task))
}

/// `DELETE /task/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = with_repo(&state.repo, move |repo| repo.delete(id)).await?;
    if deleted == 0 {
        info!(id, "no task found for deletion");
        return Err(ApiError::TaskNotFound(format!("task {id} not found")));
    }
    info!(id, "deleted task");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}
