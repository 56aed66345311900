//! JSON API handlers.
//!
//! Each handler is a thin wrapper over a [`TaskService`](crate::service::TaskService)
//! call; status codes come from [`AppError`].

use super::server::AppState;
use super::session::CurrentSession;
use crate::auth::{bearer_token, require_session};
use crate::db::now_ms;
use crate::error::{AppError, AppResult};
use crate::retention::run_sweep;
use crate::types::{
    CreateLabelInput, CreateTaskInput, Label, LabelWithCount, Priority, Task, TaskFilter,
    UpdateTaskInput, User, parse_status_filter,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn me(session: CurrentSession) -> AppResult<Json<User>> {
    let session = require_session(session.get())?;
    Ok(Json(session.user.clone()))
}

/// Current revalidation revision. Read-only; clients re-fetch when it moves.
pub async fn revision(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "revision": state.service().revalidation().revision() }))
}

/// Query string for task listings. `all` or unknown values mean no filter.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskQuery {
    pub fn to_filter(&self) -> TaskFilter {
        TaskFilter {
            status: parse_status_filter(self.status.as_deref()),
            priority: self
                .priority
                .as_deref()
                .and_then(|p| p.parse::<Priority>().ok()),
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = state
        .service()
        .get_tasks(session.get(), &query.to_filter())?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(input): Json<CreateTaskInput>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = state.service().create_task(session.get(), &input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
) -> AppResult<Json<Task>> {
    Ok(Json(state.service().get_task(session.get(), &task_id)?))
}

pub async fn update_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
    Json(input): Json<UpdateTaskInput>,
) -> AppResult<Json<Task>> {
    let task = state
        .service()
        .update_task(session.get(), &task_id, &input)?;
    Ok(Json(task))
}

pub async fn soft_delete_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .service()
        .soft_delete_task(session.get(), &task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
) -> AppResult<Json<Task>> {
    Ok(Json(
        state.service().restore_task(session.get(), &task_id)?,
    ))
}

pub async fn hard_delete_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .service()
        .hard_delete_task(session.get(), &task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_task(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(task_id): Path<String>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = state.service().clone_task(session.get(), &task_id)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_labels(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AppResult<Json<Vec<LabelWithCount>>> {
    Ok(Json(state.service().get_labels(session.get())?))
}

pub async fn create_label(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(input): Json<CreateLabelInput>,
) -> AppResult<(StatusCode, Json<Label>)> {
    let label = state.service().create_label(session.get(), &input)?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// Scheduled purge of old soft-deleted tasks. Requires the cron secret as a
/// bearer token; refuses everyone when no secret is configured.
pub async fn cron_cleanup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let retention = state.retention();
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    match (retention.cron_secret.as_deref(), presented) {
        (Some(secret), Some(token)) if secret == token => {}
        _ => return Err(AppError::unauthorized()),
    }

    let service = state.service();
    let report = run_sweep(service.db(), service.revalidation(), retention, now_ms())?;
    Ok(Json(json!({
        "success": true,
        "deleted": report.deleted,
        "cutoffDate": report.cutoff_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_task_query_filters() {
        let query = TaskQuery {
            status: Some("DONE".into()),
            priority: Some("high".into()),
        };
        let filter = query.to_filter();
        assert_eq!(filter.status, Some(TaskStatus::Done));
        assert_eq!(filter.priority, Some(Priority::High));

        let query = TaskQuery {
            status: Some("all".into()),
            priority: Some("whatever".into()),
        };
        assert_eq!(query.to_filter(), TaskFilter::default());
    }
}
