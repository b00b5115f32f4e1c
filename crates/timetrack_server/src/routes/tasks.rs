use super::with_conn;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use timetrack_core::{
    format_duration, parse_calendar_date, PersonId, SqlitePersonRepository,
    SqliteTaskRepository, SystemClock, Task, TaskId, TaskService, TaskSummary,
};

type SqliteTaskService<'conn> =
    TaskService<SqliteTaskRepository<'conn>, SqlitePersonRepository<'conn>, SystemClock>;

fn task_service(conn: &Connection) -> Result<SqliteTaskService<'_>, ApiError> {
    Ok(TaskService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqlitePersonRepository::try_new(conn)?,
        SystemClock,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateTaskRequest {
    task_name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TaskCreated {
    task_id: TaskId,
}

#[derive(Debug, Serialize)]
pub(super) struct TaskStarted {
    started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct TaskStopped {
    duration_secs: i64,
    all_time: String,
}

/// Calendar dates in `DD.MM.YYYY`; either bound may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ReportRequest {
    start: Option<String>,
    end: Option<String>,
}

/// POST /persons/{id}/tasks
pub(super) async fn create_task(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Json<TaskCreated>, ApiError> {
    let task_id = with_conn(&state, move |conn| {
        Ok(task_service(conn)?.create_task(person_id, &request.task_name)?)
    })
    .await?;
    Ok(Json(TaskCreated { task_id }))
}

/// GET /tasks/{id}
pub(super) async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let task = with_conn(&state, move |conn| Ok(task_service(conn)?.get_task(task_id)?)).await?;
    Ok(Json(task))
}

/// PUT /tasks/{id}/start
pub(super) async fn start_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<TaskStarted>, ApiError> {
    let started_at =
        with_conn(&state, move |conn| Ok(task_service(conn)?.start_task(task_id)?)).await?;
    Ok(Json(TaskStarted { started_at }))
}

/// PUT /tasks/{id}/stop
pub(super) async fn stop_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<TaskStopped>, ApiError> {
    let stopped =
        with_conn(&state, move |conn| Ok(task_service(conn)?.stop_task(task_id)?)).await?;
    let duration_secs = stopped.duration_secs;
    Ok(Json(TaskStopped {
        duration_secs,
        all_time: format_duration(duration_secs.max(0).unsigned_abs()),
    }))
}

/// POST /persons/{id}/tasks/report
pub(super) async fn report(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<Vec<TaskSummary>>, ApiError> {
    let start = request.start.as_deref().map(parse_calendar_date).transpose()?;
    let end = request.end.as_deref().map(parse_calendar_date).transpose()?;
    let summaries = with_conn(&state, move |conn| {
        Ok(task_service(conn)?.tasks_for_dates(person_id, start, end)?)
    })
    .await?;
    Ok(Json(summaries))
}
