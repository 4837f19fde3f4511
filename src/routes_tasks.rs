// --------------------------------------------------
// Handles API endpoints for task CRUD operations.
//
// Responsibilities:
// - List tasks with search / status filter
// - Create / read / update / delete a single task
// - Wrap every result in the {success, message, data} envelope
// -------------------------------------------------

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::ApiError;
use crate::logic::TaskFilter;
use crate::models::{ApiResponse, Task, TaskInput};
use crate::service::TaskService;

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn router() -> Router<TaskService> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

// -----------------------------
// GET /api/tasks?q=&status=&sort=
// Returns matching tasks, newest first
// -----------------------------
pub async fn list_tasks(
    State(service): State<TaskService>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Vec<Task>> {
    let tasks = service.list(&filter).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Tasks retrieved successfully", tasks)),
    ))
}

// -----------------------------
// GET /api/tasks/:id
// -----------------------------
pub async fn get_task(
    State(service): State<TaskService>,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let task = service.get(&id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Task found", task))))
}

// -----------------------------
// POST /api/tasks
// Creates a new task and saves it to the task file
// -----------------------------
pub async fn create_task(
    State(service): State<TaskService>,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(input) = body?;
    let task = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Task created successfully", task)),
    ))
}

// -----------------------------
// PUT /api/tasks/:id
// Updates an existing task by ID
// ----------------------------
pub async fn update_task(
    State(service): State<TaskService>,
    Path(id): Path<String>,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(input) = body?;
    let task = service.update(&id, input).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Task updated successfully", task)),
    ))
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(
    State(service): State<TaskService>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    service.delete(&id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok_empty("Task deleted successfully")),
    ))
}
