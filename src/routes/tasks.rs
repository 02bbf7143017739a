use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, Task, TaskUpdate},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, priority, due_date, completed, created_at, owner_id";

/// Creates a new task owned by the caller.
///
/// The title is required; priority defaults to Low and `completed` is
/// normalized from its wire forms before anything is stored.
///
/// ## Responses
/// - `201 Created`: the stored `Task`.
/// - `400 Bad Request`: invalid input.
/// - `401 Unauthorized`: missing or invalid credential.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = Task::new(payload.into_inner(), user.0);

    let stored = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, priority, due_date, completed, created_at, owner_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.priority)
    .bind(task.due_date)
    .bind(task.completed)
    .bind(task.created_at)
    .bind(task.owner_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(stored))
}

/// Lists the caller's tasks, newest-created first.
///
/// Only tasks whose owner matches the authenticated identity are returned;
/// there is no way to widen the query to another owner.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetches one task by id.
///
/// The lookup filters on the caller as owner, so a task belonging to someone
/// else is indistinguishable from a task that does not exist: both are 404.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
    ))
    .bind(task_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Applies a partial update to one of the caller's tasks.
///
/// Only the fields present in the payload change; `completed` goes through
/// the same normalization as on create, and this is the only transition the
/// completed flag has (a past due date never flips it). The ownership rule is
/// the same as for `get_task`.
///
/// ## Responses
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: invalid field value.
/// - `404 Not Found`: no such task for this caller.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let update = payload.into_inner();
    let completed = update.completed.as_ref().map(|c| c.as_bool());

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             priority = COALESCE($3, priority),
             due_date = COALESCE($4, due_date),
             completed = COALESCE($5, completed)
         WHERE id = $6 AND owner_id = $7
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&update.title)
    .bind(&update.description)
    .bind(update.priority)
    .bind(update.due_date)
    .bind(completed)
    .bind(task_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes one of the caller's tasks. Same ownership rule: someone else's
/// task id deletes nothing and reports 404.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
        .bind(task_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted" })))
}
