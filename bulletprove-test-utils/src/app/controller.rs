use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use tracing::{instrument::WithSubscriber, Instrument};

use crate::{
    app::{
        dto::{CreateTodoDto, TodoDto},
        error::AppError,
        AppState,
    },
    constant::TEST_API_TOKEN,
};

pub async fn health() -> impl IntoResponse {
    tracing::info!("Health check");

    "ok"
}

pub async fn list_todos(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let todos = entity::prelude::Todo::find()
        .order_by_asc(entity::todo::Column::Id)
        .all(&state.db)
        .await?;

    tracing::debug!(count = todos.len(), "Listed todos");

    let dtos: Vec<TodoDto> = todos.into_iter().map(TodoDto::from).collect();

    Ok(Json(dtos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<CreateTodoDto>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }

    let model = entity::todo::ActiveModel {
        title: Set(payload.title),
        done: Set(false),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(todo_id = model.id, "Created todo");

    Ok((StatusCode::CREATED, Json(TodoDto::from(model))))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let todo = entity::prelude::Todo::find_by_id(todo_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TodoNotFound(todo_id))?;

    Ok(Json(TodoDto::from(todo)))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = entity::prelude::Todo::delete_by_id(todo_id)
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::TodoNotFound(todo_id));
    }

    tracing::info!(todo_id = todo_id, "Deleted todo");

    Ok(StatusCode::NO_CONTENT)
}

/// Mark a todo as done and notify in the background.
pub async fn complete_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let todo = entity::prelude::Todo::find_by_id(todo_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TodoNotFound(todo_id))?;

    let mut active: entity::todo::ActiveModel = todo.into();
    active.done = Set(true);
    let todo = active.update(&state.db).await?;

    tokio::spawn(
        async move {
            tokio::task::yield_now().await;
            tracing::info!(todo_id = todo_id, "Sent completion notification");
        }
        .in_current_span()
        .with_current_subscriber(),
    );

    Ok(Json(TodoDto::from(todo)))
}

/// Proxy a quote from the upstream quote service.
pub async fn get_quote(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let response = state
        .http
        .get(format!("{}/quote", state.upstream_url))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamStatus(response.status().as_u16()));
    }

    let quote = response.text().await?;

    tracing::debug!(length = quote.len(), "Fetched quote from upstream");

    Ok(quote)
}

/// Echo the caller identity when a valid bearer token is supplied.
pub async fn whoami(headers: HeaderMap) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == TEST_API_TOKEN => Ok("test-user"),
        _ => Err(AppError::Unauthorized),
    }
}
