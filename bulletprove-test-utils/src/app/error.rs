use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::app::dto::ErrorDto;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Todo {0} not found")]
    TodoNotFound(i32),
    #[error("Invalid todo: {0}")]
    Validation(String),
    #[error("Missing or invalid API token")]
    Unauthorized,
    #[error("Upstream quote service responded with status {0}")]
    UpstreamStatus(u16),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
}

impl AppError {
    fn respond(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorDto {
                error: message.into(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::TodoNotFound(todo_id) => {
                tracing::warn!(todo_id = todo_id, "{}", self);

                Self::respond(StatusCode::NOT_FOUND, "Todo not found")
            }
            Self::Validation(_) => {
                tracing::warn!("{}", self);

                Self::respond(StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Unauthorized => {
                tracing::warn!("{}", self);

                Self::respond(StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            Self::UpstreamStatus(_) | Self::Upstream(_) => {
                tracing::error!("{}", self);

                Self::respond(StatusCode::BAD_GATEWAY, "Quote service unavailable")
            }
            err => {
                tracing::error!("{}", err);

                Self::respond(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}
