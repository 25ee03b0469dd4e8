use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// CatalogError
///
/// Failures talking to the upstream catalog REST API (or its in-memory stand-in).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog API answered with unexpected status {0}")]
    Status(u16),
    #[error("catalog API returned an unreadable body: {0}")]
    Decode(String),
    #[error("`{0}` is not a usable catalog API base URL")]
    InvalidUrl(String),
    #[error("`{0}` is not a valid record id")]
    InvalidId(String),
}

/// AppError
///
/// The HTTP-facing error type. Every variant maps to one status code and renders as
/// `{ "error": "<message>" }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,
    #[error("role `{0}` may not access this resource")]
    Forbidden(crate::models::Role),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("record not found")]
    NotFound,
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("session token could not be issued: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("session lifetime of {0} minutes is out of range")]
    SessionTtl(i64),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Token(_) | AppError::SessionTtl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Catalog(CatalogError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            AppError::Catalog(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
