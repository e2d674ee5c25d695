use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Infrastructure failures. User-visible rejections (bad credentials,
/// failed verification, missing fields) are flash messages instead and
/// never pass through here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("malformed upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Upload { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("request failed: {self}");
        (status, self.to_string()).into_response()
    }
}
