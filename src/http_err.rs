use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

pub enum ApiError {
    BadRequestReason(String),
    NotFound(String),
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequestReason(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorRep { message })).into_response()
            }
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorRep { message })).into_response()
            }
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRep {
                    message: "Internal server error.".to_owned(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(?error, "Received error.");

        Self::InternalServerError
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Serialize)]
pub struct ErrorRep {
    pub message: String,
}
