use crate::helpers::ErrorResponse;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// Failures raised by services and middleware. The error middleware turns
/// every one of them into an [`ErrorResponse`] body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Database(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Category reported in the `error` field of the body.
    pub fn category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BadRequest",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "NotFound",
            Self::Database(_) => "DatabaseFailure",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // The error middleware rebuilds this body with the request path.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(
            self.status_code(),
            self.category(),
            self.to_string(),
            String::new(),
        ))
    }
}
