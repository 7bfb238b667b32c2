use std::any::Any;

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{debug, error};
use trading::TradingError;

use crate::schemas::ErrorResponse;

/// Every failure a handler can report.
///
/// The user-facing kinds become an apology with status 403. `Internal` is
/// logged in full and answered with a generic 500 apology.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::BusinessRule(_) => "BUSINESS_RULE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<TradingError> for AppError {
    fn from(err: TradingError) -> Self {
        match err {
            TradingError::Validation(message) => AppError::Validation(message),
            TradingError::Auth(message) => AppError::Auth(message),
            TradingError::BusinessRule(message) => AppError::BusinessRule(message),
            TradingError::NotFound(message) => AppError::NotFound(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        debug!("Rejected form submission: {}", rejection.body_text());
        AppError::Validation("invalid form submission".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "internal server error".to_string()
            }
            other => {
                debug!("Apology ({}): {}", other.code(), other);
                other.to_string()
            }
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into the generic 500 apology.
pub fn panic_apology(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// Apology for routes that do not exist.
pub async fn route_not_found() -> Response {
    let body = ErrorResponse {
        error: "not found".to_string(),
        code: "ROUTE_NOT_FOUND".to_string(),
        success: false,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
