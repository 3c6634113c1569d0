//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use courier_types::error::{AccountError, ErrorKind, TemplateError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Template(TemplateError),
    Account(AccountError),
    /// The request body was malformed or incomplete.
    Validation(String),
    /// A downstream call did not finish within the configured timeout.
    Timeout(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Template(e)
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        AppError::Account(e)
    }
}

fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED"),
        ErrorKind::Transport => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
        ErrorKind::Persistence => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
    }
}

impl AppError {
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Account(AccountError::AlreadyConnected(_)) => {
                (StatusCode::CONFLICT, "ALREADY_CONNECTED")
            }
            AppError::Account(e) => status_for(e.kind()),
            AppError::Template(e) => status_for(e.kind()),
            AppError::Validation(_) => status_for(ErrorKind::Validation),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Template(e) => e.to_string(),
            AppError::Account(e) => e.to_string(),
            AppError::Validation(msg) | AppError::Timeout(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let body = ApiResponse::error(
            code,
            &self.message(),
            uuid::Uuid::now_v7().to_string(),
            0,
        );
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_types::error::TransportError;

    #[test]
    fn maps_error_kinds_to_status() {
        let cases = [
            (
                AppError::from(TemplateError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(TemplateError::Validation("empty".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(AccountError::AlreadyConnected("work".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(AccountError::AuthenticationFailed("bad code".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::from(AccountError::Transport(TransportError::Network("down".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Timeout("slow".into()),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::Validation("template is required".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status().0, expected, "{err:?}");
        }
    }

    #[test]
    fn into_response_uses_mapped_status() {
        let response = AppError::from(TemplateError::NotFound("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
