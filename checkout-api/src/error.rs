use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkout_core::{CheckoutError, FieldViolation};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String, Vec<FieldViolation>),
    BadRequest(String),
    NotFoundError(String),
    ConflictError(String),
    UpstreamError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Webhook Error: {}", msg) }),
            ),
            AppError::ValidationError(msg, fields) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg, "fields": fields }))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::UpstreamError(msg) => {
                tracing::error!("Payment provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Order could not be saved, please try again" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::ValidationError(fields) => AppError::ValidationError(message, fields),
            CheckoutError::PaymentProviderError(_) => AppError::UpstreamError(message),
            CheckoutError::PersistenceError(_) => AppError::InternalServerError(message),
            CheckoutError::NotFoundError(_) => AppError::NotFoundError(message),
            CheckoutError::AuthenticationError(msg) => AppError::AuthenticationError(msg),
            CheckoutError::InvalidTransition { .. } => AppError::ConflictError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let status = |e: CheckoutError| AppError::from(e).into_response().status();

        assert_eq!(status(CheckoutError::ValidationError(vec![])), StatusCode::BAD_REQUEST);
        assert_eq!(status(CheckoutError::PaymentProviderError("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(CheckoutError::PersistenceError("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(CheckoutError::NotFoundError("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(CheckoutError::AuthenticationError("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(CheckoutError::InvalidTransition { from: "paid".into(), to: "failed".into() }),
            StatusCode::CONFLICT
        );
    }
}
