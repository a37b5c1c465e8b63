//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

use crate::views::ViewError;

pub const MSG_FIELDS_REQUIRED: &str = "All fields are required";
pub const MSG_SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const MSG_PAYMENT_NOT_SAVED: &str = "Order placed but failed to save payment details";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";

/// API-level error type that maps to HTTP responses.
///
/// The body is always `{"message": ...}` with one of the fixed messages
/// above; the underlying error is logged and never sent to the client.
#[derive(Debug)]
pub enum ApiError {
    /// No authenticated customer on the request.
    Unauthorized,
    /// Checkout workflow error.
    Checkout(CheckoutError),
    /// A page failed to render.
    Render(ViewError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, MSG_UNAUTHORIZED),
            ApiError::Checkout(err) => checkout_error_to_response(&err),
            ApiError::Render(err) => {
                tracing::error!(error = %err, "page rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, MSG_SOMETHING_WENT_WRONG)
            }
        };

        let body = serde_json::json!({ "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: &CheckoutError) -> (StatusCode, &'static str) {
    match err {
        e if e.is_validation() => (StatusCode::UNPROCESSABLE_ENTITY, MSG_FIELDS_REQUIRED),
        CheckoutError::PaymentNotRecorded { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, MSG_PAYMENT_NOT_SAVED)
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, MSG_SOMETHING_WENT_WRONG),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::Render(err)
    }
}
