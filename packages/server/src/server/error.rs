//! HTTP mapping for OTP errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domains::auth::OtpError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by route handlers
#[derive(Debug)]
pub struct ApiError(pub OtpError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            OtpError::Validation(_) => StatusCode::BAD_REQUEST,
            OtpError::NotFound => StatusCode::NOT_FOUND,
            OtpError::Expired | OtpError::InvalidCode => StatusCode::BAD_REQUEST,
            OtpError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            OtpError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Provider details stay in the logs
        let message = match &self.0 {
            OtpError::Delivery(_) => "Failed to send SMS".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
