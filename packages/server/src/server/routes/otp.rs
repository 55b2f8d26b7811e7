//! OTP endpoints.
//!
//! POST /send-sms     {"phone_number": "+15551234567"}
//! POST /verify-code  {"phone_number": "+15551234567", "code": "123456"}
//!
//! Fields are optional at the serde level so a missing field is reported as a
//! 400 validation error instead of axum's default 422.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::auth::OtpError;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub phone_number: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Issue a new code and text it to the phone number
pub async fn send_sms_handler(
    Extension(state): Extension<AxumAppState>,
    payload: Result<Json<SendSmsRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|_| OtpError::validation("Phone number is required"))?;
    let phone_number = request.phone_number.unwrap_or_default();

    state.deps.otp.issue(&phone_number).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Verification SMS sent".to_string(),
    }))
}

/// Check a code previously sent to the phone number
pub async fn verify_code_handler(
    Extension(state): Extension<AxumAppState>,
    payload: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|_| OtpError::validation("Phone number and code are required"))?;
    let phone_number = request.phone_number.unwrap_or_default();
    let code = request.code.unwrap_or_default();

    state.deps.otp.verify(&phone_number, &code).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Phone number verified".to_string(),
    }))
}
