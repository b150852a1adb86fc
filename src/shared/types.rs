use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope shared by every response of the service
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` for successful responses
    pub status: bool,
    /// HTTP status code, repeated in the body
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, body: T) -> Self {
        Self {
            status: true,
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            body: Some(body),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            status: false,
            code: status.as_u16(),
            message,
            body: None,
            errors,
        }
    }
}
