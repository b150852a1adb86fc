use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::users::models::User;
use crate::shared::constants::INVALID_ID_MESSAGE;

/// Request body extractor accepting JSON or url-encoded forms with consistent error responses
pub struct AppPayload<T>(pub T);

impl<T, S> FromRequest<S> for AppPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(json_rejection)?;
            Ok(Self(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(form_rejection)?;
            Ok(Self(value))
        } else {
            Err(AppError::BadRequest(
                "Unsupported content type, expected application/json or application/x-www-form-urlencoded"
                    .to_string(),
            ))
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err.body_text()),
        _ => "Failed to parse JSON body".to_string(),
    };
    AppError::BadRequest(message)
}

fn form_rejection(rejection: FormRejection) -> AppError {
    AppError::BadRequest(format!("Invalid form data: {}", rejection.body_text()))
}

/// Positive integer id taken from the `{id}` path segment
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) if id >= 1 => Ok(Self(id)),
            _ => Err(AppError::BadRequest(INVALID_ID_MESSAGE.to_string())),
        }
    }
}

/// Body that already passed the schema validation middleware
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<T, S> FromRequestParts<S> for Validated<T>
where
    T: Clone + Send + Sync + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Validated<T>>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Route is missing schema validation".to_string()))
    }
}

impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("User authentication required".to_string()))
    }
}
