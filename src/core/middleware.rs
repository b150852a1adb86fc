use crate::core::error::AppError;
use crate::core::extractor::{AppPayload, Validated};
use crate::features::auth::JwtValidator;
use crate::shared::constants::MAX_SCHEMA_BODY_SIZE;
use axum::{
    body::Body,
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;
use validator::Validate;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Basic auth guard for the Swagger UI; `valid_credentials` is "username:password"
pub async fn basic_auth_middleware(
    State(valid_credentials): State<Arc<String>>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .is_some_and(|creds| creds == *valid_credentials);

    if authorized {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")],
        "Unauthorized",
    )
        .into_response()
}

/// Token auth: verifies the bearer JWT and stores the `AuthenticatedUser` in request extensions
pub async fn token_auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

    let user = validator.validate_token(token).await?;
    tracing::debug!(account_id = %user.account_id, roles = ?user.roles, "Token accepted");

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Schema validation: decodes the body as `T`, runs its validation rules and hands the
/// decoded value to the handler through `Validated<T>`. The body is forwarded unchanged.
pub async fn validate_request_schema<T>(req: Request, next: Next) -> Result<Response, AppError>
where
    T: DeserializeOwned + Validate + Clone + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_SCHEMA_BODY_SIZE)
        .await
        .map_err(|_| AppError::BadRequest("Request body is too large or unreadable".to_string()))?;

    let mut replay = Request::new(Body::from(bytes.clone()));
    *replay.method_mut() = parts.method.clone();
    *replay.headers_mut() = parts.headers.clone();

    let AppPayload(payload) = AppPayload::<T>::from_request(replay, &()).await?;
    payload.validate()?;

    parts.extensions.insert(Validated(payload));
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Fallback for paths no router claims
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Fallback for a known path requested with a method it does not register
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Method not allowed".to_string())
}
