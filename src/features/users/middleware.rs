use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::services::UserService;

/// User auth: requires token auth to have run, then loads the active `User` behind the
/// token into request extensions.
pub async fn user_auth_middleware(
    State(users): State<Arc<UserService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let user = users.resolve(&principal).await?;
    tracing::debug!(user_id = user.id, "User resolved");

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
