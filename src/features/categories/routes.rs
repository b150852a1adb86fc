use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::core::middleware::{
    method_not_allowed, token_auth_middleware, validate_request_schema,
};
use crate::features::auth::JwtValidator;
use crate::features::categories::dtos::CreateCategoryDto;
use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;
use crate::features::users::{user_auth_middleware, UserService};

/// Create routes for the categories feature, relative to its mount point.
///
/// | Method | Path   | Chain                                     |
/// |--------|--------|-------------------------------------------|
/// | POST   | `/`    | schema validation, token auth, user auth  |
/// | GET    | `/`    | token auth                                |
/// | GET    | `/{id}`| token auth                                |
/// | PUT    | `/{id}`| token auth, user auth                     |
/// | DELETE | `/{id}`| token auth, user auth                     |
///
/// Route layers wrap outward, so the last `route_layer` call runs first. The
/// method-not-allowed fallback is set after the layers and never passes through them.
pub fn routes(
    service: Arc<CategoryService>,
    validator: Arc<JwtValidator>,
    users: Arc<UserService>,
) -> Router {
    let token_auth = from_fn_with_state(validator, token_auth_middleware);
    let user_auth = from_fn_with_state(users, user_auth_middleware);
    let create_schema = from_fn(validate_request_schema::<CreateCategoryDto>);

    Router::new()
        .route(
            "/",
            post(handlers::create_category)
                .route_layer(user_auth.clone())
                .route_layer(token_auth.clone())
                .route_layer(create_schema),
        )
        .route(
            "/",
            get(handlers::list_categories).route_layer(token_auth.clone()),
        )
        .route(
            "/{id}",
            get(handlers::get_category).route_layer(token_auth.clone()),
        )
        .route(
            "/{id}",
            put(handlers::update_category)
                .route_layer(user_auth.clone())
                .route_layer(token_auth.clone()),
        )
        .route(
            "/{id}",
            delete(handlers::delete_category)
                .route_layer(user_auth)
                .route_layer(token_auth),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(service)
}
