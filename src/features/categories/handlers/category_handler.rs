use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppPayload, IdPath, Validated};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::services::CategoryService;
use crate::features::users::models::User;
use crate::shared::types::ApiResponse;

/// Create a new category
///
/// Accepts `application/json` or `application/x-www-form-urlencoded` bodies.
#[utoipa::path(
    post,
    path = "/categories",
    request_body(content = CreateCategoryDto, description = "Create a new category"),
    responses(
        (status = 200, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid category payload or user ID"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Category name already taken"),
        (status = 500, description = "Server error")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    user: User,
    Validated(dto): Validated<CreateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    tracing::debug!(user_id = user.id, "Creating category");
    let category = service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        "Category created successfully",
        category,
    )))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "The list of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Server error")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list().await?;
    Ok(Json(ApiResponse::success(
        "Categories retrieved successfully",
        categories,
    )))
}

/// Find category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = i64, Path, description = "ID of category to return")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid ID supplied"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Server error")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        "Category retrieved successfully",
        category,
    )))
}

/// Update an existing category by ID
///
/// Fields left out of the body keep their current value.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = i64, Path, description = "ID of category to update")
    ),
    request_body(content = UpdateCategoryDto, description = "Update a category"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid ID supplied or invalid payload"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Category or user not found"),
        (status = 409, description = "Category name already taken"),
        (status = 500, description = "Server error")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    IdPath(id): IdPath,
    user: User,
    AppPayload(dto): AppPayload<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()?;

    tracing::debug!(user_id = user.id, category_id = id, "Updating category");
    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        "Category updated successfully",
        category,
    )))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = i64, Path, description = "ID of category to delete")
    ),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid ID supplied"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Category or user not found"),
        (status = 500, description = "Server error")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    IdPath(id): IdPath,
    user: User,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    tracing::debug!(user_id = user.id, category_id = id, "Deleting category");
    let category = service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        "Category deleted successfully",
        category,
    )))
}
