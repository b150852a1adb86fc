use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::{trimmed, trimmed_opt};

/// Create request; also the schema enforced by the validation middleware on `POST /categories`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// This is the name of the category
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    #[schema(example = "swagger name category")]
    pub name: String,

    /// This is the description of the category
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "description must be between 1 and 255 characters"
    ))]
    #[schema(example = "swagger description category")]
    pub description: String,
}

/// Partial update request; omitted fields keep their value
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    #[schema(example = "swagger name category")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "description must be between 1 and 255 characters"
    ))]
    #[schema(example = "swagger description category")]
    pub description: Option<String>,
}

impl UpdateCategoryDto {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    #[schema(example = 1)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
