use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::repositories::CategoryRepository;

/// Service for category operations
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let category = self.repository.insert(&dto.name, &dto.description).await?;
        tracing::info!(category_id = category.id, "Category created");
        Ok(category.into())
    }

    /// List all categories ordered by id
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.repository.find_all().await?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CategoryResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(|c| c.into())
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update; at least one field must be present
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        if dto.is_empty() {
            return Err(AppError::BadRequest(
                "At least one of name or description must be provided".to_string(),
            ));
        }

        let category = self
            .repository
            .update(id, dto.name.as_deref(), dto.description.as_deref())
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(category_id = category.id, "Category updated");
        Ok(category.into())
    }

    /// Delete a category, returning it as it was before removal
    pub async fn delete(&self, id: i64) -> Result<CategoryResponseDto> {
        let category = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(category_id = category.id, "Category deleted");
        Ok(category.into())
    }
}
