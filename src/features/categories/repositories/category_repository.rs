use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::database::map_db_error;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

pub const DUPLICATE_NAME_MESSAGE: &str = "A category with this name already exists";

/// Persistence contract for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, name: &str, description: &str) -> Result<Category>;

    /// All categories ordered by id
    async fn find_all(&self) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Apply the given fields; `None` when the category does not exist
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Category>>;

    /// Remove and return the category; `None` when it does not exist
    async fn delete(&self, id: i64) -> Result<Option<Category>>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert(&self, name: &str, description: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, DUPLICATE_NAME_MESSAGE))
    }

    async fn find_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, DUPLICATE_NAME_MESSAGE))
    }

    async fn delete(&self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            DELETE FROM categories
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete category: {:?}", e);
            AppError::Database(e)
        })
    }
}
