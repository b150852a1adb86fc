use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Map a database error to an `AppError`, turning unique violations into conflicts
pub fn map_db_error(e: sqlx::Error, conflict_message: &str) -> crate::core::error::AppError {
    use crate::core::error::AppError;

    if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique_violation
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Conflict(conflict_message.to_string());
        }
    }

    AppError::Database(e)
}
