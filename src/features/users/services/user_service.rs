use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::User;
use crate::features::users::repositories::UserRepository;

/// Resolves token principals to user accounts
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Look up the active user behind a verified token
    pub async fn resolve(&self, principal: &AuthenticatedUser) -> Result<User> {
        let id = principal
            .account_id
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id >= 1)
            .ok_or_else(|| AppError::BadRequest("Invalid user ID".to_string()))?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }

        Ok(user)
    }
}
