//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{UpdateProfile, User, UserClaims, UserQuery},
    },
    repository::Repository,
    services::auth::{hash_password, verify_password},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users_get_by_id(id).await
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users_search(query).await
    }

    /// Update user's own profile (name, department, supervisor, password)
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        profile.validate()?;
        let user = self.repository.users_get_by_id(user_id).await?;

        // If changing password, verify current password
        let password = if let Some(ref new_password) = profile.new_password {
            let current_password = profile.current_password.as_ref().ok_or_else(|| {
                AppError::Validation("Current password required to change password".to_string())
            })?;
            if !verify_password(&user.password, current_password)? {
                return Err(AppError::Authentication("Current password is incorrect".to_string()));
            }
            Some(hash_password(new_password)?)
        } else {
            None
        };

        self.repository.users_update_profile(user_id, &profile, password).await
    }

    /// Change a user's role (super-admin only, never their own)
    pub async fn update_role(&self, actor: &UserClaims, user_id: i32, role: UserRole) -> AppResult<User> {
        if actor.user_id == user_id {
            return Err(AppError::BusinessRule("You cannot change your own role".to_string()));
        }
        let user = self.repository.users_update_role(user_id, role).await?;
        tracing::info!(user_id, role = %role, by = actor.user_id, "User role changed");
        Ok(user)
    }

    /// Record the uploaded profile photo
    pub async fn set_photo(&self, user_id: i32, path: &str) -> AppResult<User> {
        self.repository.users_set_photo(user_id, path).await
    }

    /// Delete a user (super-admin only, never themselves)
    pub async fn delete_user(&self, actor: &UserClaims, user_id: i32) -> AppResult<()> {
        if actor.user_id == user_id {
            return Err(AppError::BusinessRule("You cannot delete your own account".to_string()));
        }
        let user = self.repository.users_delete(user_id).await?;
        tracing::info!(user_id, email = %user.email, by = actor.user_id, "User deleted");
        Ok(())
    }
}
