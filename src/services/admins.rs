//! Admin-to-equipment assignment service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{Admin, CreateAdmin},
        enums::UserRole,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AdminsService {
    repository: Repository,
}

impl AdminsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Admin>> {
        self.repository.admins_list().await
    }

    /// Assignment of the given user, if they administer anything
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        self.repository.admins_get_by_email(email).await
    }

    /// Make a user admin of a set of instruments
    pub async fn create(&self, data: CreateAdmin) -> AppResult<Admin> {
        data.validate()?;
        let email = data.email.trim().to_lowercase();

        let user = self
            .repository
            .users_get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user with email {}", email)))?;

        if self.repository.admins_get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!("{} is already an admin", email)));
        }

        let instruments = normalize_ids(&data.assigned_instruments);
        self.check_instruments(&instruments).await?;

        let admin = self.repository.admins_create(&email, &instruments).await?;

        if !user.role.is_admin() {
            self.repository.users_update_role(user.id, UserRole::Admin).await?;
        }

        tracing::info!(admin_id = admin.id, email = %email, instruments = ?instruments, "Admin assigned");
        Ok(admin)
    }

    /// Replace the instruments of an admin
    pub async fn update(&self, id: i32, assigned: &[i32]) -> AppResult<Admin> {
        self.repository.admins_get_by_id(id).await?;
        let instruments = normalize_ids(assigned);
        self.check_instruments(&instruments).await?;

        let admin = self.repository.admins_update(id, &instruments).await?;
        tracing::info!(admin_id = id, instruments = ?instruments, "Admin assignment updated");
        Ok(admin)
    }

    /// Remove an admin assignment; the user's role is left unchanged
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let admin = self.repository.admins_delete(id).await?;
        tracing::info!(admin_id = id, email = %admin.email, "Admin removed");
        Ok(())
    }

    async fn check_instruments(&self, instruments: &[i32]) -> AppResult<()> {
        let missing = self.repository.equipment_missing_ids(instruments).await?;
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!("Unknown equipment ids: {:?}", missing)));
        }
        Ok(())
    }
}

/// Sorted, deduplicated ids
fn normalize_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deduplicated() {
        assert_eq!(normalize_ids(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }
}
