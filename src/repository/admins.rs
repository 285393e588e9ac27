//! Admin assignment domain methods on Repository

use chrono::Utc;
use sqlx::{Postgres, Transaction};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::admin::{over_capacity, Admin, MAX_ADMINS_PER_EQUIPMENT},
};

impl Repository {
    /// List all admins
    pub async fn admins_list(&self) -> AppResult<Vec<Admin>> {
        let rows = sqlx::query_as::<_, Admin>("SELECT * FROM admins ORDER BY email")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get admin by ID
    pub async fn admins_get_by_id(&self, id: i32) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Admin {} not found", id)))
    }

    /// Get the admin record of a user, if any
    pub async fn admins_get_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let row = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create an admin assignment, refusing instruments that already have the
    /// maximum number of admins
    pub async fn admins_create(&self, email: &str, instruments: &[i32]) -> AppResult<Admin> {
        let mut tx = self.pool.begin().await?;
        Self::admins_check_capacity(&mut tx, instruments, None).await?;

        let row = sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (email, assigned_instruments) VALUES ($1, $2) RETURNING *",
        )
        .bind(email.to_lowercase())
        .bind(instruments)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Replace the instruments of an admin, with the same capacity check
    pub async fn admins_update(&self, id: i32, instruments: &[i32]) -> AppResult<Admin> {
        let mut tx = self.pool.begin().await?;
        Self::admins_check_capacity(&mut tx, instruments, Some(id)).await?;

        let row = sqlx::query_as::<_, Admin>(
            "UPDATE admins SET assigned_instruments = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(instruments)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Admin {} not found", id)))?;

        tx.commit().await?;
        Ok(row)
    }

    /// Serialize assignment writes and check the per-instrument cap.
    /// The table lock is held until the surrounding transaction ends.
    async fn admins_check_capacity(
        tx: &mut Transaction<'_, Postgres>,
        instruments: &[i32],
        editing: Option<i32>,
    ) -> AppResult<()> {
        sqlx::query("LOCK TABLE admins IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await?;

        let admins = sqlx::query_as::<_, Admin>("SELECT * FROM admins")
            .fetch_all(&mut **tx)
            .await?;
        let full = over_capacity(instruments, &admins, editing);
        if !full.is_empty() {
            return Err(AppError::AdminLimit(format!(
                "Equipment {:?} already has {} admins",
                full, MAX_ADMINS_PER_EQUIPMENT
            )));
        }
        Ok(())
    }

    /// Delete an admin assignment
    pub async fn admins_delete(&self, id: i32) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>("DELETE FROM admins WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Admin {} not found", id)))
    }
}
