//! Pending registrations (email OTP) on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::verification::VerificationCode,
};

impl Repository {
    /// Insert or replace the pending registration for an email
    pub async fn verification_upsert(&self, code: &VerificationCode) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (email, code_hash, name, department, role, password,
                                            supervisor, attempts, expires_at, crea_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9)
            ON CONFLICT (email) DO UPDATE SET
                code_hash = EXCLUDED.code_hash,
                name = EXCLUDED.name,
                department = EXCLUDED.department,
                role = EXCLUDED.role,
                password = EXCLUDED.password,
                supervisor = EXCLUDED.supervisor,
                attempts = 0,
                expires_at = EXCLUDED.expires_at,
                crea_date = EXCLUDED.crea_date
            "#,
        )
        .bind(&code.email)
        .bind(&code.code_hash)
        .bind(&code.name)
        .bind(&code.department)
        .bind(code.role)
        .bind(&code.password)
        .bind(&code.supervisor)
        .bind(code.expires_at)
        .bind(code.crea_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get the pending registration for an email
    pub async fn verification_get(&self, email: &str) -> AppResult<Option<VerificationCode>> {
        let row = sqlx::query_as::<_, VerificationCode>(
            "SELECT * FROM verification_codes WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace the code of a pending registration and reset its attempts
    pub async fn verification_refresh_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE verification_codes SET code_hash = $1, expires_at = $2, attempts = 0 WHERE email = $3",
        )
        .bind(code_hash)
        .bind(expires_at)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Count a failed verification attempt
    pub async fn verification_increment_attempts(&self, email: &str) -> AppResult<()> {
        sqlx::query("UPDATE verification_codes SET attempts = attempts + 1 WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a pending registration
    pub async fn verification_delete(&self, email: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM verification_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop all expired pending registrations, returning how many were removed
    pub async fn verification_purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
