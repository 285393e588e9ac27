//! Pending registration awaiting email verification

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::enums::UserRole;

/// One pending registration per email; replaced when the user registers again
#[derive(Debug, Clone, FromRow)]
pub struct VerificationCode {
    pub email: String,
    /// SHA-256 hex digest of the emailed code
    pub code_hash: String,
    pub name: String,
    pub department: String,
    pub role: UserRole,
    /// Argon2 hash of the chosen password
    pub password: String,
    pub supervisor: Option<String>,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub crea_date: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
