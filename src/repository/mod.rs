//! Repository layer for database operations
//!
//! Each domain file adds its methods to [`Repository`], prefixed with the
//! domain name (`bookings_*`, `equipment_*`, ...).

pub mod admins;
pub mod bookings;
pub mod equipment;
pub mod users;
pub mod verification;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
