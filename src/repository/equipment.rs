//! Equipment domain methods on Repository

use chrono::Utc;
use sqlx::{Postgres, Transaction};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{format_uptime, CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
};

impl Repository {
    /// List equipment, optionally filtered
    pub async fn equipment_list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref department) = query.department {
            params.push(department.clone());
            conditions.push(format!("department = ${}", params.len()));
        }
        if let Some(ref category) = query.category {
            params.push(category.clone());
            conditions.push(format!("category = ${}", params.len()));
        }
        if let Some(status) = query.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("status = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_query = format!("SELECT * FROM equipment {} ORDER BY name", where_clause);
        let mut builder = sqlx::query_as::<_, Equipment>(&select_query);
        for param in &params {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Get equipment by ID
    pub async fn equipment_get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Ids among `ids` that do not exist
    pub async fn equipment_missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let existing: Vec<i32> = sqlx::query_scalar("SELECT id FROM equipment WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.iter().copied().filter(|id| !existing.contains(id)).collect())
    }

    /// Create equipment
    pub async fn equipment_create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let maintenance_hours = data.maintenance_hours.unwrap_or(0.0);
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, department, category, location, contact, status,
                                   image_url, maintenance_hours, uptime)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.department)
        .bind(&data.category)
        .bind(&data.location)
        .bind(&data.contact)
        .bind(data.status.unwrap_or(crate::models::EquipmentStatus::Available))
        .bind(&data.image_url)
        .bind(maintenance_hours)
        .bind(format_uptime(0.0, maintenance_hours))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment
    ///
    /// The row stays locked (as in `equipment_add_hours`) while the uptime is
    /// derived from its booked hours.
    pub async fn equipment_update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut tx = self.pool.begin().await?;

        let total_hours: f64 =
            sqlx::query_scalar("SELECT total_hours FROM equipment WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        let uptime = data
            .maintenance_hours
            .map(|maintenance| format_uptime(total_hours, maintenance));

        let now = Utc::now();
        let mut sets = vec!["modif_date = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.department, "department");
        add_field!(data.category, "category");
        add_field!(data.location, "location");
        add_field!(data.contact, "contact");
        add_field!(data.status, "status");
        add_field!(data.image_url, "image_url");
        add_field!(data.maintenance_hours, "maintenance_hours");
        add_field!(uptime, "uptime");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.department);
        bind_field!(data.category);
        bind_field!(data.location);
        bind_field!(data.contact);
        bind_field!(data.status);
        bind_field!(data.image_url);
        bind_field!(data.maintenance_hours);
        bind_field!(uptime);

        let row = builder.bind(id).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Add booked hours to an instrument and refresh its uptime, inside a transaction
    pub async fn equipment_add_hours(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        hours: f64,
    ) -> AppResult<Equipment> {
        let (total, maintenance): (f64, f64) = sqlx::query_as(
            "SELECT total_hours, maintenance_hours FROM equipment WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        let total = total + hours;
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET total_hours = $1, uptime = $2, modif_date = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(total)
        .bind(format_uptime(total, maintenance))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Delete equipment (bookings cascade) and drop it from admin assignments
    pub async fn equipment_delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        sqlx::query(
            "UPDATE admins SET assigned_instruments = array_remove(assigned_instruments, $1), modif_date = NOW() WHERE $1 = ANY(assigned_instruments)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Equipment count per status (for stats)
    pub async fn equipment_count_by_status(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM equipment GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
