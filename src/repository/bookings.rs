//! Bookings domain methods on Repository

use chrono::{NaiveDate, NaiveTime, Utc};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails},
        enums::BookingStatus,
    },
};

/// Validated fields of a new booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_email: String,
    pub equipment_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration: f64,
    pub supervisor: Option<String>,
    pub department: Option<String>,
    pub purpose: Option<String>,
}

/// Listing filter; `None` fields do not restrict
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_email: Option<String>,
    /// Restrict to these instruments (admin scope)
    pub equipment_ids: Option<Vec<i32>>,
    pub equipment_id: Option<i32>,
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
}

const DETAILS_SELECT: &str = r#"
    SELECT b.*, e.name AS equipment_name
    FROM bookings b
    JOIN equipment e ON e.id = b.equipment_id
"#;

impl Repository {
    /// Insert a pending booking
    pub async fn bookings_create(&self, data: &NewBooking) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_email, equipment_id, date, start_time, duration,
                                  supervisor, department, purpose, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.user_email)
        .bind(data.equipment_id)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.duration)
        .bind(&data.supervisor)
        .bind(&data.department)
        .bind(&data.purpose)
        .bind(BookingStatus::Pending)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Get booking by ID
    pub async fn bookings_get_by_id(&self, id: i32) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    /// Get booking with its equipment name
    pub async fn bookings_get_details(&self, id: i32) -> AppResult<BookingDetails> {
        let query = format!("{} WHERE b.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    /// List bookings matching a filter, newest day first
    pub async fn bookings_list(&self, filter: &BookingFilter) -> AppResult<Vec<BookingDetails>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.user_email.is_some() {
            conditions.push(format!("LOWER(b.user_email) = LOWER(${})", idx));
            idx += 1;
        }
        if filter.equipment_ids.is_some() {
            conditions.push(format!("b.equipment_id = ANY(${})", idx));
            idx += 1;
        }
        if filter.equipment_id.is_some() {
            conditions.push(format!("b.equipment_id = ${}", idx));
            idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("b.status = ${}", idx));
            idx += 1;
        }
        if filter.date.is_some() {
            conditions.push(format!("b.date = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "{} {} ORDER BY b.date DESC, b.start_time DESC, b.id DESC",
            DETAILS_SELECT, where_clause
        );

        let mut builder = sqlx::query_as::<_, BookingDetails>(&query);
        if let Some(ref email) = filter.user_email { builder = builder.bind(email); }
        if let Some(ref ids) = filter.equipment_ids { builder = builder.bind(ids); }
        if let Some(id) = filter.equipment_id { builder = builder.bind(id); }
        if let Some(status) = filter.status { builder = builder.bind(status); }
        if let Some(date) = filter.date { builder = builder.bind(date); }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Bookings of one instrument on one day, all statuses
    pub async fn bookings_for_equipment_on(
        &self,
        equipment_id: i32,
        date: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE equipment_id = $1 AND date = $2 ORDER BY start_time",
        )
        .bind(equipment_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Bookings in a given status scheduled on or before a day
    pub async fn bookings_in_status_until(
        &self,
        status: BookingStatus,
        until: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = $1 AND date <= $2 ORDER BY date, start_time",
        )
        .bind(status)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Move a booking from `from` to `to`. Returns `None` when the booking is
    /// no longer in `from` (someone else changed it first).
    pub async fn bookings_transition(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, modif_date = $2 WHERE id = $3 AND status = $4 RETURNING *",
        )
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Mark an approved booking completed and credit its hours to the
    /// instrument, atomically. Returns `None` if it was not approved anymore.
    pub async fn bookings_complete(&self, id: i32) -> AppResult<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, modif_date = $2 WHERE id = $3 AND status = $4 RETURNING *",
        )
        .bind(BookingStatus::Completed)
        .bind(Utc::now())
        .bind(id)
        .bind(BookingStatus::Approved)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(booking) = booking else {
            tx.rollback().await?;
            return Ok(None);
        };

        self.equipment_add_hours(&mut tx, booking.equipment_id, booking.duration)
            .await?;

        tx.commit().await?;
        Ok(Some(booking))
    }

    /// Delete a booking
    pub async fn bookings_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }

    /// Booking count per status (for stats)
    pub async fn bookings_count_by_status(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM bookings GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Booked hours per instrument, excluding rejected bookings (for stats)
    pub async fn bookings_hours_per_equipment(&self) -> AppResult<Vec<(i32, String, f64)>> {
        let rows = sqlx::query_as::<_, (i32, String, f64)>(
            r#"
            SELECT e.id, e.name, COALESCE(SUM(b.duration), 0)::float8
            FROM equipment e
            LEFT JOIN bookings b ON b.equipment_id = e.id AND b.status != 'rejected'
            GROUP BY e.id, e.name
            ORDER BY e.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
