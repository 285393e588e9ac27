//! Booking service: requests, approval workflow, slot availability and completion

use chrono::{Local, NaiveDateTime};
use validator::Validate;

use crate::{
    config::BookingsConfig,
    error::{AppError, AppResult},
    models::{
        booking::{
            Booking, BookingDetails, BookingQuery, CreateBooking, CreateBookingResponse,
            EquipmentDay,
        },
        enums::{BookingStatus, EquipmentStatus},
        user::UserClaims,
    },
    repository::{
        bookings::{BookingFilter, NewBooking},
        Repository,
    },
    services::{email::EmailService, scheduling},
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    config: BookingsConfig,
    email: EmailService,
}

/// Server wall-clock time; booking dates and times are local
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl BookingsService {
    pub fn new(repository: Repository, config: BookingsConfig, email: EmailService) -> Self {
        Self { repository, config, email }
    }

    /// Request a booking. Overlaps with existing bookings are reported and
    /// logged; they only block the request when `reject_conflicts` is set.
    pub async fn create(&self, claims: &UserClaims, data: CreateBooking) -> AppResult<CreateBookingResponse> {
        data.validate()?;

        let date = scheduling::parse_date(&data.date)?;
        let start_time = scheduling::parse_time(&data.start_time)?;
        let window = scheduling::validate_window(
            date,
            start_time,
            data.duration,
            self.config.open_hour,
            self.config.close_hour,
        )?;
        if window.start < local_now() {
            return Err(AppError::Validation("Cannot book a slot in the past".to_string()));
        }

        let equipment = self.repository.equipment_get_by_id(data.equipment_id).await?;
        if equipment.status == EquipmentStatus::Maintenance {
            return Err(AppError::BusinessRule(format!(
                "{} is under maintenance",
                equipment.name
            )));
        }

        let existing = self
            .repository
            .bookings_for_equipment_on(equipment.id, date)
            .await?;
        let conflicts = scheduling::find_conflicts(&window, &existing, None);

        if !conflicts.is_empty() {
            tracing::warn!(
                equipment_id = equipment.id,
                date = %date,
                start = %start_time,
                duration = data.duration,
                user = claims.email(),
                conflicts = ?conflicts,
                "Booking overlaps existing bookings"
            );
            if self.config.reject_conflicts {
                return Err(AppError::SlotConflict(format!(
                    "Requested time overlaps bookings {:?}",
                    conflicts
                )));
            }
        }

        let user = self.repository.users_get_by_id(claims.user_id).await?;
        let new_booking = NewBooking {
            user_email: user.email.clone(),
            equipment_id: equipment.id,
            date,
            start_time,
            duration: data.duration,
            supervisor: data.supervisor.or(user.supervisor),
            department: data.department.or(Some(user.department)),
            purpose: data.purpose,
        };

        let booking = self.repository.bookings_create(&new_booking).await?;
        tracing::info!(
            booking_id = booking.id,
            equipment_id = booking.equipment_id,
            user = %booking.user_email,
            "Booking requested"
        );

        Ok(CreateBookingResponse { booking, conflicts })
    }

    /// Bookings of the calling user
    pub async fn list_mine(&self, claims: &UserClaims, query: &BookingQuery) -> AppResult<Vec<BookingDetails>> {
        self.complete_elapsed(local_now()).await?;
        let mut filter = self.filter_from_query(query)?;
        filter.user_email = Some(claims.email().to_string());
        self.repository.bookings_list(&filter).await
    }

    /// Bookings visible to an admin: their instruments, or everything for the super-admin
    pub async fn list(&self, claims: &UserClaims, query: &BookingQuery) -> AppResult<Vec<BookingDetails>> {
        claims.require_admin()?;
        self.complete_elapsed(local_now()).await?;

        let mut filter = self.filter_from_query(query)?;
        if !claims.is_super_admin() {
            let instruments = self
                .repository
                .admins_get_by_email(claims.email())
                .await?
                .map(|a| a.assigned_instruments)
                .unwrap_or_default();
            if instruments.is_empty() {
                return Ok(Vec::new());
            }
            filter.equipment_ids = Some(instruments);
        }
        self.repository.bookings_list(&filter).await
    }

    /// Get one booking: owner, responsible admin or super-admin
    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<BookingDetails> {
        let details = self.repository.bookings_get_details(id).await?;
        let owner = details.booking.user_email.eq_ignore_ascii_case(claims.email());
        if !owner && !self.can_manage(claims, details.booking.equipment_id).await? {
            return Err(AppError::Authorization("Not allowed to view this booking".to_string()));
        }
        Ok(details)
    }

    /// Apply a status change requested by an admin
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: i32,
        next: BookingStatus,
    ) -> AppResult<Booking> {
        claims.require_admin()?;
        let current = self.repository.bookings_get_by_id(id).await?;
        if !self.can_manage(claims, current.equipment_id).await? {
            return Err(AppError::Authorization(
                "You are not an admin of this equipment".to_string(),
            ));
        }
        if !current.status.can_transition_to(next) {
            return Err(AppError::BusinessRule(format!(
                "Cannot change booking from {} to {}",
                current.status, next
            )));
        }

        let updated = if next == BookingStatus::Completed {
            self.repository.bookings_complete(id).await?
        } else {
            self.repository
                .bookings_transition(id, current.status, next)
                .await?
        }
        .ok_or_else(|| AppError::Conflict("Booking was modified by someone else".to_string()))?;

        tracing::info!(
            booking_id = id,
            from = %current.status,
            to = %next,
            by = claims.email(),
            "Booking status changed"
        );

        if matches!(next, BookingStatus::Approved | BookingStatus::Rejected) {
            self.notify(&updated).await;
        }
        Ok(updated)
    }

    /// Cancel a booking: the owner while it is pending, or the super-admin
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let booking = self.repository.bookings_get_by_id(id).await?;
        let owner = booking.user_email.eq_ignore_ascii_case(claims.email());

        if !claims.is_super_admin() {
            if !owner {
                return Err(AppError::Authorization("Not allowed to delete this booking".to_string()));
            }
            if booking.status != BookingStatus::Pending {
                return Err(AppError::BusinessRule(
                    "Only pending bookings can be cancelled".to_string(),
                ));
            }
        }

        self.repository.bookings_delete(id).await?;
        tracing::info!(booking_id = id, by = claims.email(), "Booking deleted");
        Ok(())
    }

    /// Hourly availability of an instrument on a day
    pub async fn day_slots(&self, equipment_id: i32, date: &str) -> AppResult<EquipmentDay> {
        let date = scheduling::parse_date(date)?;
        self.repository.equipment_get_by_id(equipment_id).await?;
        let bookings = self.repository.bookings_for_equipment_on(equipment_id, date).await?;

        Ok(EquipmentDay {
            equipment_id,
            date,
            slots: scheduling::day_slots(date, self.config.open_hour, self.config.close_hour, &bookings),
        })
    }

    /// Complete every approved booking whose window has passed at `now`,
    /// crediting its hours to the instrument. Returns the number completed.
    pub async fn complete_elapsed(&self, now: NaiveDateTime) -> AppResult<u64> {
        let candidates = self
            .repository
            .bookings_in_status_until(BookingStatus::Approved, now.date())
            .await?;

        let mut completed = 0;
        for booking in candidates.iter().filter(|b| scheduling::is_elapsed(b, now)) {
            if self.repository.bookings_complete(booking.id).await?.is_some() {
                completed += 1;
                tracing::debug!(booking_id = booking.id, "Booking auto-completed");
            }
        }

        if completed > 0 {
            tracing::info!(completed, "Elapsed bookings marked completed");
        }
        Ok(completed)
    }

    async fn can_manage(&self, claims: &UserClaims, equipment_id: i32) -> AppResult<bool> {
        if claims.is_super_admin() {
            return Ok(true);
        }
        if !claims.is_admin() {
            return Ok(false);
        }
        Ok(self
            .repository
            .admins_get_by_email(claims.email())
            .await?
            .map(|a| a.manages(equipment_id))
            .unwrap_or(false))
    }

    fn filter_from_query(&self, query: &BookingQuery) -> AppResult<BookingFilter> {
        Ok(BookingFilter {
            status: query.status,
            equipment_id: query.equipment_id,
            date: query.date.as_deref().map(scheduling::parse_date).transpose()?,
            ..Default::default()
        })
    }

    async fn notify(&self, booking: &Booking) {
        let equipment_name = match self.repository.equipment_get_by_id(booking.equipment_id).await {
            Ok(e) => e.name,
            Err(_) => format!("equipment #{}", booking.equipment_id),
        };
        if let Err(e) = self
            .email
            .send_booking_status(&booking.user_email, booking, &equipment_name)
            .await
        {
            tracing::warn!(booking_id = booking.id, error = %e, "Failed to send booking notification");
        }
    }
}
