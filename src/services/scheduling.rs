//! Slot bookkeeping for a single instrument
//!
//! Bookings are half-open windows `[start, start + duration)` on the server's
//! local calendar. The day is cut into one-hour slots between the configured
//! opening and closing hours; a slot is taken when any blocking booking
//! (anything but rejected) overlaps it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, DaySlot},
};

/// A booking window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// Window of a stored booking. An end past the calendar's range is clamped
    /// to its last representable instant.
    pub fn new(date: NaiveDate, start_time: NaiveTime, duration_hours: f64) -> Self {
        let start = date.and_time(start_time);
        Self {
            start,
            end: offset(start, Duration::try_minutes(duration_minutes(duration_hours)))
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// Like [`Window::new`], but `None` when the end cannot be represented
    pub fn checked(date: NaiveDate, start_time: NaiveTime, duration_hours: f64) -> Option<Self> {
        let start = date.and_time(start_time);
        let end = offset(start, Duration::try_minutes(duration_minutes(duration_hours)))?;
        Some(Self { start, end })
    }

    /// Half-open interval intersection
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn offset(from: NaiveDateTime, by: Option<Duration>) -> Option<NaiveDateTime> {
    by.and_then(|by| from.checked_add_signed(by))
}

/// Fractional hours rounded to whole minutes
pub fn duration_minutes(hours: f64) -> i64 {
    (hours * 60.0).round() as i64
}

/// Window occupied by a stored booking
pub fn booking_window(booking: &Booking) -> Window {
    Window::new(booking.date, booking.start_time, booking.duration)
}

/// Years accepted on the wire
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Parse a "YYYY-MM-DD" day
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .filter(|date| YEAR_RANGE.contains(&date.year()))
        .ok_or_else(|| AppError::Validation(format!("Invalid date '{}' (use YYYY-MM-DD)", value)))
}

/// Parse an "HH:mm" time
pub fn parse_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time '{}' (use HH:mm)", value)))
}

/// Check a requested window against the opening hours and return it
pub fn validate_window(
    date: NaiveDate,
    start_time: NaiveTime,
    duration_hours: f64,
    open_hour: u32,
    close_hour: u32,
) -> AppResult<Window> {
    if !duration_hours.is_finite() || duration_hours <= 0.0 || duration_hours > 24.0 {
        return Err(AppError::Validation(
            "Duration must be between 0 and 24 hours".to_string(),
        ));
    }
    if duration_minutes(duration_hours) == 0 {
        return Err(AppError::Validation("Duration must be at least one minute".to_string()));
    }

    let out_of_range = || AppError::Validation(format!("Date {} is out of range", date));
    let window = Window::checked(date, start_time, duration_hours).ok_or_else(out_of_range)?;
    let day_start = date.and_time(NaiveTime::MIN);
    let opening =
        offset(day_start, Duration::try_hours(open_hour as i64)).ok_or_else(out_of_range)?;
    let closing =
        offset(day_start, Duration::try_hours(close_hour as i64)).ok_or_else(out_of_range)?;

    if window.start < opening || window.start >= closing {
        return Err(AppError::Validation(format!(
            "Bookings must start between {:02}:00 and {:02}:00",
            open_hour, close_hour
        )));
    }
    if window.end > closing {
        return Err(AppError::Validation(format!(
            "Booking must end by closing time ({:02}:00)",
            close_hour
        )));
    }
    Ok(window)
}

/// Ids of blocking bookings overlapping `candidate`, skipping `exclude_id`
pub fn find_conflicts(candidate: &Window, existing: &[Booking], exclude_id: Option<i32>) -> Vec<i32> {
    existing
        .iter()
        .filter(|b| Some(b.id) != exclude_id)
        .filter(|b| b.status.blocks_slot())
        .filter(|b| booking_window(b).overlaps(candidate))
        .map(|b| b.id)
        .collect()
}

/// Hourly slots of `date` from `open_hour` to `close_hour`, with the bookings occupying each
pub fn day_slots(date: NaiveDate, open_hour: u32, close_hour: u32, bookings: &[Booking]) -> Vec<DaySlot> {
    let day_start = date.and_time(NaiveTime::MIN);
    let windows: Vec<(i32, Window)> = bookings
        .iter()
        .filter(|b| b.status.blocks_slot())
        .map(|b| (b.id, booking_window(b)))
        .collect();

    (open_hour..close_hour)
        .filter_map(|hour| {
            let slot = Window {
                start: offset(day_start, Duration::try_hours(hour as i64))?,
                end: offset(day_start, Duration::try_hours(hour as i64 + 1))?,
            };
            let booking_ids: Vec<i32> = windows
                .iter()
                .filter(|(_, w)| w.overlaps(&slot))
                .map(|(id, _)| *id)
                .collect();
            Some(DaySlot {
                start: slot.start.time(),
                end: slot.end.time(),
                available: booking_ids.is_empty(),
                booking_ids,
            })
        })
        .collect()
}

/// Whether a booking's window has fully passed at `now`
pub fn is_elapsed(booking: &Booking, now: NaiveDateTime) -> bool {
    booking_window(booking).end <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::BookingStatus;
    use chrono::Utc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn booking(id: i32, start: NaiveTime, duration: f64, status: BookingStatus) -> Booking {
        Booking {
            id,
            user_email: "grace@university.edu".to_string(),
            equipment_id: 1,
            date: day(),
            start_time: start,
            duration,
            supervisor: None,
            department: None,
            purpose: None,
            status,
            created_at: Utc::now(),
            modif_date: None,
        }
    }

    #[test]
    fn fractional_durations_round_to_minutes() {
        assert_eq!(duration_minutes(1.5), 90);
        assert_eq!(duration_minutes(0.25), 15);
        assert_eq!(duration_minutes(2.0 / 3.0), 40);
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = Window::new(day(), at(9, 0), 1.0);
        let b = Window::new(day(), at(10, 0), 1.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        let c = Window::new(day(), at(9, 30), 1.0);
        assert!(a.overlaps(&c) && c.overlaps(&b));
    }

    #[test]
    fn slots_cover_opening_hours() {
        let slots = day_slots(day(), 9, 18, &[]);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[8].end, at(18, 0));
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn partial_hour_booking_blocks_every_touched_slot() {
        let bookings = [booking(4, at(10, 30), 1.0, BookingStatus::Approved)];
        let slots = day_slots(day(), 9, 13, &bookings);
        let taken: Vec<bool> = slots.iter().map(|s| !s.available).collect();
        assert_eq!(taken, vec![false, true, true, false]);
        assert_eq!(slots[1].booking_ids, vec![4]);
    }

    #[test]
    fn rejected_bookings_leave_slots_free() {
        let bookings = [
            booking(1, at(9, 0), 2.0, BookingStatus::Rejected),
            booking(2, at(11, 0), 1.0, BookingStatus::Pending),
        ];
        let slots = day_slots(day(), 9, 12, &bookings);
        assert!(slots[0].available);
        assert!(slots[1].available);
        assert!(!slots[2].available);
    }

    #[test]
    fn conflicts_ignore_rejected_and_self() {
        let existing = [
            booking(1, at(9, 0), 2.0, BookingStatus::Approved),
            booking(2, at(10, 0), 1.0, BookingStatus::Rejected),
            booking(3, at(10, 30), 0.5, BookingStatus::Pending),
            booking(5, at(12, 0), 1.0, BookingStatus::Approved),
        ];
        let candidate = Window::new(day(), at(10, 0), 1.0);
        assert_eq!(find_conflicts(&candidate, &existing, None), vec![1, 3]);
        assert_eq!(find_conflicts(&candidate, &existing, Some(1)), vec![3]);
    }

    #[test]
    fn window_validation_against_opening_hours() {
        assert!(validate_window(day(), at(9, 0), 1.0, 9, 18).is_ok());
        assert!(validate_window(day(), at(17, 0), 1.0, 9, 18).is_ok());
        assert!(validate_window(day(), at(8, 59), 1.0, 9, 18).is_err());
        assert!(validate_window(day(), at(17, 30), 1.0, 9, 18).is_err());
        assert!(validate_window(day(), at(18, 0), 0.5, 9, 18).is_err());
        assert!(validate_window(day(), at(10, 0), 0.0, 9, 18).is_err());
        assert!(validate_window(day(), at(10, 0), -1.0, 9, 18).is_err());
        assert!(validate_window(day(), at(10, 0), f64::NAN, 9, 18).is_err());
    }

    #[test]
    fn midnight_close_is_supported() {
        let slots = day_slots(day(), 22, 24, &[]);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, at(0, 0));
        assert!(validate_window(day(), at(23, 0), 1.0, 9, 24).is_ok());
    }

    #[test]
    fn elapsed_when_end_time_reached() {
        let b = booking(1, at(9, 0), 1.5, BookingStatus::Approved);
        assert!(!is_elapsed(&b, day().and_time(at(10, 29))));
        assert!(is_elapsed(&b, day().and_time(at(10, 30))));
        assert!(is_elapsed(&b, day().succ_opt().unwrap().and_time(at(0, 0))));
    }

    #[test]
    fn parses_wire_formats() {
        assert_eq!(parse_date("2025-03-14").unwrap(), day());
        assert_eq!(parse_time("09:05").unwrap(), at(9, 5));
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_time("9am").is_err());
    }

    #[test]
    fn extreme_dates_are_refused_without_panicking() {
        assert!(parse_date("+262142-12-31").is_err());
        assert!(parse_date("10000-01-01").is_err());
        assert!(parse_date("9999-12-31").is_ok());

        let last = NaiveDate::MAX;
        assert!(validate_window(last, at(9, 0), 24.0, 0, 24).is_err());
        assert!(validate_window(last, at(23, 0), 1.0, 9, 24).is_err());
        assert_eq!(Window::new(last, at(9, 0), 24.0).end, NaiveDateTime::MAX);

        let slots = day_slots(last, 22, 24, &[]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, at(22, 0));
    }
}
