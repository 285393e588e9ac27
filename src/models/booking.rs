//! Booking model and slot availability types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BookingStatus;

/// Serde adapter for "HH:mm" times
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Booking of one instrument for a time window on a given day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub user_email: String,
    pub equipment_id: i32,
    /// Day of the booking (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Start time (HH:mm)
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    /// Length in hours, may be fractional
    pub duration: f64,
    pub supervisor: Option<String>,
    pub department: Option<String>,
    pub purpose: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Booking joined with its equipment name, for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookingDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub equipment_name: String,
}

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    pub equipment_id: i32,
    /// Day (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:mm)
    pub start_time: String,
    /// Hours, fractional allowed (e.g. 1.5)
    #[validate(range(exclusive_min = 0.0, max = 24.0, message = "Duration must be between 0 and 24 hours"))]
    pub duration: f64,
    pub supervisor: Option<String>,
    pub department: Option<String>,
    #[validate(length(max = 2000, message = "Purpose is too long"))]
    pub purpose: Option<String>,
}

/// Response to a booking request: the created booking and any overlapping bookings found
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateBookingResponse {
    pub booking: Booking,
    /// Ids of non-rejected bookings on the same instrument overlapping this one
    pub conflicts: Vec<i32>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Booking list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub equipment_id: Option<i32>,
    /// Day (YYYY-MM-DD)
    pub date: Option<String>,
}

/// Query for slot availability
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SlotQuery {
    /// Day (YYYY-MM-DD)
    pub date: String,
}

/// One hourly slot of an instrument's day
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DaySlot {
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub end: NaiveTime,
    pub available: bool,
    /// Bookings occupying (part of) this slot
    pub booking_ids: Vec<i32>,
}

/// Slot availability of an instrument for one day
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentDay {
    pub equipment_id: i32,
    pub date: NaiveDate,
    pub slots: Vec<DaySlot>,
}

/// Result of a completion sweep
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepReport {
    /// Number of approved bookings moved to completed
    pub completed: u64,
}
