//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::EquipmentStatus;

/// Lab instrument record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub department: String,
    pub category: String,
    /// Building / room
    pub location: String,
    /// Contact person or email
    pub contact: Option<String>,
    pub status: EquipmentStatus,
    pub image_url: Option<String>,
    /// Hours of completed bookings
    pub total_hours: f64,
    pub maintenance_hours: f64,
    /// Usage share, e.g. "97.5%"
    pub uptime: String,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub contact: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub image_url: Option<String>,
    #[validate(range(min = 0.0, message = "Maintenance hours cannot be negative"))]
    pub maintenance_hours: Option<f64>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub image_url: Option<String>,
    #[validate(range(min = 0.0, message = "Maintenance hours cannot be negative"))]
    pub maintenance_hours: Option<f64>,
}

/// Equipment list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub department: Option<String>,
    pub category: Option<String>,
    pub status: Option<EquipmentStatus>,
}

/// Share of booked hours over booked + maintenance hours, formatted as "97.5%".
/// An instrument that has never been used nor serviced reports "100.0%".
pub fn format_uptime(total_hours: f64, maintenance_hours: f64) -> String {
    let span = total_hours + maintenance_hours;
    if span <= 0.0 {
        return "100.0%".to_string();
    }
    format!("{:.1}%", total_hours / span * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(0.0, 0.0), "100.0%");
        assert_eq!(format_uptime(39.0, 1.0), "97.5%");
        assert_eq!(format_uptime(0.0, 5.0), "0.0%");
        assert_eq!(format_uptime(2.0, 1.0), "66.7%");
    }
}
