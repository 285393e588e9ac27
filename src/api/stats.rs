//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of bookings, all statuses
    pub total_bookings: i64,
    /// Bookings by status
    pub bookings_by_status: Vec<StatEntry>,
    /// Number of instruments
    pub total_equipment: i64,
    /// Instruments by status
    pub equipment_by_status: Vec<StatEntry>,
    /// Hours of non-rejected bookings, all instruments
    pub total_booked_hours: f64,
    /// Hours of non-rejected bookings per instrument
    pub hours_by_equipment: Vec<EquipmentHours>,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

#[derive(Serialize, ToSchema)]
pub struct EquipmentHours {
    pub equipment_id: i32,
    pub name: String,
    pub hours: f64,
}

/// Get booking statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
