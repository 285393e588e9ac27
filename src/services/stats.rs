//! Statistics service

use crate::{
    api::stats::{EquipmentHours, StatEntry, StatsResponse},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Booking and equipment counters for the admin dashboard
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let bookings_by_status = to_entries(self.repository.bookings_count_by_status().await?);
        let equipment_by_status = to_entries(self.repository.equipment_count_by_status().await?);

        let hours_by_equipment: Vec<EquipmentHours> = self
            .repository
            .bookings_hours_per_equipment()
            .await?
            .into_iter()
            .map(|(equipment_id, name, hours)| EquipmentHours { equipment_id, name, hours })
            .collect();

        Ok(StatsResponse {
            total_bookings: bookings_by_status.iter().map(|e| e.value).sum(),
            total_equipment: equipment_by_status.iter().map(|e| e.value).sum(),
            total_booked_hours: hours_by_equipment.iter().map(|e| e.hours).sum(),
            bookings_by_status,
            equipment_by_status,
            hours_by_equipment,
        })
    }
}

fn to_entries(rows: Vec<(String, i64)>) -> Vec<StatEntry> {
    rows.into_iter()
        .map(|(label, value)| StatEntry { label, value })
        .collect()
}
