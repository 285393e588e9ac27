//! Equipment admin assignment model

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Maximum number of admins that can be assigned to one instrument
pub const MAX_ADMINS_PER_EQUIPMENT: usize = 2;

/// An admin and the instruments they are responsible for
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: i32,
    /// Email of the administering user
    pub email: String,
    /// Equipment ids
    pub assigned_instruments: Vec<i32>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Admin {
    pub fn manages(&self, equipment_id: i32) -> bool {
        self.assigned_instruments.contains(&equipment_id)
    }
}

/// Instruments among `requested` that already have the maximum number of
/// admins, not counting the admin being edited
pub fn over_capacity(requested: &[i32], admins: &[Admin], editing: Option<i32>) -> Vec<i32> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for admin in admins.iter().filter(|a| Some(a.id) != editing) {
        for id in &admin.assigned_instruments {
            *counts.entry(*id).or_default() += 1;
        }
    }
    requested
        .iter()
        .copied()
        .filter(|id| counts.get(id).copied().unwrap_or(0) >= MAX_ADMINS_PER_EQUIPMENT)
        .collect()
}

/// Assign a user as admin of a set of instruments
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdmin {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub assigned_instruments: Vec<i32>,
}

/// Replace an admin's instrument list
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAdmin {
    pub assigned_instruments: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(id: i32, instruments: &[i32]) -> Admin {
        Admin {
            id,
            email: format!("admin{}@university.edu", id),
            assigned_instruments: instruments.to_vec(),
            crea_date: Utc::now(),
            modif_date: None,
        }
    }

    #[test]
    fn third_admin_is_refused() {
        let admins = [admin(1, &[10, 11]), admin(2, &[10])];
        assert_eq!(over_capacity(&[10, 11, 12], &admins, None), vec![10]);
    }

    #[test]
    fn editing_admin_does_not_count_against_itself() {
        let admins = [admin(1, &[10]), admin(2, &[10])];
        assert!(over_capacity(&[10], &admins, Some(2)).is_empty());
        assert_eq!(over_capacity(&[10], &admins, Some(3)), vec![10]);
    }

    #[test]
    fn manages_only_assigned_instruments() {
        let admin = admin(1, &[4, 9]);
        assert!(admin.manages(9));
        assert!(!admin.manages(5));
    }
}
