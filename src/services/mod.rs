//! Business logic services

pub mod admins;
pub mod auth;
pub mod bookings;
pub mod email;
pub mod equipment;
pub mod scheduling;
pub mod stats;
pub mod sweeper;
pub mod uploads;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub bookings: bookings::BookingsService,
    pub admins: admins::AdminsService,
    pub uploads: uploads::UploadsService,
    pub stats: stats::StatsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let email = email::EmailService::new(config.email.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), email.clone()),
            users: users::UsersService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            bookings: bookings::BookingsService::new(
                repository.clone(),
                config.bookings.clone(),
                email,
            ),
            admins: admins::AdminsService::new(repository.clone()),
            uploads: uploads::UploadsService::new(config.uploads.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
