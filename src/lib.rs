//! Labslot - University Equipment Booking Server
//!
//! REST JSON API for booking shared lab instruments: users request hourly
//! slots, equipment admins approve or reject them, and a super-admin manages
//! the inventory and who administers which instrument.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
