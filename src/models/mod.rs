//! Data models for Labslot

pub mod admin;
pub mod booking;
pub mod enums;
pub mod equipment;
pub mod user;
pub mod verification;

// Re-export commonly used types
pub use admin::Admin;
pub use booking::{Booking, BookingDetails, DaySlot};
pub use enums::{BookingStatus, EquipmentStatus, UserRole};
pub use equipment::Equipment;
pub use user::{User, UserClaims};
pub use verification::VerificationCode;
