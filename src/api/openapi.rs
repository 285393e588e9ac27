//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admins, auth, bookings, equipment, health, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labslot API",
        version = "1.0.0",
        description = "University equipment booking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::verify,
        auth::resend,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        auth::upload_photo,
        // Users
        users::list_users,
        users::get_user,
        users::update_role,
        users::delete_user,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::get_slots,
        // Bookings
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::update_status,
        bookings::delete_booking,
        bookings::complete_elapsed,
        // Admins
        admins::list_admins,
        admins::create_admin,
        admins::my_assignment,
        admins::update_admin,
        admins::delete_admin,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::UserRole,
            crate::models::enums::EquipmentStatus,
            crate::models::enums::BookingStatus,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::MessageResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::VerifyRequest,
            crate::models::user::ResendRequest,
            // Users
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateRole,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingDetails,
            crate::models::booking::CreateBooking,
            crate::models::booking::CreateBookingResponse,
            crate::models::booking::UpdateBookingStatus,
            crate::models::booking::DaySlot,
            crate::models::booking::EquipmentDay,
            crate::models::booking::SweepReport,
            // Admins
            crate::models::admin::Admin,
            crate::models::admin::CreateAdmin,
            crate::models::admin::UpdateAdmin,
            // Stats
            stats::StatsResponse,
            stats::StatEntry,
            stats::EquipmentHours,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and own profile"),
        (name = "users", description = "User management"),
        (name = "equipment", description = "Equipment inventory and availability"),
        (name = "bookings", description = "Booking requests and approval"),
        (name = "admins", description = "Equipment admin assignments"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("labslot_token"))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_booking_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/bookings"));
        assert!(doc.paths.paths.contains_key("/bookings/{id}/status"));
        assert!(doc.paths.paths.contains_key("/equipment/{id}/slots"));
    }
}
