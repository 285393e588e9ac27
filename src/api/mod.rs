//! API handlers for Labslot REST endpoints

pub mod admins;
pub mod auth;
pub mod bookings;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, patch, post, put},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{config::AuthConfig, error::AppError, models::user::UserClaims, services::uploads, AppState};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Page content
    pub items: Vec<T>,
    /// Total number of matching rows
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Extractor for the authenticated user, from the session cookie or a Bearer token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get(&auth.cookie_name) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => {
                let header = parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| AppError::Authentication("Not logged in".to_string()))?;
                header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| {
                        AppError::Authentication("Invalid authorization header format".to_string())
                    })?
                    .to_string()
            }
        };

        let claims = UserClaims::from_token(&token, &auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Put the session token in an HTTP-only cookie
pub fn set_session_cookie(jar: CookieJar, config: &AuthConfig, token: String) -> CookieJar {
    let cookie = Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .max_age(time::Duration::hours(config.jwt_expiration_hours as i64))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Expire the session cookie
pub fn clear_session_cookie(jar: CookieJar, config: &AuthConfig) -> CookieJar {
    let cookie = Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart overhead on top of the largest accepted file
    let body_limit = state.config.uploads.max_bytes + 64 * 1024;
    let uploads_dir = state.config.uploads.directory.clone();

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication and own profile
        .route("/auth/register", post(auth::register))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/resend", post(auth::resend))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/profile/photo", post(auth::upload_photo))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/role", put(users::update_role))
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipment/:id/slots", get(equipment::get_slots))
        // Bookings
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/mine", get(bookings::list_my_bookings))
        .route("/bookings/complete-elapsed", post(bookings::complete_elapsed))
        .route("/bookings/:id", get(bookings::get_booking).delete(bookings::delete_booking))
        .route("/bookings/:id/status", patch(bookings::update_status))
        // Admins
        .route("/admins", get(admins::list_admins).post(admins::create_admin))
        .route("/admins/me", get(admins::my_assignment))
        .route("/admins/:id", put(admins::update_admin).delete(admins::delete_admin))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .nest_service(uploads::PUBLIC_PREFIX, ServeDir::new(uploads_dir))
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
