//! Booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::booking::{
        Booking, BookingDetails, BookingQuery, CreateBooking, CreateBookingResponse, SweepReport,
        UpdateBookingStatus,
    },
    services::bookings::local_now,
    AppState,
};

use super::AuthenticatedUser;

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created as pending, with overlapping bookings", body = CreateBookingResponse),
        (status = 400, description = "Invalid date, time or duration"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Slot already taken (when conflicts are rejected)"),
        (status = 422, description = "Equipment under maintenance")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<CreateBookingResponse>)> {
    let created = state.services.bookings.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Own bookings, newest first
#[utoipa::path(
    get,
    path = "/bookings/mine",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "Own bookings", body = Vec<BookingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let bookings = state.services.bookings.list_mine(&claims, &query).await?;
    Ok(Json(bookings))
}

/// Bookings of the equipment the caller administers (all of them for the super-admin)
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings", body = Vec<BookingDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let bookings = state.services.bookings.list(&claims, &query).await?;
    Ok(Json(bookings))
}

/// Get a booking
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking", body = BookingDetails),
        (status = 403, description = "Not the owner nor an admin of the equipment"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get(&claims, id).await?;
    Ok(Json(booking))
}

/// Approve, reject or complete a booking
#[utoipa::path(
    patch,
    path = "/bookings/{id}/status",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    request_body = UpdateBookingStatus,
    responses(
        (status = 200, description = "Status changed", body = Booking),
        (status = 403, description = "Not an admin of this equipment"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking changed concurrently"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBookingStatus>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings
        .update_status(&claims, id, request.status)
        .await?;
    Ok(Json(booking))
}

/// Cancel a booking
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Booking is no longer pending")
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.bookings.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every elapsed approved booking as completed
#[utoipa::path(
    post,
    path = "/bookings/complete-elapsed",
    tag = "bookings",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep done", body = SweepReport),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn complete_elapsed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepReport>> {
    claims.require_admin()?;

    let completed = state.services.bookings.complete_elapsed(local_now()).await?;
    Ok(Json(SweepReport { completed }))
}
