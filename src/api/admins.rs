//! Equipment admin assignment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::admin::{Admin, CreateAdmin, UpdateAdmin},
    AppState,
};

use super::AuthenticatedUser;

/// List admins and their instruments
#[utoipa::path(
    get,
    path = "/admins",
    tag = "admins",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admins", body = Vec<Admin>),
        (status = 403, description = "Super-admin privileges required")
    )
)]
pub async fn list_admins(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Admin>>> {
    claims.require_super_admin()?;

    let admins = state.services.admins.list().await?;
    Ok(Json(admins))
}

/// Assign a user as admin of some instruments
#[utoipa::path(
    post,
    path = "/admins",
    tag = "admins",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = CreateAdmin,
    responses(
        (status = 201, description = "Admin assigned", body = Admin),
        (status = 400, description = "Unknown equipment id"),
        (status = 404, description = "No user with this email"),
        (status = 409, description = "Already an admin, or an instrument already has two admins")
    )
)]
pub async fn create_admin(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAdmin>,
) -> AppResult<(StatusCode, Json<Admin>)> {
    claims.require_super_admin()?;

    let admin = state.services.admins.create(data).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// The caller's own assignment
#[utoipa::path(
    get,
    path = "/admins/me",
    tag = "admins",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own assignment", body = Admin),
        (status = 404, description = "Caller administers no equipment")
    )
)]
pub async fn my_assignment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Admin>> {
    claims.require_admin()?;

    state
        .services
        .admins
        .get_by_email(claims.email())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No equipment assigned".to_string()))
}

/// Replace the instruments of an admin
#[utoipa::path(
    put,
    path = "/admins/{id}",
    tag = "admins",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Admin ID")
    ),
    request_body = UpdateAdmin,
    responses(
        (status = 200, description = "Assignment updated", body = Admin),
        (status = 400, description = "Unknown equipment id"),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "An instrument already has two admins")
    )
)]
pub async fn update_admin(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAdmin>,
) -> AppResult<Json<Admin>> {
    claims.require_super_admin()?;

    let admin = state.services.admins.update(id, &data.assigned_instruments).await?;
    Ok(Json(admin))
}

/// Remove an admin assignment
#[utoipa::path(
    delete,
    path = "/admins/{id}",
    tag = "admins",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Admin ID")
    ),
    responses(
        (status = 204, description = "Admin removed"),
        (status = 404, description = "Admin not found")
    )
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_super_admin()?;

    state.services.admins.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
