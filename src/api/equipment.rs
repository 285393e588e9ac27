//! Equipment inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        booking::{EquipmentDay, SlotQuery},
        equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
    },
    AppState,
};

use super::AuthenticatedUser;

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list(&query).await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(Json(equipment))
}

/// Add an instrument to the inventory
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Super-admin privileges required")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    claims.require_super_admin()?;

    let created = state.services.equipment.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an instrument
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 403, description = "Super-admin privileges required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    claims.require_super_admin()?;

    let updated = state.services.equipment.update(id, &data).await?;
    Ok(Json(updated))
}

/// Remove an instrument and its bookings
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 403, description = "Super-admin privileges required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_super_admin()?;

    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hourly availability of an instrument for one day
#[utoipa::path(
    get,
    path = "/equipment/{id}/slots",
    tag = "equipment",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID"),
        SlotQuery
    ),
    responses(
        (status = 200, description = "Slots of the day", body = EquipmentDay),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_slots(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<EquipmentDay>> {
    let day = state.services.bookings.day_slots(id, &query.date).await?;
    Ok(Json(day))
}
