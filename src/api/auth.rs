//! Authentication endpoints: registration with email code, login, session and own profile

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{cookie::CookieJar, Multipart};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterRequest, ResendRequest, UpdateProfile, User, VerifyRequest},
    AppState,
};

use super::{clear_session_cookie, set_session_cookie, AuthenticatedUser};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Institutional email
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT, also set as the session cookie
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: User,
}

/// Plain acknowledgement
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Start a registration and email a verification code
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 202, description = "Verification code sent", body = MessageResponse),
        (status = 400, description = "Invalid input or email domain"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.auth.register(request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Verification code sent".to_string(),
        }),
    ))
}

/// Confirm a registration with the emailed code
#[utoipa::path(
    post,
    path = "/auth/verify",
    tag = "auth",
    request_body = VerifyRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid, expired or exhausted code")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.auth.verify(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Send a new code for a pending registration
#[utoipa::path(
    post,
    path = "/auth/resend",
    tag = "auth",
    request_body = ResendRequest,
    responses(
        (status = 202, description = "Verification code sent", body = MessageResponse),
        (status = 404, description = "No pending registration")
    )
)]
pub async fn resend(
    State(state): State<AppState>,
    Json(request): Json<ResendRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.auth.resend_code(&request.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Verification code sent".to_string(),
        }),
    ))
}

/// Authenticate and open a session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (token, user) = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    let auth = &state.config.auth;
    let jar = set_session_cookie(jar, auth, token.clone());

    Ok((
        jar,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: auth.jwt_expiration_hours * 3600,
            user,
        }),
    ))
}

/// Close the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session cookie cleared")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, clear_session_cookie(jar, &state.config.auth))
}

/// Current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

/// Update own profile (name, department, supervisor, password)
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated or wrong current password")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(profile): Json<UpdateProfile>,
) -> AppResult<Json<User>> {
    let updated = state.services.users.update_profile(claims.user_id, profile).await?;
    Ok(Json(updated))
}

/// Upload a profile photo (multipart field `photo`)
#[utoipa::path(
    post,
    path = "/auth/profile/photo",
    tag = "auth",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored", body = User),
        (status = 400, description = "Missing file, unsupported type or too large")
    )
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<User>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if !matches!(field.name(), Some("photo") | Some("file")) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Cannot read upload: {}", e)))?;

        let path = state
            .services
            .uploads
            .save_profile_photo(content_type.as_deref(), &data)
            .await?;
        let user = state.services.users.set_photo(claims.user_id, &path).await?;
        return Ok(Json(user));
    }

    Err(AppError::BadRequest("Missing 'photo' file field".to_string()))
}
