use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AuthUserDto, LoginRequestDto, LogoutAllResponseDto, RegisterAdminRequestDto,
    RegisterRequestDto, SessionResponseDto, TokenRequestDto, UpgradeUserRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::UserRole;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

/// Register a new student account
#[utoipa::path(
    post,
    path = "/api/auth/register-user",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = SessionResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<SessionResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service
        .register(&dto.email, &dto.password, UserRole::Student)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Register an admin account with the admin registration secret
#[utoipa::path(
    post,
    path = "/api/auth/register-admin",
    request_body = RegisterAdminRequestDto,
    responses(
        (status = 201, description = "Admin registered successfully", body = SessionResponseDto),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Invalid admin registration secret"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_admin(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterAdminRequestDto>,
) -> Result<(StatusCode, Json<SessionResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service
        .register_admin(&dto.email, &dto.password, &dto.admin_secret)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login-user",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = SessionResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account suspended")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<SessionResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.login(&dto.email, &dto.password).await?;
    Ok(Json(session))
}

/// Revoke the given session token
#[utoipa::path(
    post,
    path = "/api/auth/logout-one-device",
    request_body = TokenRequestDto,
    responses(
        (status = 200, description = "Token revoked"),
        (status = 400, description = "Token is required"),
        (status = 404, description = "Token not found")
    ),
    tag = "auth"
)]
pub async fn logout_one_device(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<TokenRequestDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.logout(&dto.token).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Token revoked".to_string()),
        None,
    )))
}

/// Revoke every active session of the token's owner
#[utoipa::path(
    post,
    path = "/api/auth/logout-all-devices",
    request_body = TokenRequestDto,
    responses(
        (status = 200, description = "All sessions revoked", body = ApiResponse<LogoutAllResponseDto>),
        (status = 400, description = "Token is required"),
        (status = 404, description = "Token not found")
    ),
    tag = "auth"
)]
pub async fn logout_all_devices(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<TokenRequestDto>,
) -> Result<Json<ApiResponse<LogoutAllResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.logout_all(&dto.token).await?;
    let message = format!("All tokens revoked ({} sessions)", result.revoked_sessions);
    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

/// Promote a user to admin; the caller's token must belong to an admin
#[utoipa::path(
    post,
    path = "/api/auth/upgrade-user-to-admin",
    request_body = UpgradeUserRequestDto,
    responses(
        (status = 200, description = "User upgraded", body = ApiResponse<AuthUserDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn upgrade_user_to_admin(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<UpgradeUserRequestDto>,
) -> Result<Json<ApiResponse<AuthUserDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service
        .upgrade_user_to_admin(&dto.target_user_email, &dto.admin_token)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User upgraded to admin".to_string()),
        None,
    )))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<AuthUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<AuthUserDto>>> {
    Ok(Json(ApiResponse::success(Some(service.me(user)), None, None)))
}
