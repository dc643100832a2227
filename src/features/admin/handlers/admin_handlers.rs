use std::sync::Arc;

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List all users with their collection counts
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let users = service.list_users().await?;
    let total = users.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta { total }),
    )))
}

/// List all collections with file counts and owners
#[utoipa::path(
    get,
    path = "/api/admin/collections",
    responses(
        (status = 200, description = "List of collections", body = ApiResponse<Vec<AdminCollectionDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_collections(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<AdminCollectionDto>>>> {
    let collections = service.list_collections().await?;
    let total = collections.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(collections),
        None,
        Some(Meta { total }),
    )))
}

/// Delete a user with their sessions, collections and files
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_user(admin.user_id, id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted successfully".to_string()),
        None,
    )))
}

/// Suspend or reinstate a user
///
/// Suspending revokes every session of the user.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/suspension",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetSuspensionDto,
    responses(
        (status = 200, description = "Suspension updated", body = ApiResponse<UserStatusDto>),
        (status = 400, description = "Cannot suspend your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_user_suspension(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<SetSuspensionDto>,
) -> Result<Json<ApiResponse<UserStatusDto>>> {
    let status = service
        .set_user_suspended(admin.user_id, id, dto.suspended)
        .await?;

    Ok(Json(ApiResponse::success(Some(status), None, None)))
}
