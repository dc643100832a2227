use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::collections::{dtos as collections_dtos, handlers as collections_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::register_admin,
        auth::handlers::login,
        auth::handlers::logout_one_device,
        auth::handlers::logout_all_devices,
        auth::handlers::upgrade_user_to_admin,
        auth::handlers::get_me,
        // Collections
        collections_handlers::list_collections,
        collections_handlers::get_collection,
        collections_handlers::get_collection_files,
        collections_handlers::rename_collection,
        collections_handlers::delete_collection,
        collections_handlers::delete_file,
        // Files
        files_handlers::upload_multiple,
        files_handlers::download_file,
        files_handlers::download_collection_zip,
        // Admin
        admin_handlers::list_users,
        admin_handlers::list_collections,
        admin_handlers::delete_user,
        admin_handlers::set_user_suspension,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::models::UserRole,
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::RegisterAdminRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::TokenRequestDto,
            auth::dtos::UpgradeUserRequestDto,
            auth::dtos::SessionResponseDto,
            auth::dtos::LogoutAllResponseDto,
            auth::dtos::AuthUserDto,
            ApiResponse<auth::dtos::AuthUserDto>,
            ApiResponse<auth::dtos::LogoutAllResponseDto>,
            // Collections
            collections_dtos::CollectionResponseDto,
            collections_dtos::CollectionDetailDto,
            collections_dtos::CollectionDto,
            collections_dtos::FileResponseDto,
            collections_dtos::RenameCollectionDto,
            ApiResponse<Vec<collections_dtos::CollectionResponseDto>>,
            ApiResponse<collections_dtos::CollectionDetailDto>,
            ApiResponse<collections_dtos::CollectionDto>,
            ApiResponse<Vec<collections_dtos::FileResponseDto>>,
            // Files
            files_dtos::UploadFilesDto,
            files_dtos::UploadResultDto,
            files_dtos::UploadedFileDto,
            ApiResponse<files_dtos::UploadResultDto>,
            // Admin
            admin_dtos::AdminUserDto,
            admin_dtos::AdminCollectionDto,
            admin_dtos::SetSuspensionDto,
            admin_dtos::UserStatusDto,
            ApiResponse<Vec<admin_dtos::AdminUserDto>>,
            ApiResponse<Vec<admin_dtos::AdminCollectionDto>>,
            ApiResponse<admin_dtos::UserStatusDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session management"),
        (name = "collections", description = "Browsing and maintaining collections"),
        (name = "files", description = "File upload and download"),
        (name = "admin", description = "Admin endpoints (Admin role only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "School File Collection API",
        version = "0.1.0",
        description = "API documentation for the school file collection service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
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
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
