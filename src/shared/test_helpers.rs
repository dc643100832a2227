//! In-memory stand-ins for PostgreSQL and the object store, plus an
//! `axum-test` server wired like the real application.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

use crate::core::config::{AuthConfig, DownloadAccess};
use crate::core::error::{AppError, Result};
use crate::core::router::{api_router, AppServices};
use crate::features::admin::models::{AdminCollectionRow, AdminUserRow};
use crate::features::admin::{AdminRepository, AdminService};
use crate::features::auth::models::{SessionToken, User, UserRole};
use crate::features::auth::{AuthRepository, AuthService};
use crate::features::collections::models::{
    Collection, CollectionWithCount, FileMetadata, NewFileMetadata,
};
use crate::features::collections::{CollectionRepository, CollectionService};
use crate::features::files::FileService;
use crate::modules::storage::{LocalStorage, ObjectStore, StorageBackend, StorageService};

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_ADMIN_SECRET: &str = "let-me-in";
pub const TEST_PASSWORD: &str = "secret123";

pub fn fake_email() -> String {
    SafeEmail().fake()
}

// =============================================================================
// IN-MEMORY DATABASE
// =============================================================================

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<SessionToken>,
    collections: Vec<Collection>,
    files: Vec<FileMetadata>,
}

impl Tables {
    fn delete_collection(&mut self, id: Uuid) -> bool {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != id);
        self.files.retain(|f| f.collection_id != id);
        self.collections.len() < before
    }
}

/// Repository implementation over plain vectors, with the same cascades as the schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Insert a Student directly, bypassing password hashing
    pub async fn add_user(&self, email: &str) -> Uuid {
        self.create_user(email, "unused-hash", UserRole::Student)
            .await
            .unwrap()
            .id
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl AuthRepository for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str, role: UserRole) -> Result<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            suspended: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn set_role_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>> {
        let mut tables = self.tables();
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .map(|u| {
                u.role = role;
                u.updated_at = Utc::now();
                u.clone()
            }))
    }

    async fn insert_token(&self, user_id: Uuid, token: &str) -> Result<SessionToken> {
        let row = SessionToken {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        };
        self.tables().tokens.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_active_token(&self, token: &str) -> Result<Option<User>> {
        let tables = self.tables();
        let user_id = tables
            .tokens
            .iter()
            .find(|t| t.token == token && t.revoked_at.is_none())
            .map(|t| t.user_id);

        Ok(user_id.and_then(|id| tables.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn revoke_token(&self, token: &str) -> Result<bool> {
        let mut tables = self.tables();
        match tables
            .tokens
            .iter_mut()
            .find(|t| t.token == token && t.revoked_at.is_none())
        {
            Some(row) => {
                row.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_tokens(&self, user_id: Uuid) -> Result<u64> {
        let mut tables = self.tables();
        let now = Utc::now();
        let mut revoked = 0;
        for row in tables
            .tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && t.revoked_at.is_none())
        {
            row.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl CollectionRepository for MemoryStore {
    async fn get_or_create(&self, user_id: Uuid, name: &str) -> Result<Collection> {
        let mut tables = self.tables();
        let now = Utc::now();

        if let Some(existing) = tables
            .collections
            .iter_mut()
            .find(|c| c.user_id == user_id && c.collection_name == name)
        {
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let collection = Collection {
            id: Uuid::new_v4(),
            user_id,
            collection_name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.collections.push(collection.clone());
        Ok(collection)
    }

    async fn list_with_counts(&self) -> Result<Vec<CollectionWithCount>> {
        let tables = self.tables();
        let mut collections: Vec<CollectionWithCount> = tables
            .collections
            .iter()
            .map(|c| CollectionWithCount {
                id: c.id,
                user_id: c.user_id,
                collection_name: c.collection_name.clone(),
                created_at: c.created_at,
                updated_at: c.updated_at,
                file_count: tables.files.iter().filter(|f| f.collection_id == c.id).count()
                    as i64,
            })
            .collect();
        collections.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(collections)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Collection>> {
        Ok(self.tables().collections.iter().find(|c| c.id == id).cloned())
    }

    async fn list_files(&self, collection_id: Uuid) -> Result<Vec<FileMetadata>> {
        let mut files: Vec<FileMetadata> = self
            .tables()
            .files
            .iter()
            .filter(|f| f.collection_id == collection_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(files)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Collection>> {
        let mut tables = self.tables();
        let Some(owner) = tables
            .collections
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.user_id)
        else {
            return Ok(None);
        };

        if tables
            .collections
            .iter()
            .any(|c| c.id != id && c.user_id == owner && c.collection_name == name)
        {
            return Err(AppError::Conflict(
                "A collection with this name already exists".to_string(),
            ));
        }

        Ok(tables
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.collection_name = name.to_string();
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables().delete_collection(id))
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileMetadata>> {
        Ok(self.tables().files.iter().find(|f| f.id == id).cloned())
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables();
        let before = tables.files.len();
        tables.files.retain(|f| f.id != id);
        Ok(tables.files.len() < before)
    }

    async fn insert_files(
        &self,
        collection_id: Uuid,
        files: &[NewFileMetadata],
    ) -> Result<Vec<FileMetadata>> {
        let mut tables = self.tables();
        let now = Utc::now();

        let inserted: Vec<FileMetadata> = files
            .iter()
            .map(|f| FileMetadata {
                id: Uuid::new_v4(),
                collection_id,
                file_name: f.file_name.clone(),
                original_name: f.original_name.clone(),
                file_path: f.file_path.clone(),
                file_size: f.file_size,
                mime_type: f.mime_type.clone(),
                uploaded_at: now,
            })
            .collect();
        tables.files.extend(inserted.iter().cloned());

        if let Some(collection) = tables.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.updated_at = now;
        }
        Ok(inserted)
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn list_users_with_counts(&self) -> Result<Vec<AdminUserRow>> {
        let tables = self.tables();
        let mut users: Vec<AdminUserRow> = tables
            .users
            .iter()
            .map(|u| AdminUserRow {
                id: u.id,
                email: u.email.clone(),
                role: u.role,
                suspended: u.suspended,
                created_at: u.created_at,
                collections_count: tables
                    .collections
                    .iter()
                    .filter(|c| c.user_id == u.id)
                    .count() as i64,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn list_collections_with_owner(&self) -> Result<Vec<AdminCollectionRow>> {
        let tables = self.tables();
        let mut collections: Vec<AdminCollectionRow> = tables
            .collections
            .iter()
            .filter_map(|c| {
                let owner = tables.users.iter().find(|u| u.id == c.user_id)?;
                Some(AdminCollectionRow {
                    id: c.id,
                    user_id: c.user_id,
                    owner_email: owner.email.clone(),
                    collection_name: c.collection_name.clone(),
                    file_count: tables.files.iter().filter(|f| f.collection_id == c.id).count()
                        as i64,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
            })
            .collect();
        collections.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(collections)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_file_locations(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tables = self.tables();
        let owned: HashSet<Uuid> = tables
            .collections
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();

        Ok(tables
            .files
            .iter()
            .filter(|f| owned.contains(&f.collection_id))
            .map(|f| f.file_path.clone())
            .collect())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        tables.tokens.retain(|t| t.user_id != id);
        let owned: Vec<Uuid> = tables
            .collections
            .iter()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        for collection_id in owned {
            tables.delete_collection(collection_id);
        }
        Ok(true)
    }

    async fn set_suspended(&self, id: Uuid, suspended: bool) -> Result<Option<User>> {
        let mut tables = self.tables();
        let now = Utc::now();

        let user = tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.suspended = suspended;
            u.updated_at = now;
            u.clone()
        });

        if user.is_some() && suspended {
            for row in tables
                .tokens
                .iter_mut()
                .filter(|t| t.user_id == id && t.revoked_at.is_none())
            {
                row.revoked_at = Some(now);
            }
        }
        Ok(user)
    }
}

// =============================================================================
// IN-MEMORY OBJECT STORE
// =============================================================================

const OBJECT_BASE_URL: &str = "http://objects.test";

/// Object store keeping objects in a map keyed by URL
///
/// Reads of chosen URLs and puts past a quota can be made to fail.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing_reads: Mutex<HashSet<String>>,
    put_quota: Mutex<Option<usize>>,
}

impl MemoryObjectStore {
    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    /// Make every read of `url` fail
    pub fn fail_reads_of(&self, url: &str) {
        self.failing_reads.lock().unwrap().insert(url.to_string());
    }

    /// Let `successful` more puts succeed, then fail every put
    pub fn fail_puts_after(&self, successful: usize) {
        *self.put_quota.lock().unwrap() = Some(successful);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        {
            let mut quota = self.put_quota.lock().unwrap();
            match quota.as_mut() {
                Some(0) => return Err(AppError::Storage("Upload failed".to_string())),
                Some(remaining) => *remaining -= 1,
                None => {}
            }
        }

        let url = format!("{}/{}", OBJECT_BASE_URL, key);
        self.objects.lock().unwrap().insert(url.clone(), data);
        Ok(url)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        if self.failing_reads.lock().unwrap().contains(url) {
            return Err(AppError::Storage(format!("Failed to fetch {}", url)));
        }
        self.objects
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::NotFound("File not found in storage".to_string()))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(url);
        Ok(())
    }

    async fn access_url(&self, url: &str) -> Result<String> {
        Ok(format!("{}?signature=test", url))
    }

    fn upload_prefix(&self) -> &str {
        "uploads"
    }
}

// =============================================================================
// SERVICE BUILDERS
// =============================================================================

pub fn auth_service(store: Arc<MemoryStore>) -> AuthService {
    let config = AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_registration_secret: Some(TEST_ADMIN_SECRET.to_string()),
    };
    AuthService::new(store, &config)
}

pub fn local_storage(path: &Path) -> Arc<StorageService> {
    Arc::new(
        StorageService::new(StorageBackend::Local, LocalStorage::new(path), None).unwrap(),
    )
}

pub fn remote_storage(objects: Arc<MemoryObjectStore>) -> Arc<StorageService> {
    Arc::new(
        StorageService::new(
            StorageBackend::Remote,
            LocalStorage::new("./unused"),
            Some(objects),
        )
        .unwrap(),
    )
}

/// Full API router over in-memory state, served by `axum-test`
pub struct TestContext {
    pub server: TestServer,
    _upload_dir: TempDir,
}

impl TestContext {
    /// Local disk storage in a temporary directory, public downloads
    pub fn local() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let storage = local_storage(upload_dir.path());
        let auth = Arc::new(auth_service(store.clone()));

        let services = AppServices {
            auth: Arc::clone(&auth),
            collections: Arc::new(CollectionService::new(store.clone(), storage.clone())),
            files: Arc::new(FileService::new(
                store.clone(),
                storage.clone(),
                auth,
                DownloadAccess::Public,
            )),
            admin: Arc::new(AdminService::new(store, storage)),
        };

        Self {
            server: TestServer::new(api_router(&services)).unwrap(),
            _upload_dir: upload_dir,
        }
    }

    /// Register a Student and return its session token
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/auth/register-user")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        token_of(response.json())
    }

    /// Register an Admin and return its session token
    pub async fn register_admin(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/auth/register-admin")
            .json(&json!({
                "email": email,
                "password": TEST_PASSWORD,
                "adminSecret": TEST_ADMIN_SECRET,
            }))
            .await;
        token_of(response.json())
    }
}

fn token_of(body: Value) -> String {
    body["token"].as_str().unwrap().to_string()
}
