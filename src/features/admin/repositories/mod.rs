mod admin_repository;

pub use admin_repository::{AdminRepository, PgAdminRepository};
