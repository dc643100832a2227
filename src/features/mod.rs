pub mod admin;
pub mod auth;
pub mod collections;
pub mod files;
