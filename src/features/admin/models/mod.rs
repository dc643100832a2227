mod admin_views;

pub use admin_views::{AdminCollectionRow, AdminUserRow};
