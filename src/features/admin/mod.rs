pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{AdminRepository, PgAdminRepository};
pub use routes::routes;
pub use services::AdminService;
