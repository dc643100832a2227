mod jwt;
mod password;

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{AuthRepository, PgAuthRepository};
pub use services::AuthService;
