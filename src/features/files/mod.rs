pub mod archive;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{download_routes, upload_routes};
pub use services::FileService;
