mod session_token;
mod user;

pub use session_token::SessionToken;
pub use user::{User, UserRole};
