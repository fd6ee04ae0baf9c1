// Auth exports
pub mod extractor;
pub mod password;
pub mod token;

use thiserror::Error;

pub use extractor::AuthUser;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtIssuer};

/// Errors that can occur when issuing or verifying credentials
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hash error: {0}")]
    Hash(String),
}
