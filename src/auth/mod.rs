//! Password hashing, session tokens and the middleware guarding protected routes.

mod middleware;
mod password;
mod token;

pub use middleware::{TOKEN_HEADER, auth_guard};
pub use password::{PASSWORD_MIN_LENGTH, PasswordHash, ValidatedPassword};
pub use token::{Claims, TokenKeys, TokenPair, TokenType, issue_token_pair, validate_token};
