//! Authentication: password credentials and opaque session tokens.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The `CredentialVerifier` and `SessionStore` capabilities
//! - Session token generation and hashing
//! - `AuthService` for register, login, resolve and logout

mod credential;
mod error;
pub mod memory;
mod password;
mod service;
mod session;
mod token;

pub use credential::{Argon2Verifier, CredentialVerifier};
pub use error::AuthError;
pub use memory::InMemorySessionStore;
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{AuthService, AuthSettings, LoginOutcome, MIN_PASSWORD_LEN};
pub use session::{NewSession, Session, SessionStore};
pub use token::{SessionToken, hash_token};
