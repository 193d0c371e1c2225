//! # Trusted OAuth Domain
//!
//! Data model for the trusted OAuth client.
//!
//! This crate contains:
//! - The error taxonomy (`ClientError`, `RemoteError`) and `Result` alias
//! - Token types produced by grant flows (`Token`, `TokenIntrospect`)
//! - User records and the presence-encoded payload DTOs used by the user
//!   management operations
//! - Client credentials
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O: everything here is plain data plus serde mappings

pub mod constants;
pub mod credentials;
pub mod errors;
pub mod token;
pub mod user;

mod serde_utils;

// Re-export commonly used items
pub use constants::*;
pub use credentials::ClientCredentials;
pub use errors::*;
pub use token::{Token, TokenIntrospect};
pub use user::{OAuthUser, OAuthUserCreate, OAuthUserFilter, OAuthUserUpdate};
