//! Wauth Core Library
//!
//! Shared types for the wauth Active Directory authentication strategy:
//! the request model, directory records, user profiles, authentication
//! outcomes, configuration and the error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::WauthConfig;
pub use error::{Error, Result};
pub use types::{
    Attributes, AuthRequest, DirectoryRecord, Email, NameParts, Outcome, Profile, ProfileName,
    Verified,
};

/// Wauth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header set by iisnode when IIS performed Windows integrated authentication
pub const DEFAULT_IDENTITY_HEADER: &str = "x-iisnode-logon_user";

/// Default request field carrying the username in password mode
pub const DEFAULT_USERNAME_FIELD: &str = "username";

/// Default request field carrying the password in password mode
pub const DEFAULT_PASSWORD_FIELD: &str = "password";
