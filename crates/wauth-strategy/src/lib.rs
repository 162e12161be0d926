//! Active Directory authentication strategy
//!
//! Authenticates a request either by trusting the identity header set by
//! a fronting web server doing Windows integrated authentication, or by
//! binding to the directory with a submitted username and password. The
//! resulting profile is handed to a caller-supplied verification callback
//! which decides the final outcome.

mod options;
mod profile;
mod strategy;
mod traits;
mod verify;

pub use options::{
    default_filter, username_from_header, DirectoryOptions, DirectorySource, FilterFn,
    MapProfileFn, StrategyOptions, UsernameFn, DEFAULT_ATTRIBUTES,
};
pub use profile::default_profile;
pub use strategy::{Builder, Strategy, STRATEGY_NAME};
pub use traits::AuthStrategy;
pub use verify::{CallShape, Verify, VerifyFuture};

pub use wauth_core::{AuthRequest, Outcome, Profile, Verified};
pub use wauth_ldap::{DirectoryClient, DirectoryHandle, FindQuery, FindResults};
