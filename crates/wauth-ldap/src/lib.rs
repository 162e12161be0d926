//! Directory access for wauth
//!
//! Provides:
//! - the `DirectoryClient` capability used by the strategy
//! - `ActiveDirectory`, an LDAP/Active Directory client built on `ldap3`

mod client;
mod directory;

pub use client::ActiveDirectory;
pub use directory::{DirectoryClient, DirectoryHandle, FindQuery, FindResults};
