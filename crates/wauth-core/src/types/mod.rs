//! Core types for wauth

mod outcome;
mod profile;
mod record;
mod request;

pub use outcome::*;
pub use profile::*;
pub use record::*;
pub use request::*;
