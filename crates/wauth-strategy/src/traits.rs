//! Authentication strategy capability

use async_trait::async_trait;
use wauth_core::{AuthRequest, Outcome};

/// A way of authenticating a request, as seen by the hosting layer.
///
/// The hosting layer maps [`Outcome::Success`] to continuing with the user
/// attached, [`Outcome::Fail`] to 401 and [`Outcome::Error`] to 500.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// The user value produced on success
    type User: Send + 'static;

    fn name(&self) -> &str;

    async fn authenticate(&self, req: AuthRequest) -> Outcome<Self::User>;
}
