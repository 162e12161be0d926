//! Verification callback shapes

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use wauth_core::{AuthRequest, Profile, Result, Verified};
use wauth_ldap::DirectoryHandle;

/// Future returned by a verification callback.
///
/// `Err` reports a failure, `Ok` with no user a rejection and `Ok` with a
/// user an accepted login.
pub type VerifyFuture<U> = BoxFuture<'static, Result<Verified<U>>>;

type ProfileFn<U> = dyn Fn(Profile) -> VerifyFuture<U> + Send + Sync;
type ProfileClientFn<U> = dyn Fn(Profile, DirectoryHandle) -> VerifyFuture<U> + Send + Sync;
type RequestProfileFn<U> = dyn Fn(AuthRequest, Profile) -> VerifyFuture<U> + Send + Sync;
type RequestProfileClientFn<U> =
    dyn Fn(AuthRequest, Profile, DirectoryHandle) -> VerifyFuture<U> + Send + Sync;

/// The caller's verification callback, in one of four call shapes.
///
/// The variant decides whether the original request and the directory
/// client are passed along with the profile.
pub enum Verify<U> {
    Profile(Arc<ProfileFn<U>>),
    ProfileClient(Arc<ProfileClientFn<U>>),
    RequestProfile(Arc<RequestProfileFn<U>>),
    RequestProfileClient(Arc<RequestProfileClientFn<U>>),
}

/// Which extra arguments a callback receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallShape {
    pub pass_request: bool,
    pub pass_client: bool,
}

impl<U: Send + 'static> Verify<U> {
    pub fn profile<F, Fut>(f: F) -> Self
    where
        F: Fn(Profile) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verified<U>>> + Send + 'static,
    {
        Verify::Profile(Arc::new(move |profile| -> VerifyFuture<U> {
            Box::pin(f(profile))
        }))
    }

    pub fn profile_and_client<F, Fut>(f: F) -> Self
    where
        F: Fn(Profile, DirectoryHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verified<U>>> + Send + 'static,
    {
        Verify::ProfileClient(Arc::new(move |profile, client| -> VerifyFuture<U> {
            Box::pin(f(profile, client))
        }))
    }

    pub fn request_and_profile<F, Fut>(f: F) -> Self
    where
        F: Fn(AuthRequest, Profile) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verified<U>>> + Send + 'static,
    {
        Verify::RequestProfile(Arc::new(move |req, profile| -> VerifyFuture<U> {
            Box::pin(f(req, profile))
        }))
    }

    pub fn request_profile_and_client<F, Fut>(f: F) -> Self
    where
        F: Fn(AuthRequest, Profile, DirectoryHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verified<U>>> + Send + 'static,
    {
        Verify::RequestProfileClient(Arc::new(move |req, profile, client| -> VerifyFuture<U> {
            Box::pin(f(req, profile, client))
        }))
    }
}

impl<U> Verify<U> {
    pub fn shape(&self) -> CallShape {
        let (pass_request, pass_client) = match self {
            Verify::Profile(_) => (false, false),
            Verify::ProfileClient(_) => (false, true),
            Verify::RequestProfile(_) => (true, false),
            Verify::RequestProfileClient(_) => (true, true),
        };
        CallShape {
            pass_request,
            pass_client,
        }
    }
}

impl<U> Clone for Verify<U> {
    fn clone(&self) -> Self {
        match self {
            Verify::Profile(f) => Verify::Profile(Arc::clone(f)),
            Verify::ProfileClient(f) => Verify::ProfileClient(Arc::clone(f)),
            Verify::RequestProfile(f) => Verify::RequestProfile(Arc::clone(f)),
            Verify::RequestProfileClient(f) => Verify::RequestProfileClient(Arc::clone(f)),
        }
    }
}

impl<U> std::fmt::Debug for Verify<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Verify").field(&self.shape()).finish()
    }
}
