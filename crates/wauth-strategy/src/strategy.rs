//! Strategy implementation
//!
//! Resolves a username from the request, looks the user up in the
//! directory (binding as them in password mode), maps the record to a
//! profile and lets the verification callback decide the outcome.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use wauth_core::{Attributes, AuthRequest, DirectoryRecord, Error, Outcome, Profile, Result};
use wauth_ldap::{ActiveDirectory, DirectoryHandle, FindQuery};

use crate::options::{
    default_filter, username_from_header, DirectorySource, FilterFn, MapProfileFn,
    StrategyOptions, UsernameFn, DEFAULT_ATTRIBUTES,
};
use crate::profile::default_profile;
use crate::traits::AuthStrategy;
use crate::verify::Verify;

/// Name the strategy registers under
pub const STRATEGY_NAME: &str = "ActiveDirectory";

/// Active Directory authentication strategy.
///
/// Stateless between requests; share it behind an `Arc`.
pub struct Strategy<U> {
    verify: Verify<U>,
    integrated: bool,
    username_field: String,
    password_field: String,
    username_from_header: UsernameFn,
    map_profile: Option<MapProfileFn>,
    directory: Option<Directory>,
}

/// Resolved directory client plus lookup settings
struct Directory {
    client: DirectoryHandle,
    filter: Option<FilterFn>,
    attributes: Attributes,
}

impl Directory {
    fn query(&self, username: &str) -> FindQuery {
        let filter = match self.filter {
            Some(ref filter) => filter(username),
            None => default_filter(username),
        };
        FindQuery {
            filter,
            attributes: self.attributes.clone(),
        }
    }
}

/// Used to build a [`Strategy`]
pub struct Builder<U> {
    options: StrategyOptions,
    verify: Option<Verify<U>>,
}

impl<U> Builder<U> {
    pub fn new(options: StrategyOptions) -> Self {
        Self {
            options,
            verify: None,
        }
    }

    pub fn verify(mut self, verify: Verify<U>) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Resolve the directory client and freeze the options.
    ///
    /// Fails without a verification callback, when the callback takes the
    /// directory client but no directory is configured, or when the
    /// directory configuration is invalid.
    pub fn build(self) -> Result<Strategy<U>> {
        let verify = self.verify.ok_or(Error::MissingVerify)?;
        let options = self.options;

        if verify.shape().pass_client && options.directory.is_none() {
            return Err(Error::InvalidOptions(
                "verify callback takes the directory client but no directory is configured"
                    .into(),
            ));
        }

        let directory = match options.directory {
            Some(directory) => {
                let client: DirectoryHandle = match directory.source {
                    DirectorySource::Client(client) => client,
                    DirectorySource::Config(config) => Arc::new(ActiveDirectory::new(config)?),
                };
                let attributes = directory
                    .attributes
                    .unwrap_or_else(|| Attributes::from(DEFAULT_ATTRIBUTES))
                    .with_dn();
                Some(Directory {
                    client,
                    filter: directory.filter,
                    attributes,
                })
            }
            None => None,
        };

        if !options.integrated && directory.is_none() {
            warn!("Password mode without a directory: passwords are not checked");
        }

        let extract_username = options.username_from_header.unwrap_or_else(|| {
            let header = options.identity_header.clone();
            Arc::new(move |req: &AuthRequest| username_from_header(req, &header)) as UsernameFn
        });

        debug!(
            "{} strategy ready (integrated: {}, directory: {}, {:?})",
            STRATEGY_NAME,
            options.integrated,
            directory.is_some(),
            verify.shape()
        );

        Ok(Strategy {
            verify,
            integrated: options.integrated,
            username_field: options.username_field,
            password_field: options.password_field,
            username_from_header: extract_username,
            map_profile: options.map_profile,
            directory,
        })
    }
}

impl<U> Strategy<U> {
    pub fn builder(options: StrategyOptions) -> Builder<U> {
        Builder::new(options)
    }

    pub fn new(options: StrategyOptions, verify: Verify<U>) -> Result<Self> {
        Builder::new(options).verify(verify).build()
    }

    pub fn is_integrated(&self) -> bool {
        self.integrated
    }

    /// The directory client, when a directory is configured
    pub fn directory(&self) -> Option<&DirectoryHandle> {
        self.directory.as_ref().map(|d| &d.client)
    }

    /// Map a directory record to a profile. `None` maps to `None`.
    ///
    /// A custom mapper's result always gets `_json` set to the raw record.
    pub fn map_profile(&self, record: Option<DirectoryRecord>) -> Option<Profile> {
        record.map(|record| self.map_record(record))
    }

    fn map_record(&self, record: DirectoryRecord) -> Profile {
        match self.map_profile {
            Some(ref map) => {
                let mut profile = map(&record);
                profile.json = Some(record);
                profile
            }
            None => default_profile(record),
        }
    }

    /// Username and optional password carried by the request
    fn credentials(&self, req: &AuthRequest) -> Option<(String, Option<String>)> {
        if self.integrated {
            let username = (self.username_from_header)(req)?;
            return Some((username, None));
        }

        let username = req.field(&self.username_field)?.to_string();
        let password = req.field(&self.password_field).map(str::to_string);
        Some((username, password))
    }

    async fn attempt(&self, req: AuthRequest) -> Outcome<U> {
        let Some((username, password)) = self.credentials(&req) else {
            if self.integrated {
                debug!("No username asserted by the identity header");
                return Outcome::Fail(None);
            }
            return Outcome::fail_with("Missing credentials");
        };

        let Some(ref directory) = self.directory else {
            return self.dispatch(req, Profile::from_username(&username)).await;
        };

        let query = directory.query(&username);
        debug!("Looking up {} with filter: {}", username, query.filter);

        let results = match directory.client.find(&query).await {
            Ok(results) => results,
            Err(err) => {
                warn!("Directory lookup for {} failed: {}", username, err);
                return Outcome::Error(err);
            }
        };

        let Some(record) = results.and_then(|r| r.users.into_iter().next()) else {
            debug!("User {} not found in directory", username);
            return Outcome::fail_with(format!("The user \"{}\" was not found", username));
        };

        let profile = self.map_record(record);

        if !self.integrated {
            let dn = profile.dn().unwrap_or_default();
            let password = password.as_deref().unwrap_or_default();

            match directory.client.authenticate(dn, password).await {
                Ok(true) => debug!("Bind succeeded for {}", dn),
                Ok(false) => {
                    debug!("Bind rejected for {}", dn);
                    return Outcome::fail_with(format!("Authentication failed for {}", username));
                }
                Err(err) => {
                    warn!("Bind for {} failed: {}", dn, err);
                    return Outcome::Error(err);
                }
            }
        }

        self.dispatch(req, profile).await
    }

    /// Call the verification callback in its configured shape
    async fn dispatch(&self, req: AuthRequest, profile: Profile) -> Outcome<U> {
        let client = self.directory().cloned();

        let result = match (&self.verify, client) {
            (Verify::Profile(verify), _) => verify(profile).await,
            (Verify::RequestProfile(verify), _) => verify(req, profile).await,
            (Verify::ProfileClient(verify), Some(client)) => verify(profile, client).await,
            (Verify::RequestProfileClient(verify), Some(client)) => {
                verify(req, profile, client).await
            }
            // ruled out when building
            (_, None) => Err(Error::InvalidOptions(
                "verify callback requires a directory client".into(),
            )),
        };

        Outcome::from(result)
    }
}

#[async_trait]
impl<U> AuthStrategy for Strategy<U>
where
    U: Send + 'static,
{
    type User = U;

    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    async fn authenticate(&self, req: AuthRequest) -> Outcome<U> {
        self.attempt(req).await
    }
}
