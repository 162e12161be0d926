//! Strategy options

use std::sync::Arc;
use wauth_core::config::{LdapConfig, StrategyConfig};
use wauth_core::{
    Attributes, AuthRequest, DirectoryRecord, Profile, DEFAULT_IDENTITY_HEADER,
    DEFAULT_PASSWORD_FIELD, DEFAULT_USERNAME_FIELD,
};
use wauth_ldap::DirectoryHandle;

/// Builds the directory search filter for a username
pub type FilterFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Extracts the username asserted by the fronting web server
pub type UsernameFn = Arc<dyn Fn(&AuthRequest) -> Option<String> + Send + Sync>;

/// Maps a directory record to a profile
pub type MapProfileFn = Arc<dyn Fn(&DirectoryRecord) -> Profile + Send + Sync>;

/// Attributes fetched when none are configured
pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "dn",
    "displayName",
    "givenName",
    "sn",
    "title",
    "userPrincipalName",
    "sAMAccountName",
    "mail",
    "description",
];

/// Search filter used when none is configured.
///
/// The username is interpolated as-is, without LDAP filter escaping, so a
/// username carrying filter metacharacters alters the query. Supply a
/// custom filter to escape values.
pub fn default_filter(username: &str) -> String {
    format!(
        "(&(objectclass=user)(|(sAMAccountName={username})(UserPrincipalName={username})))"
    )
}

/// Read a `DOMAIN\username` header and return the username segment.
///
/// The segment runs from the first backslash up to any second one.
pub fn username_from_header(req: &AuthRequest, header: &str) -> Option<String> {
    req.header(header)?
        .split('\\')
        .nth(1)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Where the directory client comes from
#[derive(Clone)]
pub enum DirectorySource {
    /// Use an existing client as-is
    Client(DirectoryHandle),
    /// Build an `ActiveDirectory` client from this configuration
    Config(LdapConfig),
}

/// Directory lookup settings
#[derive(Clone)]
pub struct DirectoryOptions {
    pub source: DirectorySource,
    pub filter: Option<FilterFn>,
    pub attributes: Option<Attributes>,
}

impl DirectoryOptions {
    pub fn client(client: DirectoryHandle) -> Self {
        Self {
            source: DirectorySource::Client(client),
            filter: None,
            attributes: None,
        }
    }

    /// Directory built from configuration; the configured filter template
    /// and attributes become the lookup overrides.
    pub fn config(config: LdapConfig) -> Self {
        let filter = config.filter.is_some().then(|| {
            let template = config.clone();
            Arc::new(move |username: &str| template.build_filter(username).unwrap_or_default())
                as FilterFn
        });
        let attributes = config.attributes.clone();

        Self {
            source: DirectorySource::Config(config),
            filter,
            attributes,
        }
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<Attributes>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }
}

/// Strategy configuration, fixed at construction
#[derive(Clone)]
pub struct StrategyOptions {
    /// Trust the identity header instead of reading a username/password
    pub integrated: bool,
    pub username_field: String,
    pub password_field: String,
    /// Header read by the default username extractor
    pub identity_header: String,
    pub username_from_header: Option<UsernameFn>,
    pub map_profile: Option<MapProfileFn>,
    /// No directory means no lookup: the callback gets the bare username
    pub directory: Option<DirectoryOptions>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            integrated: true,
            username_field: DEFAULT_USERNAME_FIELD.to_string(),
            password_field: DEFAULT_PASSWORD_FIELD.to_string(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            username_from_header: None,
            map_profile: None,
            directory: None,
        }
    }
}

impl StrategyOptions {
    /// Username/password mode against the given directory
    pub fn password(directory: DirectoryOptions) -> Self {
        Self {
            integrated: false,
            directory: Some(directory),
            ..Default::default()
        }
    }

    /// Options from the file/env configuration
    pub fn from_config(strategy: &StrategyConfig, ldap: Option<&LdapConfig>) -> Self {
        Self {
            integrated: strategy.integrated,
            username_field: strategy.username_field.clone(),
            password_field: strategy.password_field.clone(),
            identity_header: strategy.identity_header.clone(),
            username_from_header: None,
            map_profile: None,
            directory: ldap.cloned().map(DirectoryOptions::config),
        }
    }

    pub fn with_directory(mut self, directory: DirectoryOptions) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_username_from_header<F>(mut self, f: F) -> Self
    where
        F: Fn(&AuthRequest) -> Option<String> + Send + Sync + 'static,
    {
        self.username_from_header = Some(Arc::new(f));
        self
    }

    pub fn with_map_profile<F>(mut self, f: F) -> Self
    where
        F: Fn(&DirectoryRecord) -> Profile + Send + Sync + 'static,
    {
        self.map_profile = Some(Arc::new(f));
        self
    }
}
