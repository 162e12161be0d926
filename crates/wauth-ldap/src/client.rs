//! LDAP Client implementation
//!
//! Active Directory client over `ldap3`. Every operation opens its own
//! connection; LDAP, LDAPS and STARTTLS are supported.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use wauth_core::config::LdapConfig;
use wauth_core::{DirectoryRecord, Error, Result};

use crate::directory::{DirectoryClient, FindQuery, FindResults};

/// Invalid credentials
const RC_INVALID_CREDENTIALS: u32 = 49;
/// Unwilling to perform; AD answers this for disabled accounts
const RC_UNWILLING_TO_PERFORM: u32 = 53;

/// LDAP client for Microsoft Active Directory
pub struct ActiveDirectory {
    config: LdapConfig,
}

impl ActiveDirectory {
    /// Create a new client. No connection is made until the first operation.
    pub fn new(config: LdapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Create LDAP connection with proper TLS settings
    async fn create_connection(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.timeout_seconds))
            .set_starttls(self.config.start_tls);

        debug!("Connecting to LDAP server: {}", self.config.url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.config.url)
            .await
            .map_err(Error::directory)?;

        ldap3::drive!(conn);
        Ok(ldap)
    }

    /// Bind with the service account, or stay anonymous without one
    async fn service_bind(&self, ldap: &mut Ldap) -> Result<()> {
        let Some(ref bind_dn) = self.config.bind_dn else {
            return Ok(());
        };
        let password = self.config.bind_password.as_deref().unwrap_or_default();

        ldap.simple_bind(bind_dn, password)
            .await
            .map_err(Error::directory)?
            .success()
            .map_err(Error::directory)?;

        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for ActiveDirectory {
    async fn find(&self, query: &FindQuery) -> Result<Option<FindResults>> {
        let mut ldap = self.create_connection().await?;
        self.service_bind(&mut ldap).await?;

        let mut attrs: Vec<&str> = query.attributes.iter().collect();
        if !query.attributes.contains("objectClass") {
            attrs.push("objectClass");
        }

        debug!("Searching with filter: {}", query.filter);

        let (rs, _res) = ldap
            .search(&self.config.base_dn, Scope::Subtree, &query.filter, attrs)
            .await
            .map_err(Error::directory)?
            .success()
            .map_err(Error::directory)?;

        let _ = ldap.unbind().await;

        if rs.is_empty() {
            return Ok(None);
        }

        let mut results = FindResults::default();
        for entry in rs {
            results.push(to_record(SearchEntry::construct(entry)));
        }

        debug!(
            "Found {} users, {} groups, {} other entries",
            results.users.len(),
            results.groups.len(),
            results.other.len()
        );
        Ok(Some(results))
    }

    async fn authenticate(&self, dn: &str, password: &str) -> Result<bool> {
        // An empty password is an unauthenticated bind, which AD accepts
        if dn.is_empty() || password.is_empty() {
            return Ok(false);
        }

        let mut ldap = self.create_connection().await?;

        let result = ldap
            .simple_bind(dn, password)
            .await
            .map_err(Error::directory)?;

        let _ = ldap.unbind().await;

        match result.rc {
            0 => Ok(true),
            RC_INVALID_CREDENTIALS | RC_UNWILLING_TO_PERFORM => {
                debug!("Bind rejected for {} with code {}", dn, result.rc);
                Ok(false)
            }
            rc => {
                warn!("Bind for {} failed with code {}", dn, rc);
                Err(Error::directory(ldap3::LdapError::LdapResult { result }))
            }
        }
    }
}

/// Flatten a search entry into a record.
///
/// The DN goes under `dn`; single values become strings and multiple
/// values arrays. `objectGUID` is rendered in canonical GUID form, other
/// binary attributes are hex-encoded.
fn to_record(entry: SearchEntry) -> DirectoryRecord {
    let mut record = DirectoryRecord::new();

    for (name, values) in entry.attrs {
        if name.eq_ignore_ascii_case("objectGUID") {
            let bytes: Vec<Vec<u8>> = values.into_iter().map(String::into_bytes).collect();
            record.insert(name, binary_value("objectGUID", bytes));
        } else {
            record.insert(name, collapse(values));
        }
    }

    for (name, values) in entry.bin_attrs {
        let value = binary_value(&name, values);
        record.insert(name, value);
    }

    record.insert("dn", entry.dn);
    record
}

fn binary_value(name: &str, values: Vec<Vec<u8>>) -> Value {
    let guid = name.eq_ignore_ascii_case("objectGUID");
    let rendered = values
        .into_iter()
        .map(|bytes| {
            if guid {
                if let Ok(uuid) = uuid::Uuid::from_slice_le(&bytes) {
                    return uuid.to_string();
                }
            }
            hex::encode(bytes)
        })
        .collect();
    collapse(rendered)
}

fn collapse(mut values: Vec<String>) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}
