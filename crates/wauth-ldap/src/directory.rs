//! Directory client capability and query types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wauth_core::{Attributes, DirectoryRecord, Result};

/// Search-and-bind access to a directory service.
///
/// Implementations own the protocol; callers only see records.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Run a search. `None` means the directory returned nothing at all.
    async fn find(&self, query: &FindQuery) -> Result<Option<FindResults>>;

    /// Bind as `dn` with `password`. `Ok(false)` is a rejected bind,
    /// `Err` a failure to talk to the directory.
    async fn authenticate(&self, dn: &str, password: &str) -> Result<bool>;
}

/// Shared handle to a directory client
pub type DirectoryHandle = Arc<dyn DirectoryClient>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindQuery {
    pub filter: String,
    pub attributes: Attributes,
}

impl FindQuery {
    pub fn new(filter: impl Into<String>, attributes: impl Into<Attributes>) -> Self {
        Self {
            filter: filter.into(),
            attributes: attributes.into(),
        }
    }
}

/// Search results split by entry kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResults {
    #[serde(default)]
    pub users: Vec<DirectoryRecord>,
    #[serde(default)]
    pub groups: Vec<DirectoryRecord>,
    #[serde(default)]
    pub other: Vec<DirectoryRecord>,
}

impl FindResults {
    pub fn with_users(users: Vec<DirectoryRecord>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    /// Sort a record into users, groups or other by its `objectClass` /
    /// `objectCategory` values.
    pub fn push(&mut self, record: DirectoryRecord) {
        if is_user(&record) {
            self.users.push(record);
        } else if has_value(&record, "objectClass", "group") {
            self.groups.push(record);
        } else {
            self.other.push(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty() && self.other.is_empty()
    }
}

fn is_user(record: &DirectoryRecord) -> bool {
    has_value(record, "objectClass", "user")
        || has_value(record, "objectClass", "person")
        || record
            .get_str("objectCategory")
            .map(|c| c.to_ascii_lowercase().starts_with("cn=person"))
            .unwrap_or(false)
}

fn has_value(record: &DirectoryRecord, attribute: &str, wanted: &str) -> bool {
    use serde_json::Value;

    match record.get(attribute) {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(wanted),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}
