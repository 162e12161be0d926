//! Directory record types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw directory entry: attribute name to value, as produced by a
/// directory client.
///
/// Single-valued attributes are strings, multi-valued attributes arrays.
/// The entry's distinguished name is stored under `dn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryRecord(Map<String, Value>);

impl DirectoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// First non-empty string value of an attribute.
    ///
    /// Multi-valued attributes yield their first element.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        let value = match self.0.get(name)? {
            Value::Array(values) => values.first()?,
            value => value,
        };
        value.as_str().filter(|s| !s.is_empty())
    }

    /// Distinguished name of the entry
    pub fn dn(&self) -> Option<&str> {
        self.get_str("dn")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DirectoryRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Attribute list requested from the directory.
///
/// Deserializes from either a single name or a list of names, so
/// `attributes = "mail"` and `attributes = ["mail", "sn"]` are both accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(Vec<String>);

impl Attributes {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Append `dn` when it is missing; binding as the user needs it.
    pub fn with_dn(mut self) -> Self {
        if !self.contains("dn") {
            self.0.push("dn".to_string());
        }
        self
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Attributes {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Attributes {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for Attributes {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for Attributes {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(name) => Attributes::from(name),
            OneOrMany::Many(names) => Attributes::from(names),
        })
    }
}
