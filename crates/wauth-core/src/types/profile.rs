//! User profile types

use serde::{Deserialize, Serialize};

use super::DirectoryRecord;

/// Normalized user profile handed to the verification callback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ProfileName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<Email>>,

    /// Raw directory record the profile was mapped from
    #[serde(rename = "_json", default, skip_serializing_if = "Option::is_none")]
    pub json: Option<DirectoryRecord>,
}

impl Profile {
    /// Profile used when no directory is configured: the bare username.
    pub fn from_username(username: &str) -> Self {
        Self {
            id: Some(username.to_string()),
            name: Some(ProfileName::Plain(username.to_string())),
            ..Default::default()
        }
    }

    /// Distinguished name of the backing directory record
    pub fn dn(&self) -> Option<&str> {
        self.json.as_ref().and_then(DirectoryRecord::dn)
    }
}

/// Either structured name parts or the plain username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileName {
    Parts(NameParts),
    Plain(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub value: String,
}

impl Email {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_username_profile_shape() {
        let profile = Profile::from_username("jdoe");
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"id": "jdoe", "name": "jdoe"})
        );
    }

    #[test]
    fn test_profile_serializes_passport_field_names() {
        let profile = Profile {
            id: Some("42".to_string()),
            display_name: Some("John Doe".to_string()),
            name: Some(ProfileName::Parts(NameParts {
                family_name: Some("Doe".to_string()),
                given_name: Some("John".to_string()),
            })),
            emails: Some(vec![Email::new("jdoe@corp.local")]),
            json: Some(DirectoryRecord::new().with("dn", "CN=jdoe")),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["displayName"], "John Doe");
        assert_eq!(value["name"]["familyName"], "Doe");
        assert_eq!(value["emails"][0]["value"], "jdoe@corp.local");
        assert_eq!(value["_json"]["dn"], "CN=jdoe");
        assert_eq!(profile.dn(), Some("CN=jdoe"));
    }
}
