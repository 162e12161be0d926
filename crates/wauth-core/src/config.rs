//! Configuration for wauth

use serde::{Deserialize, Serialize};

use crate::types::Attributes;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WauthConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Directory to look users up in; absent means no directory lookup
    #[serde(default)]
    pub ldap: Option<LdapConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WauthConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("WAUTH_BIND_ADDRESS") {
            config.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("WAUTH_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }
        if let Ok(level) = std::env::var("WAUTH_LOG_LEVEL") {
            config.logging.level = level;
        }

        if std::env::var("WAUTH_INTEGRATED")
            .map(|v| v == "false")
            .unwrap_or(false)
        {
            config.strategy.integrated = false;
        }
        if let Ok(header) = std::env::var("WAUTH_IDENTITY_HEADER") {
            config.strategy.identity_header = header;
        }

        // Directory from environment
        if let Ok(url) = std::env::var("WAUTH_LDAP_URL") {
            let mut ldap = LdapConfig {
                url,
                ..Default::default()
            };
            if let Ok(base_dn) = std::env::var("WAUTH_LDAP_BASE_DN") {
                ldap.base_dn = base_dn;
            }
            if let Ok(bind_dn) = std::env::var("WAUTH_LDAP_BIND_DN") {
                ldap.bind_dn = Some(bind_dn);
            }
            if let Ok(password) = std::env::var("WAUTH_LDAP_BIND_PASSWORD") {
                ldap.bind_password = Some(password);
            }
            config.ldap = Some(ldap);
        }

        config
    }

    pub fn validate(&self) -> crate::Result<()> {
        if let Some(ref ldap) = self.ldap {
            ldap.validate()?;
        }
        if self.strategy.identity_header.is_empty() {
            return Err(crate::Error::Config(
                "Identity header name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Largest request body buffered to read credentials from
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// Strategy behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Trust the identity header set by the fronting web server
    pub integrated: bool,
    pub identity_header: String,
    pub username_field: String,
    pub password_field: String,
    /// Pass the request to the verification callback
    pub pass_req_to_callback: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            integrated: true,
            identity_header: crate::DEFAULT_IDENTITY_HEADER.to_string(),
            username_field: crate::DEFAULT_USERNAME_FIELD.to_string(),
            password_field: crate::DEFAULT_PASSWORD_FIELD.to_string(),
            pass_req_to_callback: false,
        }
    }
}

/// LDAP/Active Directory connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server URL (ldap:// or ldaps://)
    #[serde(default = "default_ldap_url")]
    pub url: String,

    /// Base DN searched for users
    /// Example: "dc=corp,dc=local"
    #[serde(default)]
    pub base_dn: String,

    /// Service account used for searches; anonymous when absent
    #[serde(default)]
    pub bind_dn: Option<String>,

    #[serde(default)]
    pub bind_password: Option<String>,

    /// Use STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Connection timeout in seconds
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,

    /// User search filter template, {username} is substituted verbatim
    #[serde(default)]
    pub filter: Option<String>,

    /// Attributes to fetch; a single name is accepted
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

fn default_ldap_url() -> String {
    "ldap://localhost:389".to_string()
}

fn default_ldap_timeout() -> u64 {
    10
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            url: default_ldap_url(),
            base_dn: String::new(),
            bind_dn: None,
            bind_password: None,
            start_tls: false,
            timeout_seconds: default_ldap_timeout(),
            filter: None,
            attributes: None,
        }
    }
}

impl LdapConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::Error::Config("LDAP URL is required".into()));
        }

        if !self.url.starts_with("ldap://") && !self.url.starts_with("ldaps://") {
            return Err(crate::Error::Config(
                "LDAP URL must start with ldap:// or ldaps://".into(),
            ));
        }

        if self.base_dn.is_empty() {
            return Err(crate::Error::Config("LDAP base DN is required".into()));
        }

        if let Some(ref filter) = self.filter {
            if !filter.contains("{username}") {
                return Err(crate::Error::Config(
                    "LDAP filter must contain {username} placeholder".into(),
                ));
            }
        }

        Ok(())
    }

    /// Substitute the username into the configured filter template
    pub fn build_filter(&self, username: &str) -> Option<String> {
        self.filter
            .as_ref()
            .map(|f| f.replace("{username}", username))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
