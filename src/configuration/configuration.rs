use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const CREDENTIAL_VAR: &str = "WA_API_B";
pub const PHONE_NUMBER_ID_VAR: &str = "WA_PHONE_NUMBER_ID";
pub const API_BASE_VAR: &str = "WA_API_BASE";
pub const API_VERSION_VAR: &str = "WA_API_VERSION";
pub const REQUEST_TIMEOUT_VAR: &str = "WA_REQUEST_TIMEOUT_SECS";
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
pub const SENDER_PORT_VAR: &str = "SENDER_PORT";
pub const WEBHOOK_PORT_VAR: &str = "WEBHOOK_PORT";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v17.0";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_SENDER_PORT: u16 = 3400;
const DEFAULT_WEBHOOK_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Bearer token for the WhatsApp Cloud API.
///
/// Never printed: `Debug` redacts the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::Missing(CREDENTIAL_VAR));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Settings for talking to the messaging provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub credential: Credential,
    pub phone_number_id: Option<String>,
    pub api_base: String,
    pub api_version: String,
    pub request_timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            phone_number_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = lookup(CREDENTIAL_VAR).ok_or(ConfigError::Missing(CREDENTIAL_VAR))?;
        let credential = Credential::new(credential)?;

        let request_timeout = match non_blank(lookup(REQUEST_TIMEOUT_VAR)) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: REQUEST_TIMEOUT_VAR,
                        value: raw,
                    });
                }
            },
            None => None,
        };

        Ok(Self {
            credential,
            phone_number_id: non_blank(lookup(PHONE_NUMBER_ID_VAR)),
            api_base: non_blank(lookup(API_BASE_VAR)).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_version: non_blank(lookup(API_VERSION_VAR))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            request_timeout,
        })
    }

    /// `{api_base}/{api_version}/{sender_phone_id}/messages`
    pub fn messages_url(&self, sender_phone_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            sender_phone_id
        )
    }
}

/// Settings shared by both HTTP listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_address: String,
    pub sender_port: u16,
    pub webhook_port: u16,
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            sender_port: DEFAULT_SENDER_PORT,
            webhook_port: DEFAULT_WEBHOOK_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            bind_address: non_blank(lookup(BIND_ADDRESS_VAR)).unwrap_or(defaults.bind_address),
            sender_port: parse_port(SENDER_PORT_VAR, lookup(SENDER_PORT_VAR))?
                .unwrap_or(defaults.sender_port),
            webhook_port: parse_port(WEBHOOK_PORT_VAR, lookup(WEBHOOK_PORT_VAR))?
                .unwrap_or(defaults.webhook_port),
            log_level: non_blank(lookup(LOG_LEVEL_VAR)).unwrap_or(defaults.log_level),
        })
    }

    pub fn sender_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.sender_port)
    }

    pub fn webhook_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.webhook_port)
    }

    fn socket_addr(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: BIND_ADDRESS_VAR,
                value: self.bind_address.clone(),
            })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_port(name: &'static str, value: Option<String>) -> Result<Option<u16>, ConfigError> {
    match non_blank(value) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(None),
    }
}
