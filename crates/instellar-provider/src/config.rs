//! Provider configuration
//!
//! `host` and `auth_token` can come from the provider configuration or the
//! environment. A value set in configuration always wins, even when empty.

use crate::error::{ProviderError, Result};
use instellar_client::{DEFAULT_HOST, Sensitive};
use serde::{Deserialize, Serialize};

pub const HOST_ENV: &str = "INSTELLAR_HOST";
pub const AUTH_TOKEN_ENV: &str = "INSTELLAR_AUTH_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub host: Option<String>,
    pub auth_token: Option<Sensitive>,
}

/// Configuration after environment fallbacks have been applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub auth_token: Sensitive,
}

impl ProviderConfig {
    pub fn new(host: Option<String>, auth_token: Option<String>) -> Self {
        Self {
            host,
            auth_token: auth_token.map(Sensitive::from),
        }
    }

    /// Resolve host and token against the environment
    ///
    /// Host: configuration, else `INSTELLAR_HOST`, else the public
    /// installation. Token: configuration, else `INSTELLAR_AUTH_TOKEN`;
    /// an empty token is an error.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut host = std::env::var(HOST_ENV).unwrap_or_default();
        let mut auth_token = std::env::var(AUTH_TOKEN_ENV).unwrap_or_default();

        if let Some(configured) = &self.host {
            host = configured.clone();
        }

        if let Some(configured) = &self.auth_token {
            auth_token = configured.expose().to_string();
        }

        if host.is_empty() {
            host = DEFAULT_HOST.to_string();
        }

        if auth_token.is_empty() {
            return Err(ProviderError::MissingAuthToken);
        }

        Ok(ResolvedConfig {
            host,
            auth_token: Sensitive::new(auth_token),
        })
    }
}
