use std::{net::SocketAddr, time::Duration};

use deployment::DeploymentError;
use secrecy::SecretString;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://breeding.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_NARRATIVE_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the process environment.
#[derive(Debug)]
pub struct DeploymentConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: SecretString,
    /// Enables AI-written recommendations when set
    pub anthropic_api_key: Option<SecretString>,
    pub narrative_model: Option<String>,
    pub narrative_timeout: Duration,
}

impl DeploymentConfig {
    pub fn from_env() -> Result<Self, DeploymentError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeploymentError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let jwt_secret = get("AUTH_JWT_SECRET")
            .map(SecretString::from)
            .ok_or_else(|| DeploymentError::Config("AUTH_JWT_SECRET must be set".to_string()))?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| DeploymentError::Config(format!("BIND_ADDR: {e}")))?;

        let narrative_timeout = match get("NARRATIVE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| DeploymentError::Config(format!("NARRATIVE_TIMEOUT_SECS: {e}")))?,
            None => DEFAULT_NARRATIVE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            jwt_secret,
            anthropic_api_key: get("ANTHROPIC_API_KEY").map(SecretString::from),
            narrative_model: get("NARRATIVE_MODEL"),
            narrative_timeout: Duration::from_secs(narrative_timeout),
        })
    }
}
