//! Server configuration.
//!
//! [`AppSettings`] is loaded by `ortho_config` from `MARKETPLACE_*`
//! environment variables, CLI flags and config files. Every field is optional;
//! the accessors apply defaults and validate.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use masters_backend::domain::{
    Currency, DEFAULT_SESSION_TTL_MINUTES, PaymentsConfig, RoleDestinationError, RoleDestinations,
};
use masters_backend::inbound::http::session_config::CookieSettings;
use masters_backend::outbound::payments::STRIPE_API_BASE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CURRENCY: &str = "rub";
const DEFAULT_PROCESSOR_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ADMIN_NAME: &str = "Administrator";

type UrlParseError = <Url as std::str::FromStr>::Err;

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("session TTL must be a positive number of minutes, got {0}")]
    SessionTtl(i64),
    #[error("invalid currency '{0}'; expected a three letter ISO code")]
    Currency(String),
    #[error("invalid role destinations: {0}")]
    Destinations(#[from] RoleDestinationError),
    #[error("invalid processor API base '{value}': {source}")]
    ApiBase {
        value: String,
        #[source]
        source: UrlParseError,
    },
    #[error("admin_email and admin_password_file must be set together")]
    PartialAdmin,
}

/// Settings read at startup.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct AppSettings {
    /// Listen address, `0.0.0.0:8080` by default.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without it the server keeps data in memory.
    pub database_url: Option<String>,
    /// Connection pool size.
    pub db_max_connections: Option<u32>,
    /// Session lifetime in minutes.
    pub session_ttl_minutes: Option<i64>,
    /// Processor secret key; without it debug builds use a fixture processor.
    pub stripe_secret_key: Option<String>,
    /// Key handed to the browser.
    pub stripe_publishable_key: Option<String>,
    /// Processor API base URL.
    pub stripe_api_base: Option<String>,
    /// Processor request timeout in seconds.
    pub stripe_timeout_secs: Option<u64>,
    /// Default order currency.
    pub currency: Option<String>,
    /// `role=/path` overrides, comma separated.
    pub role_destinations: Option<String>,
    /// Bootstrap administrator email.
    pub admin_email: Option<String>,
    /// Bootstrap administrator display name.
    pub admin_name: Option<String>,
    /// File holding the bootstrap administrator password.
    pub admin_password_file: Option<PathBuf>,
    /// bcrypt cost factor.
    pub bcrypt_cost: Option<u32>,
}

/// Bootstrap administrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub name: String,
    pub password_file: PathBuf,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| ConfigError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn session_ttl(&self) -> Result<TimeDelta, ConfigError> {
        match self.session_ttl_minutes.unwrap_or(DEFAULT_SESSION_TTL_MINUTES) {
            minutes if minutes > 0 => Ok(TimeDelta::minutes(minutes)),
            minutes => Err(ConfigError::SessionTtl(minutes)),
        }
    }

    pub fn currency(&self) -> Result<Currency, ConfigError> {
        let raw = self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        Currency::new(raw).map_err(|_| ConfigError::Currency(raw.to_owned()))
    }

    pub fn destinations(&self) -> Result<RoleDestinations, ConfigError> {
        match self.role_destinations.as_deref() {
            Some(raw) => Ok(RoleDestinations::parse(raw)?),
            None => Ok(RoleDestinations::default()),
        }
    }

    pub fn stripe_api_base(&self) -> Result<Url, ConfigError> {
        let raw = self.stripe_api_base.as_deref().unwrap_or(STRIPE_API_BASE);
        // `Url::join` drops the last path segment unless the base ends in '/'.
        let normalised = if raw.ends_with('/') {
            raw.to_owned()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalised).map_err(|source| ConfigError::ApiBase {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn stripe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.stripe_timeout_secs
                .unwrap_or(DEFAULT_PROCESSOR_TIMEOUT_SECS)
                .max(1),
        )
    }

    pub fn payments_config(&self) -> Result<PaymentsConfig, ConfigError> {
        Ok(PaymentsConfig {
            publishable_key: self.stripe_publishable_key.clone().unwrap_or_default(),
            currency: self.currency()?,
        })
    }

    pub fn admin_bootstrap(&self) -> Result<Option<AdminBootstrap>, ConfigError> {
        match (&self.admin_email, &self.admin_password_file) {
            (Some(email), Some(password_file)) => Ok(Some(AdminBootstrap {
                email: email.clone(),
                name: self
                    .admin_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_owned()),
                password_file: password_file.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::PartialAdmin),
        }
    }
}

/// Listener and cookie settings for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) cookies: CookieSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session_ttl: TimeDelta,
}

impl ServerConfig {
    #[must_use]
    pub fn new(cookies: CookieSettings, bind_addr: SocketAddr, session_ttl: TimeDelta) -> Self {
        Self {
            cookies,
            bind_addr,
            session_ttl,
        }
    }
}
