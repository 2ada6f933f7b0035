//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::domain::DeletionMode;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Maximum duration of handling a single HTTP request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub request_timeout: time::Duration,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret".to_owned()))]
    pub jwt_secret: SecretString,

    /// Time-to-live of a user session.
    #[default(time::Duration::from_secs(30 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Way of deleting entities.
    pub deletion: Deletion,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            session_ttl,
            deletion,
        } = value;
        let secret = jwt_secret.expose_secret().as_bytes();

        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl,
            deletion: deletion.into(),
        }
    }
}

/// Way of deleting entities.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Deletion {
    /// Rows are removed from the database.
    #[default]
    Hard,

    /// Rows are marked as deleted and hidden from any lookup.
    Soft,
}

impl From<Deletion> for DeletionMode {
    fn from(value: Deletion) -> Self {
        match value {
            Deletion::Hard => Self::Hard,
            Deletion::Soft => Self::Soft,
        }
    }
}

/// Postgres configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres".to_owned()))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of pooled connections.
    #[default(16)]
    pub pool_size: usize,

    /// Maximum duration of a single database operation.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<&Postgres> for service::infra::postgres::Config {
    fn from(value: &Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            pool_size,
            timeout: _,
        } = value;

        Self {
            host: Some(host.clone()),
            port: Some(*port),
            user: Some(user.clone()),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname.clone()),
            pool: Some(service::infra::postgres::PoolConfig::new(*pool_size)),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::domain::DeletionMode;

    use super::{Config, Deletion};

    #[test]
    fn provides_defaults() {
        let conf = Config::new("non-existent.toml").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.request_timeout, Duration::from_secs(30));
        assert_eq!(conf.service.session_ttl, Duration::from_secs(30 * 60));
        assert_eq!(conf.service.deletion, Deletion::Hard);
        assert_eq!(conf.postgres.timeout, Duration::from_secs(5));
        assert_eq!(conf.postgres.pool_size, 16);
    }

    #[test]
    fn converts_deletion_mode() {
        assert_eq!(DeletionMode::from(Deletion::Hard), DeletionMode::Hard);
        assert_eq!(DeletionMode::from(Deletion::Soft), DeletionMode::Soft);
    }

    #[test]
    fn builds_postgres_config() {
        let conf = super::Postgres::default();
        let pg = service::infra::postgres::Config::from(&conf);

        assert_eq!(pg.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(pg.port, Some(5432));
        assert_eq!(pg.password.as_deref(), Some("postgres"));
        assert_eq!(pg.pool.map(|p| p.max_size), Some(16));
    }
}
