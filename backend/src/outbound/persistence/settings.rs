//! Environment-sourced configuration for the document store.
//!
//! Parsed once at startup through a fail-fast typed step; immutable
//! afterwards. Environment access goes through [`EnvSource`] so tests can
//! substitute a plain map for the process environment.

use std::time::Duration;

use url::Url;

/// Environment variable naming the store connection URI.
pub const URI_ENV: &str = "MONGODB_URI";
/// Environment variable naming the database.
pub const DATABASE_ENV: &str = "MONGODB_DATABASE";
/// Environment variable for the driver's maximum pool size.
pub const MAX_POOL_SIZE_ENV: &str = "MONGODB_MAX_POOL_SIZE";
/// Environment variable for the driver's minimum pool size.
pub const MIN_POOL_SIZE_ENV: &str = "MONGODB_MIN_POOL_SIZE";
/// Environment variable for the connection timeout in milliseconds.
pub const CONNECT_TIMEOUT_MS_ENV: &str = "MONGODB_CONNECT_TIMEOUT_MS";
/// Environment variable for the server selection timeout in milliseconds.
pub const SERVER_SELECTION_TIMEOUT_MS_ENV: &str = "MONGODB_SERVER_SELECTION_TIMEOUT_MS";
/// Environment variable for the idle-connection cutoff in milliseconds.
pub const MAX_IDLE_TIME_MS_ENV: &str = "MONGODB_MAX_IDLE_TIME_MS";

const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_MIN_POOL_SIZE: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);
const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_millis(5_000);
const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_millis(60_000);

/// Source of configuration strings, normally the process environment.
pub trait EnvSource {
    /// Read one variable; `None` when unset or not unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: std::hash::BuildHasher> EnvSource for std::collections::HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Failures raised while assembling [`StoreSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required variable is absent.
    #[error("{name} is not set")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is present but malformed.
    #[error("{name}={value} is invalid, expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },
}

/// Immutable connection settings for one logical store target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    uri: String,
    database: String,
    max_pool_size: u32,
    min_pool_size: u32,
    connect_timeout: Duration,
    server_selection_timeout: Duration,
    max_idle_time: Duration,
}

impl StoreSettings {
    /// Build settings from a URI and database name with default pool sizing.
    ///
    /// The URI must parse and use a `mongodb` or `mongodb+srv` scheme; the
    /// database name must be non-empty.
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let uri = uri.into();
        validate_uri(&uri)?;
        let database = database.into();
        if database.trim().is_empty() {
            return Err(SettingsError::InvalidEnv {
                name: DATABASE_ENV,
                value: database,
                expected: "a non-empty database name",
            });
        }
        Ok(Self {
            uri,
            database,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            server_selection_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
            max_idle_time: DEFAULT_MAX_IDLE_TIME,
        })
    }

    /// Assemble settings from the process environment.
    ///
    /// # Errors
    /// Fails fast with a [`SettingsError`] naming the offending variable;
    /// nothing is defaulted silently except the documented pool values.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_source(&ProcessEnv)
    }

    /// Assemble settings from an arbitrary [`EnvSource`].
    pub fn from_source<E: EnvSource>(env: &E) -> Result<Self, SettingsError> {
        let uri = env
            .var(URI_ENV)
            .ok_or(SettingsError::MissingEnv { name: URI_ENV })?;
        let database = env
            .var(DATABASE_ENV)
            .ok_or(SettingsError::MissingEnv { name: DATABASE_ENV })?;

        let mut settings = Self::new(uri, database)?;
        if let Some(value) = parse_u32(env, MAX_POOL_SIZE_ENV)? {
            settings.max_pool_size = value;
        }
        if let Some(value) = parse_u32(env, MIN_POOL_SIZE_ENV)? {
            settings.min_pool_size = value;
        }
        if let Some(value) = parse_millis(env, CONNECT_TIMEOUT_MS_ENV)? {
            settings.connect_timeout = value;
        }
        if let Some(value) = parse_millis(env, SERVER_SELECTION_TIMEOUT_MS_ENV)? {
            settings.server_selection_timeout = value;
        }
        if let Some(value) = parse_millis(env, MAX_IDLE_TIME_MS_ENV)? {
            settings.max_idle_time = value;
        }
        Ok(settings)
    }

    /// Override the maximum pool size.
    #[must_use]
    pub fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Override the minimum pool size.
    #[must_use]
    pub fn with_min_pool_size(mut self, min_pool_size: u32) -> Self {
        self.min_pool_size = min_pool_size;
        self
    }

    /// Override the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connection URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Database name commands and collections are scoped to.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Maximum driver pool size.
    #[must_use]
    pub const fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }

    /// Minimum driver pool size.
    #[must_use]
    pub const fn min_pool_size(&self) -> u32 {
        self.min_pool_size
    }

    /// Timeout for establishing a single connection.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Timeout for selecting a server to run a command on.
    #[must_use]
    pub const fn server_selection_timeout(&self) -> Duration {
        self.server_selection_timeout
    }

    /// Idle cutoff after which pooled connections are closed.
    #[must_use]
    pub const fn max_idle_time(&self) -> Duration {
        self.max_idle_time
    }
}

fn validate_uri(uri: &str) -> Result<(), SettingsError> {
    let invalid = |value: &str| SettingsError::InvalidEnv {
        name: URI_ENV,
        value: value.to_owned(),
        expected: "a mongodb:// or mongodb+srv:// URI",
    };
    let parsed = Url::parse(uri).map_err(|_| invalid(uri))?;
    match parsed.scheme() {
        "mongodb" | "mongodb+srv" => Ok(()),
        _ => Err(invalid(uri)),
    }
}

fn parse_u32<E: EnvSource>(env: &E, name: &'static str) -> Result<Option<u32>, SettingsError> {
    env.var(name)
        .map(|value| {
            value.parse::<u32>().map_err(|_| SettingsError::InvalidEnv {
                name,
                value,
                expected: "an unsigned integer",
            })
        })
        .transpose()
}

fn parse_millis<E: EnvSource>(
    env: &E,
    name: &'static str,
) -> Result<Option<Duration>, SettingsError> {
    Ok(parse_u32(env, name)?.map(|ms| Duration::from_millis(u64::from(ms))))
}
