//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and the
//! services. Request handlers never read process-wide environment variables; only
//! [`CoreConfig::from_env`] touches the environment, and it delegates to pure constructors so
//! the validation rules can be tested without mutating the process environment.

use crate::constants::{
    DEFAULT_DB_NAME, ENV_DB_APP_NAME, ENV_DB_CLUSTER_HOST, ENV_DB_NAME, ENV_DB_PASSWORD,
    ENV_DB_USER, ENV_STORE_BACKEND, MISSING_DB_ENV_MESSAGE,
};
use crate::{CatalogError, CatalogResult};
use std::str::FromStr;

/// Which document store backs the services.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote MongoDB cluster reached over `mongodb+srv`.
    #[default]
    Mongo,
    /// Process-local store, useful for development and tests.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => Err(CatalogError::Config(format!(
                "unsupported store backend '{other}' (expected 'mongo' or 'memory')"
            ))),
        }
    }
}

/// Connection settings for the MongoDB backend.
#[derive(Clone)]
pub struct StoreConfig {
    user: String,
    password: String,
    cluster_host: String,
    app_name: String,
    db_name: String,
}

impl StoreConfig {
    /// Build a `StoreConfig` from raw (possibly missing) values.
    ///
    /// `user`, `password`, `cluster_host` and `app_name` are required; blank values count as
    /// missing. `db_name` falls back to [`DEFAULT_DB_NAME`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Config` if any required value is missing.
    pub fn from_env_values(
        user: Option<String>,
        password: Option<String>,
        cluster_host: Option<String>,
        app_name: Option<String>,
        db_name: Option<String>,
    ) -> CatalogResult<Self> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        match (
            present(user),
            present(password),
            present(cluster_host),
            present(app_name),
        ) {
            (Some(user), Some(password), Some(cluster_host), Some(app_name)) => Ok(Self {
                user,
                password,
                cluster_host: cluster_host.trim().to_string(),
                app_name,
                db_name: present(db_name).unwrap_or_else(|| DEFAULT_DB_NAME.into()),
            }),
            _ => Err(CatalogError::Config(MISSING_DB_ENV_MESSAGE.into())),
        }
    }

    /// Connection string for the cluster.
    ///
    /// Credentials are deliberately absent; they are attached to the driver options as a
    /// credential so the string can be logged.
    pub fn connection_uri(&self) -> String {
        format!(
            "mongodb+srv://{}/{}?retryWrites=true&w=majority",
            self.cluster_host, self.db_name
        )
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("cluster_host", &self.cluster_host)
            .field("app_name", &self.app_name)
            .field("db_name", &self.db_name)
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_backend: StoreBackend,
    store: Option<StoreConfig>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Config` when the Mongo backend is selected without connection
    /// settings.
    pub fn new(store_backend: StoreBackend, store: Option<StoreConfig>) -> CatalogResult<Self> {
        if store_backend == StoreBackend::Mongo && store.is_none() {
            return Err(CatalogError::Config(MISSING_DB_ENV_MESSAGE.into()));
        }

        Ok(Self {
            store_backend,
            store,
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// Database settings are only required (and only validated) for the Mongo backend.
    pub fn from_env() -> CatalogResult<Self> {
        let var = |key: &str| std::env::var(key).ok();

        let store_backend = store_backend_from_env_value(var(ENV_STORE_BACKEND))?;
        let store = match store_backend {
            StoreBackend::Mongo => Some(StoreConfig::from_env_values(
                var(ENV_DB_USER),
                var(ENV_DB_PASSWORD),
                var(ENV_DB_CLUSTER_HOST),
                var(ENV_DB_APP_NAME),
                var(ENV_DB_NAME),
            )?),
            StoreBackend::Memory => None,
        };

        Self::new(store_backend, store)
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    pub fn store(&self) -> Option<&StoreConfig> {
        self.store.as_ref()
    }
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StoreBackend::Mongo`].
pub fn store_backend_from_env_value(value: Option<String>) -> CatalogResult<StoreBackend> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse::<StoreBackend>())
        .transpose()
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> [Option<String>; 5] {
        [
            Some("deli".into()),
            Some("p@ss word".into()),
            Some("cluster0.example.mongodb.net".into()),
            Some("psb".into()),
            None,
        ]
    }

    #[test]
    fn test_store_config_defaults_db_name() {
        let [user, password, host, app, db] = values();
        let cfg = StoreConfig::from_env_values(user, password, host, app, db)
            .expect("complete values should be accepted");

        assert_eq!(cfg.db_name(), DEFAULT_DB_NAME);
        assert_eq!(
            cfg.connection_uri(),
            "mongodb+srv://cluster0.example.mongodb.net/psdb?retryWrites=true&w=majority"
        );
    }

    #[test]
    fn test_store_config_rejects_missing_values() {
        let [user, _, host, app, db] = values();
        let err = StoreConfig::from_env_values(user, Some("   ".into()), host, app, db)
            .expect_err("blank password should be rejected");

        assert_eq!(err.to_string(), MISSING_DB_ENV_MESSAGE);
    }

    #[test]
    fn test_debug_redacts_password() {
        let [user, password, host, app, db] = values();
        let cfg = StoreConfig::from_env_values(user, password, host, app, db)
            .expect("complete values should be accepted");

        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("p@ss word"));
    }

    #[test]
    fn test_store_backend_from_env_value() {
        assert_eq!(
            store_backend_from_env_value(None).expect("default"),
            StoreBackend::Mongo
        );
        assert_eq!(
            store_backend_from_env_value(Some(" Memory ".into())).expect("memory"),
            StoreBackend::Memory
        );
        assert!(store_backend_from_env_value(Some("redis".into())).is_err());
    }

    #[test]
    fn test_core_config_requires_store_for_mongo() {
        assert!(CoreConfig::new(StoreBackend::Mongo, None).is_err());

        let cfg = CoreConfig::new(StoreBackend::Memory, None).expect("memory needs no settings");
        assert!(cfg.store().is_none());
    }
}
