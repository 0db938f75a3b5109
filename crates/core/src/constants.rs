//! Constants used throughout the PSB core crate.
//!
//! Collection names, defaults and environment variable names live here so the runner, the CLI
//! and the store backends agree on them.

/// Collection holding ingredient documents.
pub const INGREDIENTS_COLLECTION: &str = "psb_ingredients";

/// Collection holding premade sandwich documents.
pub const SANDWICHES_COLLECTION: &str = "psb_premade";

/// Database used when `DB_NAME` is not configured.
pub const DEFAULT_DB_NAME: &str = "psdb";

/// Database that receives the connectivity `ping` command.
pub const ADMIN_DB_NAME: &str = "admin";

/// Address the REST server binds when `PSB_REST_ADDR` is not configured.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8001";

pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_CLUSTER_HOST: &str = "DB_CLUSTER_HOST";
pub const ENV_DB_APP_NAME: &str = "DB_APP_NAME";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_STORE_BACKEND: &str = "PSB_STORE";

/// Error text reported when any of the required database settings is absent.
pub const MISSING_DB_ENV_MESSAGE: &str = "One or more DB environment variables (DB_USER, DB_PASSWORD, DB_CLUSTER_HOST, DB_APP_NAME) not set.";
