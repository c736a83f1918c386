//! Default configuration values - single source of truth

use crate::dialect::DialectKind;

/// Dialect family used when none is configured
pub const DIALECT: DialectKind = DialectKind::Postgres;

/// Settings file looked up (without extension) when no path is given
pub const CONFIG_FILE: &str = "sqlscan";

/// Prefix of environment variable overrides (`SQLSCAN_DIALECT`, ...)
pub const ENV_PREFIX: &str = "SQLSCAN";
