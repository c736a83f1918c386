//! Dialect settings loaded from TOML and the environment

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::defaults;
use crate::dialect::{Dialect, DialectKind, EmptyInsert, KeyRetrieval, PlaceholderStyle};
use crate::error::{Error, Result};

/// Settings selecting the dialect sqlscan renders statements with.
///
/// Every field except `dialect` is an override on top of the family's
/// defaults:
///
/// ```toml
/// dialect = "mysql"
/// quote = '"'
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Dialect family (postgres, mysql, sqlite)
    #[serde(default = "default_dialect")]
    pub dialect: DialectKind,

    /// Identifier quote character
    #[serde(default)]
    pub quote: Option<char>,

    /// Placeholder style (numbered, positional)
    #[serde(default)]
    pub placeholder: Option<PlaceholderStyle>,

    /// How generated keys are read back (returning, last_insert_id)
    #[serde(default)]
    pub key_retrieval: Option<KeyRetrieval>,

    /// How key-only records are inserted (default_values, empty_lists)
    #[serde(default)]
    pub empty_insert: Option<EmptyInsert>,

    /// Log level (trace, debug, info, warn, error) for applications that
    /// build their subscriber from these settings.
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_dialect() -> DialectKind {
    defaults::DIALECT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            quote: None,
            placeholder: None,
            key_retrieval: None,
            empty_insert: None,
            log_level: None,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file and `SQLSCAN_*` environment variables.
    ///
    /// Without a path, `sqlscan.toml` in the working directory is used if it
    /// exists. Environment variables win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name(defaults::CONFIG_FILE).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(defaults::ENV_PREFIX));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(?settings, "loaded sqlscan settings");
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if let Some(quote) = self.quote {
            if quote.is_alphanumeric() || quote.is_whitespace() || quote == '_' {
                return Err(Error::Config(format!(
                    "invalid identifier quote character {:?}",
                    quote
                )));
            }
        }
        Ok(())
    }

    /// The dialect these settings describe.
    pub fn dialect(&self) -> Dialect {
        let mut dialect = Dialect::of(self.dialect);
        if let Some(quote) = self.quote {
            dialect = dialect.with_quote(quote);
        }
        if let Some(placeholder) = self.placeholder {
            dialect = dialect.with_placeholder(placeholder);
        }
        if let Some(key_retrieval) = self.key_retrieval {
            dialect = dialect.with_key_retrieval(key_retrieval);
        }
        if let Some(empty_insert) = self.empty_insert {
            dialect = dialect.with_empty_insert(empty_insert);
        }
        dialect
    }

    /// Install [`Settings::dialect`] as the process-wide dialect.
    pub fn install(&self) -> Result<()> {
        self.validate()?;
        self.dialect().install()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.dialect, DialectKind::Postgres);
        assert_eq!(settings.dialect(), Dialect::postgres());
        assert!(settings.log_level.is_none());
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = Settings::from_toml(
            r#"
            dialect = "mysql"
            log_level = "debug"
        "#,
        )
        .unwrap();
        assert_eq!(settings.dialect(), Dialect::mysql());
        assert_eq!(settings.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_overrides_apply_on_top_of_family() {
        let settings = Settings::from_toml(
            r#"
            dialect = "pg"
            quote = "`"
            placeholder = "positional"
            key_retrieval = "last_insert_id"
            empty_insert = "empty_lists"
        "#,
        )
        .unwrap();
        let dialect = settings.dialect();
        assert_eq!(dialect.quote(), '`');
        assert_eq!(dialect.placeholder_style(), PlaceholderStyle::Positional);
        assert_eq!(dialect.key_retrieval(), KeyRetrieval::LastInsertId);
        assert_eq!(dialect.empty_insert(), EmptyInsert::EmptyLists);
    }

    #[test]
    fn test_invalid_quote_rejected() {
        let err = Settings::from_toml(r#"quote = "a""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        let err = Settings::from_toml(r#"dialect = "oracle""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("sqlscan-{}.toml", std::process::id()));
        std::fs::write(&path, "dialect = \"sqlite\"\nlog_level = \"trace\"\n").unwrap();
        let settings = Settings::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        let settings = settings.unwrap();
        assert_eq!(settings.dialect(), Dialect::sqlite());
        assert_eq!(settings.log_level.as_deref(), Some("trace"));
    }
}
