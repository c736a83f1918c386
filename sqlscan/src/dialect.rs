//! SQL dialects: identifier quoting, placeholder syntax, and key retrieval

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How bound parameters are written in statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `$1, $2, ...`
    Numbered,
    /// `?, ?, ...`
    Positional,
}

/// How the generated primary key is read back after an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRetrieval {
    /// Append `RETURNING <pk>` and read the key from the returned row.
    Returning,
    /// Execute the statement and use the driver's last-insert id.
    LastInsertId,
}

/// How an INSERT that binds no columns is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyInsert {
    /// `INSERT INTO t DEFAULT VALUES`
    DefaultValues,
    /// `INSERT INTO t () VALUES ()`
    EmptyLists,
}

/// Named dialect families with their default conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    Mysql,
    Sqlite,
}

/// Statement-rendering conventions for one database family.
///
/// A `Dialect` is a plain value: the fragment builder takes it explicitly
/// and each [`Db`](crate::Db) handle reports the one it speaks, so several
/// dialects can be used side by side. A process-wide default can be
/// installed once at startup for handles that don't pick their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    quote: char,
    placeholder: PlaceholderStyle,
    key_retrieval: KeyRetrieval,
    empty_insert: EmptyInsert,
}

static DEFAULT: Dialect = Dialect::postgres();
static GLOBAL: OnceLock<Dialect> = OnceLock::new();

impl Dialect {
    /// `"ident"`, `$n`, `RETURNING`.
    pub const fn postgres() -> Self {
        Self {
            quote: '"',
            placeholder: PlaceholderStyle::Numbered,
            key_retrieval: KeyRetrieval::Returning,
            empty_insert: EmptyInsert::DefaultValues,
        }
    }

    /// `` `ident` ``, `?`, last-insert id.
    pub const fn mysql() -> Self {
        Self {
            quote: '`',
            placeholder: PlaceholderStyle::Positional,
            key_retrieval: KeyRetrieval::LastInsertId,
            empty_insert: EmptyInsert::EmptyLists,
        }
    }

    /// `"ident"`, `?`, last-insert id.
    pub const fn sqlite() -> Self {
        Self {
            quote: '"',
            placeholder: PlaceholderStyle::Positional,
            key_retrieval: KeyRetrieval::LastInsertId,
            empty_insert: EmptyInsert::DefaultValues,
        }
    }

    /// Default conventions for a dialect family.
    pub const fn of(kind: DialectKind) -> Self {
        match kind {
            DialectKind::Postgres => Self::postgres(),
            DialectKind::Mysql => Self::mysql(),
            DialectKind::Sqlite => Self::sqlite(),
        }
    }

    pub const fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub const fn with_placeholder(mut self, placeholder: PlaceholderStyle) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub const fn with_key_retrieval(mut self, key_retrieval: KeyRetrieval) -> Self {
        self.key_retrieval = key_retrieval;
        self
    }

    pub const fn with_empty_insert(mut self, empty_insert: EmptyInsert) -> Self {
        self.empty_insert = empty_insert;
        self
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder
    }

    pub fn key_retrieval(&self) -> KeyRetrieval {
        self.key_retrieval
    }

    pub fn empty_insert(&self) -> EmptyInsert {
        self.empty_insert
    }

    /// The process-wide dialect.
    ///
    /// Reading it freezes it: once this has been called, [`Dialect::install`]
    /// fails. Falls back to PostgreSQL conventions.
    pub fn global() -> &'static Dialect {
        GLOBAL.get_or_init(|| DEFAULT)
    }

    /// Set the process-wide dialect. Call once at startup, before any
    /// statement is rendered.
    pub fn install(self) -> Result<()> {
        GLOBAL.set(self).map_err(|_| {
            Error::Config("process-wide dialect is already set or has been read".into())
        })?;
        tracing::debug!(dialect = ?self, "installed process-wide dialect");
        Ok(())
    }

    /// Quote an identifier, doubling any embedded quote characters.
    pub fn quote_identifier(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        self.write_identifier(&mut out, ident);
        out
    }

    /// Append a quoted identifier to `out`.
    pub fn write_identifier(&self, out: &mut String, ident: &str) {
        out.push(self.quote);
        for c in ident.chars() {
            if c == self.quote {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.quote);
    }

    /// The placeholder for the `ordinal`-th bound parameter (1-based).
    pub fn placeholder(&self, ordinal: usize) -> String {
        match self.placeholder {
            PlaceholderStyle::Numbered => format!("${}", ordinal),
            PlaceholderStyle::Positional => "?".to_string(),
        }
    }

    /// `count` consecutive placeholders, the first numbered `first`.
    pub fn placeholders(&self, first: usize, count: usize) -> Vec<String> {
        (first..first + count).map(|n| self.placeholder(n)).collect()
    }

    /// Whether INSERT reads the new key through a `RETURNING` clause.
    pub fn uses_returning(&self) -> bool {
        self.key_retrieval == KeyRetrieval::Returning
    }
}

impl Default for Dialect {
    fn default() -> Self {
        DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_placeholders_continue_from_offset() {
        let pg = Dialect::postgres();
        assert_eq!(pg.placeholders(1, 3), vec!["$1", "$2", "$3"]);
        assert_eq!(pg.placeholders(4, 1), vec!["$4"]);
    }

    #[test]
    fn test_positional_placeholders_repeat() {
        assert_eq!(Dialect::mysql().placeholders(1, 3), vec!["?", "?", "?"]);
        assert!(Dialect::sqlite().placeholders(1, 0).is_empty());
    }

    #[test]
    fn test_quote_identifier_escapes_quote_char() {
        assert_eq!(Dialect::postgres().quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::postgres().quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::mysql().quote_identifier("order"), "`order`");
    }

    #[test]
    fn test_overrides() {
        let d = Dialect::of(DialectKind::Sqlite)
            .with_quote('`')
            .with_key_retrieval(KeyRetrieval::Returning);
        assert_eq!(d.quote(), '`');
        assert_eq!(d.placeholder_style(), PlaceholderStyle::Positional);
        assert!(d.uses_returning());
    }

    #[test]
    fn test_global_is_frozen_after_first_read() {
        let first = *Dialect::global();
        assert!(Dialect::mysql().install().is_err());
        assert_eq!(*Dialect::global(), first);
    }
}
