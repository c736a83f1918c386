//! Shared helpers for the integration tests: an in-memory handle that
//! records every statement and replays scripted results.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use sqlscan::{Db, Dialect, Error, ExecResult, Result, Settings, Value, ValueRows};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once.
///
/// The level comes from `sqlscan.toml` / `SQLSCAN_LOG_LEVEL`; `RUST_LOG`
/// wins over both.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let level = log_level(Settings::load(None));
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Level named by loaded settings, `warn` when unset or unreadable.
pub fn log_level(settings: Result<Settings>) -> String {
    settings
        .ok()
        .and_then(|settings| settings.log_level)
        .unwrap_or_else(|| "warn".to_string())
}

/// A statement the handle received.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<Value>,
}

/// What the handle answers to the next call.
pub enum Reply {
    Rows(ValueRows),
    Exec(ExecResult),
    Fail(&'static str),
}

/// In-memory [`Db`] with a fixed dialect.
///
/// Calls consume scripted replies in order; once the script runs out,
/// queries return no rows and statements affect nothing.
pub struct MemoryDb {
    dialect: Dialect,
    log: Mutex<Vec<Recorded>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl MemoryDb {
    pub fn new(dialect: Dialect) -> Self {
        init_tracing();
        Self {
            dialect,
            log: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn postgres() -> Self {
        Self::new(Dialect::postgres())
    }

    pub fn mysql() -> Self {
        Self::new(Dialect::mysql())
    }

    /// Script a result set.
    pub fn rows<const N: usize>(self, columns: [&str; N], rows: Vec<Vec<Value>>) -> Self {
        self.reply(Reply::Rows(ValueRows::new(columns, rows)))
    }

    /// Script a statement outcome.
    pub fn exec(self, rows_affected: u64, last_insert_id: Option<u64>) -> Self {
        self.reply(Reply::Exec(ExecResult {
            rows_affected,
            last_insert_id,
        }))
    }

    /// Script a driver failure.
    pub fn fail(self, message: &'static str) -> Self {
        self.reply(Reply::Fail(message))
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Every statement received so far.
    pub fn log(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// SQL text of every statement received so far.
    pub fn sql(&self) -> Vec<String> {
        self.log().into_iter().map(|r| r.sql).collect()
    }

    fn record(&self, sql: &str, params: Vec<Value>) -> Option<Reply> {
        self.log.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params,
        });
        self.replies.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Db for MemoryDb {
    type Rows = ValueRows;

    fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    async fn exec(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult> {
        match self.record(sql, params) {
            None => Ok(ExecResult::default()),
            Some(Reply::Exec(result)) => Ok(result),
            Some(Reply::Fail(message)) => Err(Error::driver(message)),
            Some(Reply::Rows(_)) => Err(Error::driver("scripted rows for an exec call")),
        }
    }

    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<ValueRows> {
        match self.record(sql, params) {
            None => Ok(ValueRows::empty()),
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(message)) => Err(Error::driver(message)),
            Some(Reply::Exec(_)) => Err(Error::driver("scripted exec result for a query")),
        }
    }
}
