//! Single-table CRUD over any [`Db`] handle
//!
//! Each operation resolves the record's metadata, renders its statement
//! with the handle's dialect, runs it, and scans the result. Failures come
//! back labelled with the operation and the handle call that failed, e.g.
//! `insert: exec: <driver message>`; use [`Error::kind`] or
//! [`Error::is_not_found`] to classify them.

use tracing::{debug, trace};

use crate::error::{Error, Result, ResultExt};
use crate::fragment;
use crate::meta;
use crate::scan::{scan_all, scan_row};
use crate::traits::{Db, FromRow, Record, RowExt};
use crate::value::Value;

/// Load the row whose primary key is `pk` into `dst`.
///
/// Returns a not-found error (see [`Error::is_not_found`]) and leaves `dst`
/// untouched when no such row exists.
pub async fn load<D, T>(db: &D, table: &str, pk: i64, dst: &mut T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    try_load(db, table, pk, dst).await.context("load")
}

async fn try_load<D, T>(db: &D, table: &str, pk: i64, dst: &mut T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    let meta = meta::resolve::<T>()?;
    let stmt = fragment::select_by_pk(&meta, db.dialect(), table, pk)?;
    debug!(table, pk, sql = %stmt.sql, "load");

    let rows = db.query(&stmt.sql, stmt.params).await.context("query")?;
    scan_row(rows, dst)
}

/// Insert `src` as a new row.
///
/// If the record has a primary key it must be zero; after the insert it
/// holds the identity the database generated. Without a primary key the
/// statement is simply executed.
pub async fn insert<D, T>(db: &D, table: &str, src: &mut T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    try_insert(db, table, src).await.context("insert")
}

async fn try_insert<D, T>(db: &D, table: &str, src: &mut T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    let meta = meta::resolve::<T>()?;
    let values = src.values();
    let pk = meta.primary_key_value(&values)?;
    if let Some(pk) = pk.filter(|&pk| pk != 0) {
        return Err(Error::Validation(format!(
            "primary key must be zero, found {}",
            pk
        )));
    }

    let dialect = db.dialect();
    let stmt = fragment::insert(&meta, dialect, table, values)?;
    debug!(table, sql = %stmt.sql, "insert");
    trace!(params = stmt.params.len(), "insert parameters");

    if pk.is_none() {
        db.exec(&stmt.sql, stmt.params).await.context("exec")?;
        return Ok(());
    }

    let id = if dialect.uses_returning() {
        let row = db
            .query_row(&stmt.sql, stmt.params)
            .await
            .and_then(|row| row.ok_or(Error::NotFound))
            .context("query_row")?;
        row.get::<i64>(0).context("query_row")?
    } else {
        let result = db.exec(&stmt.sql, stmt.params).await.context("exec")?;
        let id = result
            .last_insert_id
            .ok_or_else(|| Error::driver("no generated primary key reported"))
            .context("exec")?;
        i64::try_from(id).map_err(|_| {
            Error::Mapping(format!("generated primary key {} does not fit in i64", id))
        })?
    };

    src.set_primary_key(id)
        .context("saving generated primary key")?;
    debug!(table, id, "insert assigned primary key");
    Ok(())
}

/// Update the row identified by `src`'s primary key, which must be > 0.
///
/// Matching no row is not an error.
pub async fn update<D, T>(db: &D, table: &str, src: &T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    try_update(db, table, src).await.context("update")
}

async fn try_update<D, T>(db: &D, table: &str, src: &T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    let meta = meta::resolve::<T>()?;
    let values = src.values();
    match meta.primary_key_value(&values)? {
        None => {
            return Err(Error::Validation(format!(
                "{} has no primary key field",
                meta.type_name()
            )));
        }
        Some(pk) if pk < 1 => {
            return Err(Error::Validation(format!(
                "primary key must be an integer > 0, found {}",
                pk
            )));
        }
        Some(_) => {}
    }

    let stmt = fragment::update(&meta, db.dialect(), table, values)?;
    debug!(table, sql = %stmt.sql, "update");
    trace!(params = stmt.params.len(), "update parameters");

    let result = db.exec(&stmt.sql, stmt.params).await.context("exec")?;
    trace!(rows_affected = result.rows_affected, "update done");
    Ok(())
}

/// Update `src` if it has a non-zero primary key, insert it otherwise.
pub async fn save<D, T>(db: &D, table: &str, src: &mut T) -> Result<()>
where
    D: Db + ?Sized,
    T: Record,
{
    let meta = meta::resolve::<T>().context("save")?;
    let pk = meta
        .primary_key_value(&src.values())
        .context("save")?
        .unwrap_or(0);

    if pk != 0 {
        update(db, table, src).await
    } else {
        insert(db, table, src).await
    }
}

/// Run `sql` and decode its first row into `dst`.
///
/// `dst` can be any [`FromRow`] shape: a record, a projection struct, or a
/// tuple. Returns a not-found error if the query matched nothing.
pub async fn query_row<D, T>(db: &D, dst: &mut T, sql: &str, params: Vec<Value>) -> Result<()>
where
    D: Db + ?Sized,
    T: FromRow,
{
    debug!(sql, params = params.len(), "query_row");
    let rows = db
        .query(sql, params)
        .await
        .context("query")
        .context("query_row")?;
    scan_row(rows, dst).context("query_row")
}

/// Run `sql` and append every row to `dst`.
///
/// Zero rows leaves `dst` unchanged and succeeds.
pub async fn query_all<D, T>(db: &D, dst: &mut Vec<T>, sql: &str, params: Vec<Value>) -> Result<()>
where
    D: Db + ?Sized,
    T: FromRow,
{
    debug!(sql, params = params.len(), "query_all");
    let rows = db
        .query(sql, params)
        .await
        .context("query")
        .context("query_all")?;
    scan_all(rows, dst).context("query_all")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::ErrorKind;
    use crate::traits::{ExecResult, ValueRows};
    use crate::{FromRow, Record};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default, PartialEq, FromRow, Record)]
    struct User {
        #[sqlscan(pk)]
        id: i64,
        name: String,
        #[sqlscan(skip)]
        note: String,
    }

    #[derive(Debug, Default, FromRow, Record)]
    struct Event {
        kind: String,
    }

    #[derive(Debug, Default, FromRow, Record)]
    struct Ticket {
        #[sqlscan(pk)]
        id: u32,
    }

    #[derive(Debug, Default, FromRow)]
    struct Pair {
        left: i64,
        right: i64,
    }

    impl Record for Pair {
        fn fields() -> &'static [crate::Field] {
            static FIELDS: &[crate::Field] = &[
                crate::Field::primary_key("left", "left"),
                crate::Field::primary_key("right", "right"),
            ];
            FIELDS
        }

        fn values(&self) -> Vec<Value> {
            vec![Value::I64(self.left), Value::I64(self.right)]
        }

        fn set_primary_key(&mut self, id: i64) -> Result<()> {
            self.left = id;
            Ok(())
        }
    }

    struct Fake {
        dialect: Dialect,
        calls: Mutex<Vec<(String, Vec<Value>)>>,
        results: Mutex<VecDeque<ValueRows>>,
        exec: ExecResult,
    }

    impl Fake {
        fn new(dialect: Dialect) -> Self {
            Self {
                dialect,
                calls: Mutex::new(Vec::new()),
                results: Mutex::new(VecDeque::new()),
                exec: ExecResult::default(),
            }
        }

        fn with_rows(self, rows: Vec<Vec<Value>>) -> Self {
            self.results
                .lock()
                .unwrap()
                .push_back(ValueRows::new(["id", "name"], rows));
            self
        }

        fn with_exec(mut self, exec: ExecResult) -> Self {
            self.exec = exec;
            self
        }

        fn calls(&self) -> Vec<(String, Vec<Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Db for Fake {
        type Rows = ValueRows;

        fn dialect(&self) -> &Dialect {
            &self.dialect
        }

        async fn exec(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult> {
            self.calls.lock().unwrap().push((sql.to_string(), params));
            Ok(self.exec)
        }

        async fn query(&self, sql: &str, params: Vec<Value>) -> Result<ValueRows> {
            self.calls.lock().unwrap().push((sql.to_string(), params));
            Ok(self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(ValueRows::empty))
        }
    }

    #[tokio::test]
    async fn test_load_postgres() {
        let db = Fake::new(Dialect::postgres()).with_rows(vec![vec![Value::I64(3), "ann".into()]]);
        let mut user = User::default();
        load(&db, "users", 3, &mut user).await.unwrap();

        assert_eq!(user.id, 3);
        assert_eq!(user.name, "ann");
        assert_eq!(
            db.calls(),
            vec![(
                r#"SELECT "id","name" FROM "users" WHERE "id" = $1"#.to_string(),
                vec![Value::I64(3)]
            )]
        );
    }

    #[tokio::test]
    async fn test_load_missing_row_is_not_found() {
        let db = Fake::new(Dialect::postgres());
        let mut user = User {
            id: 1,
            name: "keep".into(),
            note: String::new(),
        };
        let err = load(&db, "users", 9, &mut user).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(user.name, "keep");
    }

    #[tokio::test]
    async fn test_insert_returning_sets_key() {
        let db = Fake::new(Dialect::postgres()).with_rows(vec![vec![Value::I64(42)]]);
        let mut user = User {
            name: "bo".into(),
            ..Default::default()
        };
        insert(&db, "users", &mut user).await.unwrap();

        assert_eq!(user.id, 42);
        assert_eq!(
            db.calls(),
            vec![(
                r#"INSERT INTO "users" ("name") VALUES ($1) RETURNING "id""#.to_string(),
                vec![Value::from("bo")]
            )]
        );
    }

    #[tokio::test]
    async fn test_insert_last_insert_id() {
        let db = Fake::new(Dialect::mysql()).with_exec(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(7),
        });
        let mut user = User::default();
        insert(&db, "users", &mut user).await.unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(db.calls()[0].0, "INSERT INTO `users` (`name`) VALUES (?)");
    }

    #[tokio::test]
    async fn test_insert_rejects_nonzero_key() {
        let db = Fake::new(Dialect::postgres());
        let mut user = User {
            id: 5,
            ..Default::default()
        };
        let err = insert(&db, "users", &mut user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(db.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insert_without_reported_key_is_driver_error() {
        let db = Fake::new(Dialect::mysql());
        let mut user = User::default();
        let err = insert(&db, "users", &mut user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Driver);
        assert_eq!(user.id, 0);
    }

    #[tokio::test]
    async fn test_insert_keyless_record_just_executes() {
        let db = Fake::new(Dialect::postgres());
        let mut event = Event {
            kind: "login".into(),
        };
        insert(&db, "events", &mut event).await.unwrap();
        assert_eq!(db.calls()[0].0, r#"INSERT INTO "events" ("kind") VALUES ($1)"#);
    }

    #[tokio::test]
    async fn test_update_requires_positive_key() {
        let db = Fake::new(Dialect::postgres());
        let err = update(&db, "users", &User::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().starts_with("update: "));

        let err = update(&db, "events", &Event::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_save_dispatches_on_key() {
        let db = Fake::new(Dialect::mysql()).with_exec(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(11),
        });
        let mut user = User::default();
        save(&db, "users", &mut user).await.unwrap();
        assert_eq!(user.id, 11);

        user.name = "renamed".into();
        save(&db, "users", &mut user).await.unwrap();

        let calls = db.calls();
        assert_eq!(calls[1].0, "UPDATE `users` SET `name`=? WHERE `id`=?");
        assert_eq!(calls[1].1, vec![Value::from("renamed"), Value::I64(11)]);
    }

    #[tokio::test]
    async fn test_query_all_appends_rows() {
        let db = Fake::new(Dialect::postgres()).with_rows(vec![
            vec![Value::I64(1), "a".into()],
            vec![Value::I64(2), "b".into()],
        ]);
        let mut users = vec![User::default()];
        query_all(&db, &mut users, "SELECT id, name FROM users", vec![])
            .await
            .unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[2].name, "b");
    }

    #[tokio::test]
    async fn test_query_row_into_tuple() {
        let db = Fake::new(Dialect::postgres()).with_rows(vec![vec![Value::I64(1), "a".into()]]);
        let mut row = (0_i64, String::new());
        query_row(&db, &mut row, "SELECT id, name FROM users", crate::params![1])
            .await
            .unwrap();
        assert_eq!(row, (1, "a".to_string()));
        assert_eq!(db.calls()[0].1, vec![Value::I32(1)]);
    }

    #[tokio::test]
    async fn test_insert_key_only_record() {
        let db = Fake::new(Dialect::mysql()).with_exec(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(4),
        });
        let mut ticket = Ticket::default();
        insert(&db, "tickets", &mut ticket).await.unwrap();

        assert_eq!(ticket.id, 4);
        assert_eq!(
            db.calls(),
            vec![("INSERT INTO `tickets` () VALUES ()".to_string(), vec![])]
        );
    }

    #[tokio::test]
    async fn test_insert_two_primary_keys_is_mapping_error() {
        let db = Fake::new(Dialect::postgres());
        let mut pair = Pair::default();
        let err = insert(&db, "pairs", &mut pair).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mapping);
        assert!(db.calls().is_empty());
    }
}
