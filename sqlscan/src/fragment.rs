//! SQL fragment builder: column lists, placeholders, and bound values
//!
//! Everything here is a pure function of record metadata, field values, and
//! a [`Dialect`]. The `include_pk` switch keeps the primary key in the
//! output for reads and drops it for writes, where the key is either
//! server-assigned (INSERT) or bound separately in the WHERE clause
//! (UPDATE).

use crate::dialect::{Dialect, EmptyInsert};
use crate::error::{Error, Result};
use crate::meta::RecordMeta;
use crate::value::Value;

/// The per-call pieces of a statement derived from one record.
///
/// `columns`, `placeholders` and `values` are index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub columns: Vec<String>,
    pub placeholders: Vec<String>,
    pub values: Vec<Value>,
}

impl Fragment {
    /// Build the fragment for `values` (as returned by `Record::values`).
    pub fn new(
        meta: &RecordMeta,
        dialect: &Dialect,
        values: Vec<Value>,
        include_pk: bool,
    ) -> Result<Self> {
        let columns = columns(meta, dialect, include_pk, true);
        let placeholders = placeholders(meta, dialect, include_pk);
        let values = save_values(meta, values, include_pk)?;

        if columns.len() != placeholders.len() || columns.len() != values.len() {
            return Err(Error::Mapping(format!(
                "{}: {} columns, {} placeholders and {} values do not line up",
                meta.type_name(),
                columns.len(),
                placeholders.len(),
                values.len()
            )));
        }

        Ok(Self {
            columns,
            placeholders,
            values,
        })
    }

    /// Columns joined with `,`.
    pub fn column_list(&self) -> String {
        self.columns.join(",")
    }

    /// Placeholders joined with `,`.
    pub fn placeholder_list(&self) -> String {
        self.placeholders.join(",")
    }

    /// `col=ph` pairs joined with `,`, as used in an UPDATE's SET clause.
    pub fn assignments(&self) -> String {
        self.columns
            .iter()
            .zip(&self.placeholders)
            .map(|(column, placeholder)| format!("{}={}", column, placeholder))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A rendered statement and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Column names for `meta`, quoted with the dialect's identifier quote when
/// `quoted` is set.
pub fn columns(
    meta: &RecordMeta,
    dialect: &Dialect,
    include_pk: bool,
    quoted: bool,
) -> Vec<String> {
    meta.fields_filtered(include_pk)
        .map(|f| {
            if quoted {
                dialect.quote_identifier(f.column)
            } else {
                f.column.to_string()
            }
        })
        .collect()
}

/// Quoted column list joined with `,`.
pub fn columns_quoted(meta: &RecordMeta, dialect: &Dialect, include_pk: bool) -> String {
    columns(meta, dialect, include_pk, true).join(",")
}

/// One placeholder per selected field, numbered from 1.
pub fn placeholders(meta: &RecordMeta, dialect: &Dialect, include_pk: bool) -> Vec<String> {
    dialect.placeholders(1, meta.fields_filtered(include_pk).count())
}

/// Placeholders joined with `,`.
pub fn placeholders_string(meta: &RecordMeta, dialect: &Dialect, include_pk: bool) -> String {
    placeholders(meta, dialect, include_pk).join(",")
}

/// Select the values to bind, in the same order as [`columns`].
pub fn save_values(meta: &RecordMeta, values: Vec<Value>, include_pk: bool) -> Result<Vec<Value>> {
    meta.check_values(&values)?;
    Ok(meta
        .fields()
        .iter()
        .zip(values)
        .filter(|(f, _)| include_pk || !f.primary_key)
        .map(|(_, v)| v)
        .collect())
}

/// `SELECT <all cols> FROM <table> WHERE <pk> = <ph1>`.
pub fn select_by_pk(
    meta: &RecordMeta,
    dialect: &Dialect,
    table: &str,
    pk: i64,
) -> Result<Statement> {
    let key = require_primary_key(meta)?;
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        columns_quoted(meta, dialect, true),
        dialect.quote_identifier(table),
        dialect.quote_identifier(key),
        dialect.placeholder(1)
    );
    Ok(Statement {
        sql,
        params: vec![Value::I64(pk)],
    })
}

/// `INSERT INTO <table> (<cols>) VALUES (<phs>)` over the non-key fields.
///
/// A record whose only field is its primary key is inserted with
/// `DEFAULT VALUES` or `() VALUES ()`, as the dialect prefers.
///
/// When the record has a primary key and the dialect reads keys back with
/// `RETURNING`, the clause is appended.
pub fn insert(
    meta: &RecordMeta,
    dialect: &Dialect,
    table: &str,
    values: Vec<Value>,
) -> Result<Statement> {
    let fragment = Fragment::new(meta, dialect, values, false)?;

    // Key-only records let the database fill every column
    let mut sql = match (fragment.columns.is_empty(), dialect.empty_insert()) {
        (true, EmptyInsert::DefaultValues) => {
            format!("INSERT INTO {} DEFAULT VALUES", dialect.quote_identifier(table))
        }
        (true, EmptyInsert::EmptyLists) => {
            format!("INSERT INTO {} () VALUES ()", dialect.quote_identifier(table))
        }
        (false, _) => format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote_identifier(table),
            fragment.column_list(),
            fragment.placeholder_list()
        ),
    };
    if let Some(key) = meta.primary_key() {
        if dialect.uses_returning() {
            sql.push_str(" RETURNING ");
            dialect.write_identifier(&mut sql, key.column);
        }
    }

    Ok(Statement {
        sql,
        params: fragment.values,
    })
}

/// `UPDATE <table> SET c1=ph1,...,cn=phn WHERE <pk>=ph(n+1)`.
///
/// Binds the non-key values followed by the primary-key value.
pub fn update(
    meta: &RecordMeta,
    dialect: &Dialect,
    table: &str,
    values: Vec<Value>,
) -> Result<Statement> {
    let key = require_primary_key(meta)?;
    let key_index = meta.primary_key_index().unwrap_or_default();
    meta.check_values(&values)?;
    let key_value = values[key_index].clone();

    let fragment = Fragment::new(meta, dialect, values, false)?;
    if fragment.columns.is_empty() {
        return Err(Error::Mapping(format!(
            "{} has no columns to update besides its primary key",
            meta.type_name()
        )));
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {}={}",
        dialect.quote_identifier(table),
        fragment.assignments(),
        dialect.quote_identifier(key),
        dialect.placeholder(fragment.placeholders.len() + 1)
    );

    let mut params = fragment.values;
    params.push(key_value);
    Ok(Statement { sql, params })
}

fn require_primary_key(meta: &RecordMeta) -> Result<&'static str> {
    meta.primary_key().map(|f| f.column).ok_or_else(|| {
        Error::Validation(format!("{} has no primary key field", meta.type_name()))
    })
}
