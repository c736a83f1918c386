//! Row, cursor, and FromRow traits for scanning result sets

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::FromValue;
use crate::value::Value;

/// A single result row with positionally addressed columns.
pub trait Row {
    /// Number of columns in the row.
    fn len(&self) -> usize;

    /// Whether the row has no columns.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the column at `index`, if the driver reported one.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Get the value at `index` as a dynamic Value.
    fn get_value(&self, index: usize) -> Result<Value>;
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Decode the column at `index` into `T`.
    ///
    /// Decode failures name the offending column.
    fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.get_value(index)?;
        T::from_value(value).map_err(|e| match e {
            Error::Decode { expected, actual } => Error::Decode {
                expected,
                actual: format!(
                    "{} in column {}",
                    actual,
                    self.column_name(index)
                        .map(|name| format!("`{}`", name))
                        .unwrap_or_else(|| format!("#{}", index))
                ),
            },
            other => other,
        })
    }
}

impl<R: Row + ?Sized> RowExt for R {}

/// An open result cursor.
///
/// Dropping the cursor releases it; scanners always drain or drop a cursor
/// before returning.
pub trait Rows: Send {
    /// Row type yielded by this cursor.
    type Row: Row + Send;

    /// Advance to the next row. `Ok(None)` means the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Self::Row>>;
}

/// Types that can be decoded from one result row.
///
/// Binding is positional: column `i` of the row feeds the `i`-th
/// persistable field. Typically derived with `#[derive(FromRow)]`; tuples
/// of up to eight [`FromValue`] types also implement it for ad-hoc
/// projections.
///
/// # Manual Implementation
///
/// ```ignore
/// use sqlscan::{FromRow, Row, RowExt, Result};
///
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row<R: Row>(row: &R) -> Result<Self> {
///         sqlscan::traits::expect_columns(row, 2, "User")?;
///         Ok(Self {
///             id: row.get(0)?,
///             name: row.get(1)?,
///         })
///     }
///
///     fn column_names() -> &'static [&'static str] {
///         &["id", "name"]
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a database row.
    fn from_row<R: Row>(row: &R) -> Result<Self>;

    /// Column names in binding order.
    fn column_names() -> &'static [&'static str];
}

/// Fail with a mapping error unless `row` has exactly `expected` columns.
pub fn expect_columns<R: Row + ?Sized>(row: &R, expected: usize, target: &str) -> Result<()> {
    if row.len() != expected {
        return Err(Error::Mapping(format!(
            "{} expects {} columns, result row has {}",
            target,
            expected,
            row.len()
        )));
    }
    Ok(())
}

macro_rules! from_row_tuple {
    ($len:literal => $($ty:ident : $idx:tt),+) => {
        impl<$($ty: FromValue),+> FromRow for ($($ty,)+) {
            fn from_row<R: Row>(row: &R) -> Result<Self> {
                expect_columns(row, $len, "tuple")?;
                Ok(($(row.get::<$ty>($idx)?,)+))
            }

            fn column_names() -> &'static [&'static str] {
                &[]
            }
        }
    };
}

from_row_tuple!(1 => A:0);
from_row_tuple!(2 => A:0, B:1);
from_row_tuple!(3 => A:0, B:1, C:2);
from_row_tuple!(4 => A:0, B:1, C:2, D:3);
from_row_tuple!(5 => A:0, B:1, C:2, D:3, E:4);
from_row_tuple!(6 => A:0, B:1, C:2, D:3, E:4, F:5);
from_row_tuple!(7 => A:0, B:1, C:2, D:3, E:4, F:5, G:6);
from_row_tuple!(8 => A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7);

/// A materialised row: column names shared across the result set plus the
/// values of this row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl ValueRow {
    /// Create a row. `values` is expected to line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// The row's values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Row for ValueRow {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    fn get_value(&self, index: usize) -> Result<Value> {
        self.values.get(index).cloned().ok_or_else(|| {
            Error::Mapping(format!(
                "column index {} out of range for row with {} columns",
                index,
                self.values.len()
            ))
        })
    }
}

/// A cursor over rows that are already in memory.
///
/// Handles that fetch a whole result set at once (and test fakes) can hand
/// this back from [`Db::query`](crate::Db::query).
#[derive(Debug, Clone)]
pub struct ValueRows {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl ValueRows {
    /// Create a cursor over `rows`, each a list of values in `columns` order.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into_iter(),
        }
    }

    /// An exhausted cursor.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new(), Vec::new())
    }
}

impl Rows for ValueRows {
    type Row = ValueRow;

    fn next_row(&mut self) -> Result<Option<ValueRow>> {
        Ok(self
            .rows
            .next()
            .map(|values| ValueRow::new(Arc::clone(&self.columns), values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row(values: Vec<Value>) -> ValueRow {
        let mut cursor = ValueRows::new(["id", "name"], vec![values]);
        cursor.next_row().unwrap().unwrap()
    }

    #[test]
    fn test_tuple_projection() {
        let row = row(vec![Value::I64(3), Value::String("ann".into())]);
        let (id, name) = <(i64, String)>::from_row(&row).unwrap();
        assert_eq!(id, 3);
        assert_eq!(name, "ann");
    }

    #[test]
    fn test_column_count_mismatch() {
        let row = row(vec![Value::I64(3), Value::String("ann".into())]);
        let err = <(i64,)>::from_row(&row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }

    #[test]
    fn test_decode_error_names_column() {
        let row = row(vec![Value::I64(3), Value::Null]);
        let err = row.get::<String>(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("`name`"), "{err}");
    }

    #[test]
    fn test_cursor_exhausts() {
        let mut cursor = ValueRows::new(["n"], vec![vec![Value::I32(1)], vec![Value::I32(2)]]);
        assert!(cursor.next_row().unwrap().is_some());
        assert!(cursor.next_row().unwrap().is_some());
        assert!(cursor.next_row().unwrap().is_none());
        assert!(ValueRows::empty().next_row().unwrap().is_none());
    }
}
