//! Record trait describing a struct that maps to one table row

use crate::error::Result;
use crate::traits::FromRow;
use crate::value::Value;

/// Static description of one persistable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Rust field name
    pub name: &'static str,
    /// Column the field maps to
    pub column: &'static str,
    /// Whether this field is the integer primary key
    pub primary_key: bool,
}

impl Field {
    /// A regular column.
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            primary_key: false,
        }
    }

    /// The primary-key column.
    pub const fn primary_key(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            primary_key: true,
        }
    }
}

/// A struct that maps to a single table row.
///
/// This trait is typically implemented via `#[derive(Record)]`, next to
/// `#[derive(FromRow)]`. Both derives walk the fields in declaration order
/// and skip fields marked `#[sqlscan(skip)]`, so [`Record::fields`],
/// [`Record::values`] and the columns read by [`FromRow::from_row`] always
/// line up index for index.
///
/// # Attributes
///
/// - `#[sqlscan(pk)]` - The integer primary key (at most one)
/// - `#[sqlscan(rename = "column")]` - Map the field to a different column
/// - `#[sqlscan(skip)]` - Not persisted; default-initialised when scanned
/// - `#[sqlscan(rename_all = "camelCase")]` - Container-level column naming
///
/// # Example
///
/// ```ignore
/// use sqlscan::{FromRow, Record};
///
/// #[derive(FromRow, Record)]
/// pub struct User {
///     #[sqlscan(pk)]
///     pub id: i64,
///     pub name: String,
/// }
/// ```
pub trait Record: FromRow + Send + Sync + 'static {
    /// Persistable fields in declaration order.
    fn fields() -> &'static [Field];

    /// Current values of the persistable fields, in [`Record::fields`] order.
    fn values(&self) -> Vec<Value>;

    /// Store a database-assigned identity into the primary-key field.
    ///
    /// Fails with a mapping error when the type has no primary key or the
    /// identity does not fit the field's type.
    fn set_primary_key(&mut self, id: i64) -> Result<()>;
}
