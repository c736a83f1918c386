//! Derive macros for the sqlscan record mapping layer
//!
//! This crate provides the following derive macros:
//! - `FromRow` - Decodes result rows into structs, positionally
//! - `Record` - Describes a struct's columns, primary key and values
//!
//! These macros are re-exported from the `sqlscan` crate, so users typically
//! don't need to depend on this crate directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod from_row;
mod record;

/// Derive macro for decoding result rows into structs.
///
/// Column `i` of the row feeds the `i`-th non-skipped field; a row with a
/// different number of columns is a mapping error.
///
/// # Attributes
///
/// - `#[sqlscan(rename = "column_name")]` - Use a different column name for this field
/// - `#[sqlscan(skip)]` - Not read from the row; set to `Default::default()`
/// - `#[sqlscan(pk)]` - Accepted for use with `#[derive(Record)]`
/// - `#[sqlscan(rename_all = "...")]` - On the struct: derive column names
///
/// # Example
///
/// ```ignore
/// use sqlscan::FromRow;
///
/// #[derive(FromRow)]
/// pub struct UserSummary {
///     pub id: i64,
///     #[sqlscan(rename = "user_name")]
///     pub username: String,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(sqlscan))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::derive_from_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive macro for structs persisted to a single table.
///
/// Generates an implementation of the `Record` trait: the static field
/// list, the current values in field order, and primary-key assignment.
/// Use it together with `#[derive(FromRow)]`.
///
/// # Attributes
///
/// - `#[sqlscan(pk)]` - The integer primary key; at most one per struct
/// - `#[sqlscan(rename = "column_name")]` - Use a different column name for this field
/// - `#[sqlscan(skip)]` - Not persisted
/// - `#[sqlscan(rename_all = "snake_case")]` - On the struct: one of `lowercase`,
///   `UPPERCASE`, `snake_case`, `SCREAMING_SNAKE_CASE`, `camelCase`,
///   `PascalCase`, `kebab-case`
///
/// # Example
///
/// ```ignore
/// use sqlscan::{FromRow, Record};
///
/// #[derive(FromRow, Record)]
/// #[sqlscan(rename_all = "camelCase")]
/// pub struct User {
///     #[sqlscan(pk)]
///     pub id: i64,
///     pub display_name: String,
///     #[sqlscan(skip)]
///     pub cached_score: u32,
/// }
/// ```
#[proc_macro_derive(Record, attributes(sqlscan))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
