//! MySQL result cursor

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::{Rows, ValueRow};
use mysql_async::Row as MySqlAsyncRow;

use super::types::from_mysql_value;

/// Cursor over a MySQL result set.
///
/// Rows are fetched by the driver up front; each is converted to a
/// [`ValueRow`] only when the cursor reaches it, so a conversion failure
/// surfaces as a cursor error on that row.
pub struct MySqlRows {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<MySqlAsyncRow>,
}

impl MySqlRows {
    pub(crate) fn new(rows: Vec<MySqlAsyncRow>) -> Self {
        let columns: Arc<[String]> = rows
            .first()
            .map(|row| {
                row.columns_ref()
                    .iter()
                    .map(|c| c.name_str().into_owned())
                    .collect()
            })
            .unwrap_or_else(|| Arc::from(Vec::new()));

        Self {
            columns,
            rows: rows.into_iter(),
        }
    }
}

impl Rows for MySqlRows {
    type Row = ValueRow;

    fn next_row(&mut self) -> Result<Option<ValueRow>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };

        let values = (0..row.len())
            .map(|i| {
                let value = row.as_ref(i).cloned().ok_or_else(|| {
                    Error::Mapping(format!("column #{} missing from result row", i))
                })?;
                from_mysql_value(value)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ValueRow::new(Arc::clone(&self.columns), values)))
    }
}
