//! Row scanner: decode cursors into typed destinations

use crate::error::{Error, Result};
use crate::traits::{FromRow, Rows};

/// Decode the first row of `rows` into `dst`.
///
/// Fails with [`Error::NotFound`] if the cursor is empty. `dst` is only
/// assigned once the whole row decoded, and the cursor is released before
/// returning.
pub fn scan_row<T, R>(rows: R, dst: &mut T) -> Result<()>
where
    T: FromRow,
    R: Rows,
{
    *dst = scan_one(rows)?;
    Ok(())
}

/// Decode the first row of `rows`, or `None` if the cursor is empty.
pub fn scan_optional<T, R>(mut rows: R) -> Result<Option<T>>
where
    T: FromRow,
    R: Rows,
{
    let decoded = match rows.next_row()? {
        Some(row) => Some(T::from_row(&row)?),
        None => None,
    };
    drop(rows);
    Ok(decoded)
}

/// Decode the first row of `rows`, failing with [`Error::NotFound`] if there
/// is none.
pub fn scan_one<T, R>(rows: R) -> Result<T>
where
    T: FromRow,
    R: Rows,
{
    scan_optional(rows)?.ok_or(Error::NotFound)
}

/// Decode every row of `rows` and append them to `dst`.
///
/// An empty cursor is not an error. On failure `dst` is left as it was.
pub fn scan_all<T, R>(mut rows: R, dst: &mut Vec<T>) -> Result<()>
where
    T: FromRow,
    R: Rows,
{
    let mut scanned = Vec::new();
    while let Some(row) = rows.next_row()? {
        scanned.push(T::from_row(&row)?);
    }
    dst.append(&mut scanned);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::traits::{ValueRow, ValueRows};
    use crate::value::Value;

    struct Failing;

    impl Rows for Failing {
        type Row = ValueRow;

        fn next_row(&mut self) -> Result<Option<ValueRow>> {
            Err(Error::driver("cursor broke"))
        }
    }

    fn pairs(rows: Vec<Vec<Value>>) -> ValueRows {
        ValueRows::new(["id", "name"], rows)
    }

    #[test]
    fn test_scan_row_empty_is_not_found() {
        let mut dst = (7_i64, "keep".to_string());
        let err = scan_row(pairs(vec![]), &mut dst).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(dst, (7, "keep".to_string()));
    }

    #[test]
    fn test_scan_row_takes_first_row() {
        let mut dst = (0_i64, String::new());
        let rows = pairs(vec![
            vec![Value::I64(1), "a".into()],
            vec![Value::I64(2), "b".into()],
        ]);
        scan_row(rows, &mut dst).unwrap();
        assert_eq!(dst, (1, "a".to_string()));
    }

    #[test]
    fn test_scan_row_decode_failure_leaves_dst() {
        let mut dst = (0_i64, String::from("keep"));
        let rows = pairs(vec![vec![Value::I64(1), Value::Null]]);
        let err = scan_row(rows, &mut dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(dst.1, "keep");
    }

    #[test]
    fn test_scan_all_zero_rows_is_ok() {
        let mut dst: Vec<(i64, String)> = Vec::new();
        scan_all(pairs(vec![]), &mut dst).unwrap();
        assert!(dst.is_empty());
    }

    #[test]
    fn test_scan_all_appends() {
        let mut dst = vec![(0_i64, "existing".to_string())];
        let rows = pairs(vec![
            vec![Value::I64(1), "a".into()],
            vec![Value::I64(2), "b".into()],
        ]);
        scan_all(rows, &mut dst).unwrap();
        assert_eq!(dst.len(), 3);
        assert_eq!(dst[2], (2, "b".to_string()));
    }

    #[test]
    fn test_scan_all_failure_leaves_dst() {
        let mut dst: Vec<(i64, String)> = Vec::new();
        let rows = pairs(vec![
            vec![Value::I64(1), "a".into()],
            vec![Value::String("x".into()), "b".into()],
        ]);
        assert!(scan_all(rows, &mut dst).is_err());
        assert!(dst.is_empty());
    }

    #[test]
    fn test_cursor_error_passes_through() {
        let mut dst: Vec<(i64,)> = Vec::new();
        let err = scan_all(Failing, &mut dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Driver);
        assert_eq!(err.to_string(), "driver error: cursor broke");
    }
}
