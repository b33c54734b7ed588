//! Helpers shared by the SQL-backed processors.

use crate::error::{DashboardError, Result};
use log::warn;

/// Decodes fetched rows, skipping the ones that fail
///
/// A failing row is logged as a `RowDecode` error and left out, so one bad
/// record does not blank a whole table.
pub fn decode_rows<R, T>(
    rows: impl IntoIterator<Item = R>,
    mut decode: impl FnMut(&R) -> std::result::Result<T, sqlx::Error>,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match decode(&row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping row: {}", DashboardError::RowDecode(e));
                None
            }
        })
        .collect()
}

/// Turns the result of a `COUNT(*)` query into a row total
///
/// A missing result is reported as `RowNotFound`; negative counts are clamped
/// to zero.
pub fn expect_count(count: Option<i64>) -> Result<u64> {
    match count {
        Some(count) => Ok(count.max(0) as u64),
        None => Err(DashboardError::DataSource(sqlx::Error::RowNotFound)),
    }
}

/// Converts a row limit or offset into a bind parameter
pub fn to_bind(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
