//! Identifiers that may be interpolated into chart queries.
//!
//! Table and column names are structural SQL and cannot be bound as
//! parameters, so only names listed here are ever written into a query.

use crate::error::{DashboardError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
    static ref CHART_TABLES: HashMap<&'static str, &'static [&'static str]> = {
        let mut tables: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        tables.insert(
            "SampleInvoices",
            &["id", "account_id", "amount", "status", "date"],
        );
        tables.insert("SampleAccounts", &["id", "name", "title"]);
        // per-user tables such as files stay out: chart queries are not scoped to the caller
        tables
    };
}

fn check_syntax(identifier: &str) -> Result<()> {
    if IDENTIFIER_RE.is_match(identifier) {
        Ok(())
    } else {
        Err(DashboardError::UnknownIdentifier(identifier.to_string()))
    }
}

/// Checks that `table` may be charted
pub fn validate_table(table: &str) -> Result<()> {
    check_syntax(table)?;
    if CHART_TABLES.contains_key(table) {
        Ok(())
    } else {
        Err(DashboardError::UnknownIdentifier(table.to_string()))
    }
}

/// Checks that `column` belongs to the chartable `table`
pub fn validate_column(table: &str, column: &str) -> Result<()> {
    validate_table(table)?;
    check_syntax(column)?;
    match CHART_TABLES.get(table) {
        Some(columns) if columns.contains(&column) => Ok(()),
        _ => Err(DashboardError::UnknownIdentifier(format!("{}.{}", table, column))),
    }
}

/// Double-quotes a validated identifier
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}
