//! Query Module
//!
//! Condition evaluation and linear table scans.
//!
//! ## Responsibilities
//! - Evaluate [`Condition`]s against decoded rows
//! - Scan every row number of a table, skipping tombstoned rows
//! - Run [`Statement`]s (select / insert / update / delete) on top of scans
//!
//! There is no secondary index: every scan reads the whole table.

mod condition;
mod statement;

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{Result, TableError};
use crate::row::Row;
use crate::table::{RowStore, RowTarget};

pub use condition::{Condition, Operator};
pub use statement::{Statement, StatementType};

/// Live rows satisfying all `conditions`, keyed by row number
///
/// Deleted rows are skipped; any other read error aborts the scan. An empty
/// condition list matches every live row.
pub fn scan<S: RowStore + ?Sized>(
    store: &mut S,
    conditions: &[Condition],
) -> Result<BTreeMap<i64, Row>> {
    let mut matches = BTreeMap::new();
    let count = store.row_count()?;

    for row_number in 0..count {
        let row = match store.read_row(row_number) {
            Ok(row) => row,
            Err(TableError::RowDeleted(_)) => continue,
            Err(e) => return Err(e),
        };

        if conditions.iter().all(|c| c.check(&row)) {
            matches.insert(row_number, row);
        }
    }

    trace!(rows = count, matched = matches.len(), "scan complete");
    Ok(matches)
}

/// Run a statement, returning the rows it selected or touched
///
/// - Select: the matching rows
/// - Insert: the new row under its row number
/// - Update: the replacement row under every row number it was written to
/// - Delete: the removed rows as they were before deletion
pub fn execute<S: RowStore + ?Sized>(
    store: &mut S,
    statement: &Statement,
) -> Result<BTreeMap<i64, Row>> {
    let touched = match statement {
        Statement::Select { conditions } => scan(store, conditions)?,
        Statement::Insert { row } => {
            let row_number = store.write_row(RowTarget::Append, row)?;
            BTreeMap::from([(row_number, row.clone())])
        }
        Statement::Update { conditions, row } => {
            let targets = scan(store, conditions)?;
            let mut updated = BTreeMap::new();
            for row_number in targets.into_keys() {
                store.write_row(RowTarget::At(row_number), row)?;
                updated.insert(row_number, row.clone());
            }
            updated
        }
        Statement::Delete { conditions } => {
            let targets = scan(store, conditions)?;
            for &row_number in targets.keys() {
                store.delete_row(row_number)?;
            }
            targets
        }
    };

    trace!(
        statement = ?statement.statement_type(),
        rows = touched.len(),
        "statement executed"
    );
    Ok(touched)
}
