//! Statement definitions
//!
//! Selection, insertion, update and deletion expressed against a table.

use super::Condition;
use crate::row::Row;

/// Statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
}

/// A statement to run with [`execute`](super::execute)
#[derive(Debug, Clone)]
pub enum Statement {
    /// Live rows matching every condition
    Select { conditions: Vec<Condition> },

    /// Append one row
    Insert { row: Row },

    /// Replace every matching row with `row` (unset columns become zero)
    Update { conditions: Vec<Condition>, row: Row },

    /// Tombstone every matching row
    Delete { conditions: Vec<Condition> },
}

impl Statement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            Statement::Select { .. } => StatementType::Select,
            Statement::Insert { .. } => StatementType::Insert,
            Statement::Update { .. } => StatementType::Update,
            Statement::Delete { .. } => StatementType::Delete,
        }
    }
}
