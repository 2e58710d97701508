//! Row conditions
//!
//! A condition compares one column of a row against a literal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::TableError;
use crate::row::{Row, Value};

/// Comparison applied by a [`Condition`]
///
/// Strings only support `Equal`; any other operator never matches a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "Equal",
            Operator::LessThan => "LessThan",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThanOrEqual => "LessThanOrEqual",
            Operator::GreaterThanOrEqual => "GreaterThanOrEqual",
        }
    }

    /// Whether `value` compared to the literal (`value.cmp(literal)`) passes
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Equal" => Ok(Operator::Equal),
            "LessThan" => Ok(Operator::LessThan),
            "GreaterThan" => Ok(Operator::GreaterThan),
            "LessThanOrEqual" => Ok(Operator::LessThanOrEqual),
            "GreaterThanOrEqual" => Ok(Operator::GreaterThanOrEqual),
            other => Err(TableError::Schema(format!("unknown operator '{}'", other))),
        }
    }
}

/// `column <operator> literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub literal: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, literal: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            literal: literal.into(),
        }
    }

    pub fn eq(column: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::new(column, Operator::Equal, literal)
    }

    pub fn lt(column: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::new(column, Operator::LessThan, literal)
    }

    pub fn gt(column: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::new(column, Operator::GreaterThan, literal)
    }

    pub fn le(column: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::new(column, Operator::LessThanOrEqual, literal)
    }

    pub fn ge(column: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::new(column, Operator::GreaterThanOrEqual, literal)
    }

    /// Evaluate against a row
    ///
    /// False when the column is missing from the row or holds a different
    /// kind of value than the literal.
    pub fn check(&self, row: &Row) -> bool {
        let Some(value) = row.get(&self.column) else {
            return false;
        };

        match (value, &self.literal) {
            (Value::Int64(v), Value::Int64(lit)) => self.operator.accepts(v.cmp(lit)),
            (Value::Float64(v), Value::Float64(lit)) => v
                .partial_cmp(lit)
                .map_or(false, |ordering| self.operator.accepts(ordering)),
            (Value::String(v), Value::String(lit)) => {
                self.operator == Operator::Equal && v == lit
            }
            (Value::Timestamp(v), Value::Timestamp(lit)) => {
                // literal - value: positive means the value is earlier
                let delta = lit.signed_duration_since(*v);
                self.operator.accepts(TimeDelta::zero().cmp(&delta))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.literal)
    }
}
