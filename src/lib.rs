//! # tinytable
//!
//! A row-oriented, append-biased storage engine for single-file tables:
//! - Fixed schemas with per-type byte codecs (int64, float64, string, time)
//! - Tombstone-based soft deletion
//! - Static tables: fixed-width rows addressed by arithmetic
//! - Dynamic tables: variable-width rows located through an index file
//! - Linear scans filtered by column conditions
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Query (scan / statements)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Table { Static | Dynamic }                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ StaticTable │          │DynamicTable │
//!   │ (.table)    │          │(.table +    │
//!   │             │          │ .index)     │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!           ┌──────────────────────┐
//!           │ Schema + Column Codec│
//!           └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tinytable::{ColumnDescriptor, Config, Row, RowStore, Schema, Table, TableKind};
//!
//! # fn main() -> tinytable::Result<()> {
//! let config = Config::builder().data_dir("./data").build();
//! let schema = Schema::new(vec![
//!     ColumnDescriptor::int64("id"),
//!     ColumnDescriptor::string("name", 32),
//! ])?;
//!
//! let mut table = Table::create(&config, "people", TableKind::Static, schema)?;
//! let n = table.insert(&Row::new().with("id", 1).with("name", "ada"))?;
//! let row = table.read_row(n)?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod schema;
pub mod row;
pub mod table;
pub mod query;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TableError};
pub use config::{Config, SyncStrategy, TablePaths};
pub use schema::{ColumnDescriptor, ColumnKind, Schema};
pub use row::{Row, Value};
pub use table::{DynamicTable, RowStore, RowTarget, StaticTable, Table, TableKind};
pub use query::{Condition, Operator, Statement};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tinytable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
