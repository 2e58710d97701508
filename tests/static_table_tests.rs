//! Tests for the static table engine
//!
//! These tests verify:
//! - Table creation and reopening
//! - Append, overwrite and read by row number
//! - Tombstone deletion
//! - Bounds and header validation
//! - Rejected rows leave the file untouched

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};

use chrono::{FixedOffset, TimeZone};
use tempfile::TempDir;
use tinytable::codec::varint;
use tinytable::{
    ColumnDescriptor, Config, Row, RowStore, RowTarget, Schema, StaticTable, TableError, Value,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_config() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    (temp_dir, config)
}

fn scenario_schema() -> Schema {
    Schema::new(vec![
        ColumnDescriptor::int64("intline"),
        ColumnDescriptor::float64("floatline"),
        ColumnDescriptor::string("strline", 256),
        ColumnDescriptor::timestamp("dateline"),
    ])
    .unwrap()
}

fn create_table(config: &Config, name: &str) -> StaticTable {
    StaticTable::create(config, config.table_paths(name), scenario_schema()).unwrap()
}

fn sample_row(n: i64) -> Row {
    let when = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2023, 1, 1 + n as u32, 8, 0, 0)
        .unwrap();
    Row::new()
        .with("intline", n * 100)
        .with("floatline", n as f64 + 0.5)
        .with("strline", format!("row {}", n))
        .with("dateline", when)
}

// =============================================================================
// Creation Tests
// =============================================================================

#[test]
fn test_create_writes_config_and_header() {
    let (_temp, config) = setup_config();
    let table = create_table(&config, "t");
    let paths = table.paths().clone();
    table.close().unwrap();

    let json = fs::read_to_string(&paths.config).unwrap();
    assert_eq!(Schema::from_json(&json).unwrap(), scenario_schema());

    let data = fs::read(&paths.data).unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data, varint::varint_slot(1).to_vec());
    assert!(!paths.index.exists());
}

#[test]
fn test_create_twice_fails() {
    let (_temp, config) = setup_config();
    create_table(&config, "t").close().unwrap();

    let result = StaticTable::create(&config, config.table_paths("t"), scenario_schema());
    assert!(matches!(result, Err(TableError::AlreadyExists(_))));
}

#[test]
fn test_create_rejects_flexible_columns() {
    let (_temp, config) = setup_config();
    let schema = Schema::new(vec![ColumnDescriptor::flexible_string("s")]).unwrap();

    let result = StaticTable::create(&config, config.table_paths("t"), schema);
    assert!(matches!(result, Err(TableError::Schema(_))));
    assert!(!config.table_paths("t").data.exists());
}

// =============================================================================
// Read/Write Tests
// =============================================================================

#[test]
fn test_append_and_read_back() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    for n in 0..3 {
        assert_eq!(table.write_row(RowTarget::Append, &sample_row(n)).unwrap(), n);
    }
    assert_eq!(table.row_count().unwrap(), 3);

    for n in 0..3 {
        assert_eq!(table.read_row(n).unwrap(), sample_row(n));
    }
}

#[test]
fn test_file_length_is_header_plus_rows() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");
    let row_width = table.schema().row_width() as u64;

    for n in 0..4 {
        table.write_row(RowTarget::Append, &sample_row(n)).unwrap();
    }

    let len = fs::metadata(&table.paths().data).unwrap().len();
    assert_eq!(len, 10 + 4 * row_width);
}

#[test]
fn test_missing_columns_read_as_zero_values() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    table
        .write_row(RowTarget::Append, &Row::new().with("intline", 7))
        .unwrap();
    let row = table.read_row(0).unwrap();

    assert_eq!(row.get("intline"), Some(&Value::Int64(7)));
    assert_eq!(row.get("floatline"), Some(&Value::Float64(0.0)));
    assert_eq!(row.get("strline"), Some(&Value::from("")));
    assert_eq!(
        row.get("dateline").unwrap().as_timestamp().unwrap().to_rfc3339(),
        "0001-01-01T00:00:00+00:00"
    );
}

#[test]
fn test_overwrite_in_place() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
    table.write_row(RowTarget::Append, &sample_row(1)).unwrap();

    assert_eq!(table.write_row(RowTarget::At(0), &sample_row(9)).unwrap(), 0);
    assert_eq!(table.row_count().unwrap(), 2);
    assert_eq!(table.read_row(0).unwrap(), sample_row(9));
    assert_eq!(table.read_row(1).unwrap(), sample_row(1));
}

#[test]
fn test_unknown_columns_are_ignored() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    let row = sample_row(1).with("extra", 5);
    table.write_row(RowTarget::Append, &row).unwrap();

    let read = table.read_row(0).unwrap();
    assert!(!read.contains("extra"));
    assert_eq!(read, sample_row(1));
}

// =============================================================================
// Bounds Tests
// =============================================================================

#[test]
fn test_out_of_range_row_numbers() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");
    table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
    table.write_row(RowTarget::Append, &sample_row(1)).unwrap();

    assert!(matches!(
        table.write_row(RowTarget::At(5), &sample_row(5)),
        Err(TableError::OutOfRange { row: 5, count: 2 })
    ));
    assert!(matches!(
        table.write_row(RowTarget::At(2), &sample_row(2)),
        Err(TableError::OutOfRange { .. })
    ));
    assert!(matches!(table.read_row(-1), Err(TableError::OutOfRange { .. })));
    assert!(matches!(table.read_row(2), Err(TableError::OutOfRange { .. })));
    assert!(matches!(table.delete_row(2), Err(TableError::OutOfRange { .. })));
    assert_eq!(table.row_count().unwrap(), 2);
}

#[test]
fn test_empty_table_has_no_rows() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    assert_eq!(table.row_count().unwrap(), 0);
    assert!(matches!(table.read_row(0), Err(TableError::OutOfRange { .. })));
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[test]
fn test_delete_tombstones_row() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");
    table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
    table.write_row(RowTarget::Append, &sample_row(1)).unwrap();

    table.delete_row(0).unwrap();

    assert!(matches!(table.read_row(0), Err(TableError::RowDeleted(0))));
    assert_eq!(table.read_row(1).unwrap(), sample_row(1));
    assert_eq!(table.row_count().unwrap(), 2);

    // Deleting again is harmless
    table.delete_row(0).unwrap();
    assert!(matches!(table.read_row(0), Err(TableError::RowDeleted(0))));
}

#[test]
fn test_delete_only_touches_tombstone_byte() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");
    table.write_row(RowTarget::Append, &sample_row(3)).unwrap();

    let before = fs::read(&table.paths().data).unwrap();
    table.delete_row(0).unwrap();
    let after = fs::read(&table.paths().data).unwrap();

    assert_eq!(before.len(), after.len());
    assert_eq!(before[10], 1);
    assert_eq!(after[10], 0);
    assert_eq!(before[11..], after[11..]);
}

#[test]
fn test_overwrite_revives_deleted_row() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");
    table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
    table.delete_row(0).unwrap();

    table.write_row(RowTarget::At(0), &sample_row(4)).unwrap();
    assert_eq!(table.read_row(0).unwrap(), sample_row(4));
}

// =============================================================================
// Rejected Write Tests
// =============================================================================

#[test]
fn test_oversized_string_leaves_table_unchanged() {
    let (_temp, config) = setup_config();
    let schema = Schema::new(vec![
        ColumnDescriptor::int64("intline"),
        ColumnDescriptor::string("strline", 10),
    ])
    .unwrap();
    let mut table = StaticTable::create(&config, config.table_paths("t"), schema).unwrap();
    table
        .write_row(RowTarget::Append, &Row::new().with("intline", 1).with("strline", "ok"))
        .unwrap();
    let before = fs::read(&table.paths().data).unwrap();

    let long = Row::new()
        .with("intline", 2)
        .with("strline", "this string is far too long");
    let result = table.write_row(RowTarget::Append, &long);

    assert!(matches!(result, Err(TableError::TypeMismatch { .. })));
    assert_eq!(table.row_count().unwrap(), 1);
    assert_eq!(fs::read(&table.paths().data).unwrap(), before);
}

#[test]
fn test_wrong_kind_is_rejected() {
    let (_temp, config) = setup_config();
    let mut table = create_table(&config, "t");

    let result = table.write_row(
        RowTarget::Append,
        &Row::new().with("floatline", "not a float"),
    );

    assert!(matches!(result, Err(TableError::TypeMismatch { .. })));
    assert_eq!(table.row_count().unwrap(), 0);
}

// =============================================================================
// Reopen Tests
// =============================================================================

#[test]
fn test_reopen_keeps_rows() {
    let (_temp, config) = setup_config();
    {
        let mut table = create_table(&config, "t");
        table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
        table.write_row(RowTarget::Append, &sample_row(1)).unwrap();
        table.delete_row(1).unwrap();
        table.close().unwrap();
    }

    let mut table = StaticTable::open(&config, config.table_paths("t")).unwrap();
    assert_eq!(table.schema(), &scenario_schema());
    assert_eq!(table.row_count().unwrap(), 2);
    assert_eq!(table.read_row(0).unwrap(), sample_row(0));
    assert!(matches!(table.read_row(1), Err(TableError::RowDeleted(1))));

    assert_eq!(table.write_row(RowTarget::Append, &sample_row(2)).unwrap(), 2);
}

#[test]
fn test_open_missing_table_fails() {
    let (_temp, config) = setup_config();
    let result = StaticTable::open(&config, config.table_paths("absent"));
    assert!(matches!(result, Err(TableError::Io(_))));
}

#[test]
fn test_open_rejects_wrong_version() {
    let (_temp, config) = setup_config();
    create_table(&config, "t").close().unwrap();

    let paths = config.table_paths("t");
    let mut file = OpenOptions::new().write(true).open(&paths.data).unwrap();
    file.write_all(&varint::varint_slot(7)).unwrap();
    drop(file);

    match StaticTable::open(&config, paths) {
        Err(TableError::VersionMismatch { found, .. }) => assert_eq!(found, 7),
        other => panic!("Expected VersionMismatch, got {:?}", other),
    }
}

#[test]
fn test_partial_trailing_row_is_ignored() {
    let (_temp, config) = setup_config();
    {
        let mut table = create_table(&config, "t");
        table.write_row(RowTarget::Append, &sample_row(0)).unwrap();
        table.close().unwrap();
    }

    let paths = config.table_paths("t");
    let mut file = OpenOptions::new().write(true).open(&paths.data).unwrap();
    file.seek(SeekFrom::End(0)).unwrap();
    file.write_all(&[1, 2, 3]).unwrap();
    drop(file);

    let mut table = StaticTable::open(&config, paths).unwrap();
    assert_eq!(table.row_count().unwrap(), 1);
    assert_eq!(table.read_row(0).unwrap(), sample_row(0));
}
