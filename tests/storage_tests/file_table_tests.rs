//! FileTable Tests
//!
//! Tests verify:
//! - Create/open: directory layout, columns file, missing tables
//! - One row file per key at its digest path
//! - Ledger size and fingerprint follow every mutation
//! - Remove deletes the file and prunes an empty shard
//! - Rows survive reopening
//! - Audit reports drift between the ledger and the row files

use std::fs;
use std::path::PathBuf;

use tablekv::fields;
use tablekv::row::codec;
use tablekv::row::Row;
use tablekv::{Config, FileTable, Table, TableError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_config() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().base_dir(temp_dir.path()).build();
    (temp_dir, config)
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn count_row_files(table: &FileTable) -> usize {
    walkdir::WalkDir::new(table.data_dir())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

fn sorted_keys(table: &FileTable) -> Vec<String> {
    let mut keys: Vec<String> = table.rows().unwrap().map(|r| r.unwrap().key).collect();
    keys.sort();
    keys
}

// =============================================================================
// Create/Open Tests
// =============================================================================

#[test]
fn test_create_lays_out_directories() {
    let (_temp, config) = setup_temp_config();
    let table = FileTable::create(&config, "clubs", columns(&["id", "name"])).unwrap();

    let root = config.base_dir.join("clubs");
    assert_eq!(table.root(), root.as_path());
    assert!(root.join("data").is_dir());
    assert!(root.join("metadata").join("columns").is_file());
    assert!(root.join("metadata").join("size").is_file());
    assert!(root.join("metadata").join("fingerprint").is_file());

    assert_eq!(table.size().unwrap(), 0);
    assert_eq!(table.fingerprint().unwrap(), 0);
    assert_eq!(table.degree(), 2);
}

#[test]
fn test_ledger_files_are_big_endian_counters() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();

    let size = fs::read(table.ledger().size_path()).unwrap();
    assert_eq!(size, vec![0, 0, 0, 1]);

    let fingerprint = fs::read(table.ledger().fingerprint_path()).unwrap();
    let expected = Row::new("a", fields![1]).hash32();
    assert_eq!(codec::decode_i32(&fingerprint).unwrap(), expected);
}

#[test]
fn test_open_missing_table() {
    let (_temp, config) = setup_temp_config();
    let result = FileTable::open(&config, "nope");
    assert!(matches!(result, Err(TableError::MissingTable(name)) if name == "nope"));
}

#[test]
fn test_invalid_table_names() {
    let (_temp, config) = setup_temp_config();
    for name in ["", ".", "..", "a/b", "a\\b"] {
        let result = FileTable::create(&config, name, columns(&["k"]));
        assert!(matches!(result, Err(TableError::InvalidArgument(_))), "{:?}", name);
    }
}

#[test]
fn test_open_reads_columns() {
    let (_temp, config) = setup_temp_config();
    FileTable::create(&config, "t", columns(&["Variable", "Type of Club", "Brand"])).unwrap();

    let table = FileTable::open(&config, "t").unwrap();
    assert_eq!(table.columns(), columns(&["Variable", "Type of Club", "Brand"]).as_slice());
    assert_eq!(table.name(), "t");
}

#[test]
fn test_recreate_keeps_rows() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields!["x"]).unwrap();

    let table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    assert_eq!(table.size().unwrap(), 1);
    assert_eq!(table.get("a").unwrap(), Some(fields!["x"]));
}

#[test]
fn test_recreate_with_new_degree_is_rejected() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields!["x"]).unwrap();

    let result = FileTable::create(&config, "t", columns(&["k"]));
    assert!(matches!(result, Err(TableError::InvalidArgument(_))));

    // the stored table is untouched
    let table = FileTable::open(&config, "t").unwrap();
    assert_eq!(table.degree(), 2);
    assert_eq!(table.get("a").unwrap(), Some(fields!["x"]));
}

#[test]
fn test_recreate_same_degree_renames_columns() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields!["x"]).unwrap();

    let table = FileTable::create(&config, "t", columns(&["id", "value"])).unwrap();
    assert_eq!(table.columns(), columns(&["id", "value"]).as_slice());
    assert_eq!(table.get("a").unwrap(), Some(fields!["x"]));
}

#[test]
fn test_recreate_empty_table_with_new_degree() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields!["x"]).unwrap();
    table.remove("a").unwrap();

    let table = FileTable::create(&config, "t", columns(&["k", "v", "w"])).unwrap();
    assert_eq!(table.degree(), 3);
    assert_eq!(table.size().unwrap(), 0);
}

#[test]
fn test_exists_rejects_invalid_names() {
    let temp_dir = TempDir::new().unwrap();
    let outer = Config::builder().base_dir(temp_dir.path()).build();
    FileTable::create(&outer, "x", columns(&["k"])).unwrap();

    // "inner/../x" resolves to the real table once "inner" exists
    fs::create_dir_all(temp_dir.path().join("inner")).unwrap();
    let inner = Config::builder().base_dir(temp_dir.path().join("inner")).build();
    assert!(FileTable::exists(&outer, "x"));
    assert!(!FileTable::exists(&inner, "../x"));
    assert!(!FileTable::exists(&outer, ""));
}

// =============================================================================
// Row File Tests
// =============================================================================

#[test]
fn test_put_writes_one_file_at_digest_path() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k"])).unwrap();

    assert_eq!(table.put("k", fields![]).unwrap(), None);

    let path = table.row_path("k");
    assert!(path.is_file());
    assert_eq!(count_row_files(&table), 1);
    assert_eq!(table.size().unwrap(), 1);
    assert_eq!(table.fingerprint().unwrap(), Row::new("k", fields![]).hash32());

    let decoded = codec::decode_row(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(decoded, Row::new("k", fields![]));
}

#[test]
fn test_hit_and_miss_scenario() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["a", "b"])).unwrap();

    assert_eq!(table.put("x", fields![1]).unwrap(), None);
    assert_eq!(table.put("x", fields![2]).unwrap(), Some(fields![1]));
    assert_eq!(table.get("x").unwrap(), Some(fields![2]));
    assert_eq!(table.remove("x").unwrap(), Some(fields![2]));
    assert_eq!(table.get("x").unwrap(), None);
    assert_eq!(table.size().unwrap(), 0);
    assert_eq!(table.fingerprint().unwrap(), 0);
}

#[test]
fn test_overwrite_keeps_size_and_swaps_hash() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v", "w"])).unwrap();

    table.put("a", fields![1, true]).unwrap();
    table.put("b", fields![2, false]).unwrap();
    table.put("a", fields![3.5, None::<i32>]).unwrap();

    assert_eq!(table.size().unwrap(), 2);
    assert_eq!(count_row_files(&table), 2);
    let expected = Row::new("a", fields![3.5, None::<i32>])
        .hash32()
        .wrapping_add(Row::new("b", fields![2, false]).hash32());
    assert_eq!(table.fingerprint().unwrap(), expected);
}

#[test]
fn test_validation_happens_before_any_write() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["a", "b"])).unwrap();

    assert!(matches!(table.put("", fields![1]), Err(TableError::InvalidArgument(_))));
    assert!(matches!(table.put("k", fields![1, 2]), Err(TableError::InvalidArgument(_))));
    assert!(matches!(
        table.put("k", fields!["x".repeat(70_000)]),
        Err(TableError::InvalidArgument(_))
    ));
    assert!(matches!(table.get(""), Err(TableError::InvalidArgument(_))));
    assert!(matches!(table.remove(""), Err(TableError::InvalidArgument(_))));

    assert_eq!(count_row_files(&table), 0);
    assert_eq!(table.size().unwrap(), 0);
}

#[test]
fn test_remove_deletes_file_and_prunes_shard() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k"])).unwrap();
    table.put("only", fields![]).unwrap();

    let path = table.row_path("only");
    let shard: PathBuf = path.parent().unwrap().to_path_buf();
    assert!(shard.is_dir());

    assert_eq!(table.remove("only").unwrap(), Some(fields![]));
    assert!(!path.exists());
    assert!(!shard.exists());
    assert!(table.data_dir().is_dir());
    assert_eq!(table.remove("only").unwrap(), None);
}

#[test]
fn test_remove_with_drifted_size_is_corruption() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();
    table.ledger().set_size(0).unwrap();

    assert!(matches!(table.remove("a"), Err(TableError::Corruption(_))));
    // nothing was deleted and the count was not clamped
    assert!(table.row_path("a").is_file());
    assert_eq!(table.size().unwrap(), 0);
    assert!(!table.audit().unwrap().is_consistent());
}

#[test]
fn test_get_absent_key() {
    let (_temp, config) = setup_temp_config();
    let table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    assert_eq!(table.get("missing").unwrap(), None);
    assert!(!table.contains("missing").unwrap());
}

#[test]
fn test_row_file_with_wrong_key_is_corruption() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();

    // plant the row for "a" at the path belonging to "b"
    let planted = table.row_path("b");
    fs::create_dir_all(planted.parent().unwrap()).unwrap();
    fs::copy(table.row_path("a"), &planted).unwrap();

    assert!(matches!(table.get("b"), Err(TableError::Corruption(_))));
}

#[test]
fn test_garbage_row_file_is_corruption() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();
    fs::write(table.row_path("a"), b"\x00\x05ab").unwrap();

    assert!(matches!(table.get("a"), Err(TableError::Corruption(_))));
    let results: Vec<_> = table.rows().unwrap().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(TableError::Corruption(_))));
}

// =============================================================================
// Iteration / Clear Tests
// =============================================================================

#[test]
fn test_rows_visits_every_file_once() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    for i in 0..40 {
        table.put(&format!("k{:02}", i), fields![i]).unwrap();
    }
    table.remove("k07").unwrap();

    let expected: Vec<String> = (0..40)
        .filter(|i| *i != 7)
        .map(|i| format!("k{:02}", i))
        .collect();
    assert_eq!(sorted_keys(&table), expected);
}

#[test]
fn test_rows_skips_stray_files() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();

    fs::write(table.data_dir().join("README"), b"not a row").unwrap();
    fs::create_dir_all(table.data_dir().join("zz")).unwrap();
    fs::write(table.data_dir().join("zz").join("notes.txt"), b"nope").unwrap();

    assert_eq!(sorted_keys(&table), vec!["a".to_string()]);
}

#[test]
fn test_clear_removes_rows_and_resets_ledger() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    for i in 0..10 {
        table.put(&format!("k{}", i), fields![i]).unwrap();
    }

    table.clear().unwrap();

    assert_eq!(count_row_files(&table), 0);
    assert_eq!(table.size().unwrap(), 0);
    assert_eq!(table.fingerprint().unwrap(), 0);
    assert_eq!(table.rows().unwrap().count(), 0);
    assert_eq!(table.columns().len(), 2);

    table.put("again", fields![1]).unwrap();
    assert_eq!(table.size().unwrap(), 1);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_rows_survive_reopen() {
    let (_temp, config) = setup_temp_config();
    let fingerprint = {
        let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
        for i in 0..20 {
            table.put(&format!("k{}", i), fields![format!("v{}", i)]).unwrap();
        }
        table.remove("k3").unwrap();
        table.fingerprint().unwrap()
    };

    let table = FileTable::open(&config, "t").unwrap();
    assert_eq!(table.size().unwrap(), 19);
    assert_eq!(table.fingerprint().unwrap(), fingerprint);
    assert_eq!(table.get("k5").unwrap(), Some(fields!["v5"]));
    assert_eq!(table.get("k3").unwrap(), None);
}

#[test]
fn test_sync_writes_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .base_dir(temp_dir.path())
        .sync_writes(true)
        .build();

    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();
    assert_eq!(table.get("a").unwrap(), Some(fields![1]));
}

// =============================================================================
// Audit Tests
// =============================================================================

#[test]
fn test_audit_consistent_after_mutations() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    for i in 0..15 {
        table.put(&format!("k{}", i), fields![i]).unwrap();
    }
    table.put("k1", fields![100]).unwrap();
    table.remove("k2").unwrap();

    let audit = table.audit().unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.actual_size, 14);
    assert_eq!(audit.actual_fingerprint, table.fingerprint().unwrap());
}

#[test]
fn test_audit_detects_file_deleted_behind_ledger() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();
    table.put("b", fields![2]).unwrap();

    fs::remove_file(table.row_path("a")).unwrap();

    let audit = table.audit().unwrap();
    assert!(!audit.is_consistent());
    assert_eq!(audit.recorded_size, 2);
    assert_eq!(audit.actual_size, 1);
    assert_eq!(audit.actual_fingerprint, Row::new("b", fields![2]).hash32());
    assert!(audit.misplaced.is_empty());
}

#[test]
fn test_audit_reports_misplaced_rows() {
    let (_temp, config) = setup_temp_config();
    let mut table = FileTable::create(&config, "t", columns(&["k", "v"])).unwrap();
    table.put("a", fields![1]).unwrap();

    let planted = table.row_path("b");
    fs::create_dir_all(planted.parent().unwrap()).unwrap();
    fs::copy(table.row_path("a"), &planted).unwrap();

    let audit = table.audit().unwrap();
    assert_eq!(audit.misplaced, vec![planted]);
    assert!(!audit.is_consistent());
}
