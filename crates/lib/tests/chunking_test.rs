//! # DDL Chunking Tests
//!
//! Verifies boundary priorities, merging, size bounds and determinism of the splitter.

mod common;

use common::SHOP_DDL;
use sqlrag::DdlSplitter;

fn without_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_small_schema_stays_in_one_chunk() {
    let splitter = DdlSplitter::default();
    let chunks = splitter.split(SHOP_DDL);
    assert_eq!(chunks, vec![SHOP_DDL.trim().to_string()]);
}

#[test]
fn test_single_table_is_one_chunk() {
    let ddl = "CREATE TABLE users (id INT, name TEXT);";
    let chunks = DdlSplitter::default().chunk(ddl, "schema/ddl.sql");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].id, "ddl_0");
    assert_eq!(chunks[0].text, ddl);
    assert_eq!(chunks[0].source_path, "schema/ddl.sql");
}

#[test]
fn test_splits_on_create_table_boundaries() {
    let splitter = DdlSplitter::new(140).unwrap();
    let chunks = splitter.split(SHOP_DDL);

    assert_eq!(chunks.len(), 3, "one chunk per table: {chunks:#?}");
    assert!(chunks[0].starts_with("CREATE TABLE users"));
    assert!(chunks[1].starts_with("CREATE TABLE orders"));
    assert!(chunks[2].starts_with("CREATE TABLE products"));
    for chunk in &chunks {
        assert!(chunk.ends_with(");"));
        assert!(chunk.chars().count() <= 140);
    }
}

#[test]
fn test_neighbouring_tables_are_merged_up_to_the_limit() {
    let splitter = DdlSplitter::new(240).unwrap();
    let chunks = splitter.split(SHOP_DDL);

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].starts_with("CREATE TABLE users"));
    assert!(chunks[0].contains("CREATE TABLE orders"));
    assert!(chunks[1].starts_with("CREATE TABLE products"));
}

#[test]
fn test_create_table_matching_is_case_insensitive() {
    let ddl = "create table a (x INT);\nCreate Table b (y INT);";
    let chunks = DdlSplitter::new(25).unwrap().split(ddl);
    assert_eq!(chunks, vec!["create table a (x INT);", "Create Table b (y INT);"]);
}

#[test]
fn test_falls_back_to_statement_terminators() {
    let ddl = "INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);\nINSERT INTO t VALUES (3);";
    let chunks = DdlSplitter::new(30).unwrap().split(ddl);
    assert_eq!(
        chunks,
        vec![
            "INSERT INTO t VALUES (1);",
            "INSERT INTO t VALUES (2);",
            "INSERT INTO t VALUES (3);"
        ]
    );
}

#[test]
fn test_oversized_pieces_are_split_by_length() {
    let splitter = DdlSplitter::new(60).unwrap();
    let chunks = splitter.split(SHOP_DDL);

    assert!(chunks.len() > 3);
    for chunk in &chunks {
        assert!(!chunk.is_empty());
        assert_eq!(chunk.trim(), chunk);
        assert!(chunk.chars().count() <= 60, "chunk too long: {chunk:?}");
    }
    // Only whitespace may be lost at the cut points; nothing is reordered.
    assert_eq!(without_whitespace(&chunks.concat()), without_whitespace(SHOP_DDL));
}

#[test]
fn test_text_without_separators_is_split_by_length() {
    let text = "x".repeat(25);
    let chunks = DdlSplitter::new(10).unwrap().split(&text);
    assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
}

#[test]
fn test_blank_input_yields_no_chunks() {
    let splitter = DdlSplitter::default();
    assert!(splitter.split("").is_empty());
    assert!(splitter.split("  \n\t  \n").is_empty());
}

#[test]
fn test_chunking_is_deterministic() {
    let splitter = DdlSplitter::new(100).unwrap();
    let first = splitter.chunk(SHOP_DDL, "schema/ddl.sql");
    let second = splitter.chunk(SHOP_DDL, "schema/ddl.sql");
    assert_eq!(first, second);
    let ids: Vec<_> = first.iter().map(|c| c.id.as_str()).collect();
    let expected: Vec<String> = (0..first.len()).map(|i| format!("ddl_{i}")).collect();
    assert_eq!(ids, expected);
}
