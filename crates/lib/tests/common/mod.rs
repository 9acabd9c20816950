#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the integration tests in this crate.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;
use tempfile::{NamedTempFile, TempDir};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Writes `contents` to a temporary `.sql` file that lives as long as the handle.
pub fn ddl_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".sql")
        .tempfile()
        .expect("create temp DDL file");
    file.write_all(contents.as_bytes()).expect("write DDL");
    file
}

/// Creates a directory holding `system.txt` with `contents`.
pub fn prompt_dir(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp prompt dir");
    let path = dir.path().join("system.txt");
    std::fs::write(&path, contents).expect("write prompt");
    (dir, path)
}

pub const SHOP_DDL: &str = "\
CREATE TABLE users (
    id INT PRIMARY KEY,
    name VARCHAR(100),
    email VARCHAR(255)
);

CREATE TABLE orders (
    id INT PRIMARY KEY,
    user_id INT REFERENCES users(id),
    total DECIMAL(10, 2),
    placed_at DATETIME
);

CREATE TABLE products (
    id INT PRIMARY KEY,
    title VARCHAR(200),
    price DECIMAL(10, 2)
);
";
