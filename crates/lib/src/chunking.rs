//! # DDL Chunking
//!
//! Splits a DDL document into bounded chunks for embedding. Splitting is recursive
//! and priority-ordered: `CREATE TABLE` boundaries first, then statement terminators,
//! then a raw length split for anything still too long. Neighbouring small pieces are
//! merged back together up to the size limit so a table definition stays whole when
//! it fits.

use crate::{constants::DEFAULT_CHUNK_SIZE, errors::RagError, types::DdlChunk};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcreate\s+table\b").expect("valid CREATE TABLE regex"));
static STATEMENT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(";").expect("valid terminator regex"));

/// Which side of a split the matched separator stays attached to.
#[derive(Debug, Clone, Copy)]
enum Keep {
    /// The separator opens the following piece (`CREATE TABLE ...`).
    Leading,
    /// The separator closes the preceding piece (`...;`).
    Trailing,
}

struct Separator {
    pattern: &'static LazyLock<Regex>,
    keep: Keep,
}

static SEPARATORS: [Separator; 2] = [
    Separator {
        pattern: &CREATE_TABLE,
        keep: Keep::Leading,
    },
    Separator {
        pattern: &STATEMENT_END,
        keep: Keep::Trailing,
    },
];

/// A recursive splitter tuned for SQL schema documents.
#[derive(Debug, Clone, Copy)]
pub struct DdlSplitter {
    chunk_size: usize,
}

impl Default for DdlSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DdlSplitter {
    /// Creates a splitter producing chunks of at most `chunk_size` characters.
    pub fn new(chunk_size: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits `text` into trimmed, non-empty pieces of at most `chunk_size` characters.
    ///
    /// The output depends only on the input and the chunk size.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    /// Splits `text` and labels the pieces as chunks `ddl_0`, `ddl_1`, ... from `source`.
    pub fn chunk(&self, text: &str, source: &str) -> Vec<DdlChunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| DdlChunk {
                id: format!("ddl_{i}"),
                text,
                source_path: source.to_string(),
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        // Use the first separator that occurs in the text; the rest are kept for
        // pieces that are still too long.
        let position = separators.iter().position(|s| s.pattern.is_match(text));
        let Some(index) = position else {
            return self.split_by_length(text);
        };
        let separator = &separators[index];
        let remaining = &separators[index + 1..];

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if remaining.is_empty() {
                chunks.extend(self.split_by_length(piece));
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }
        chunks
    }

    /// Greedily concatenates consecutive pieces while the total stays within bounds.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;
        for piece in pieces {
            let len = char_len(piece);
            if current_len + len > self.chunk_size && !current.is_empty() {
                push_trimmed(&mut merged, &current);
                current.clear();
                current_len = 0;
            }
            current.push_str(piece);
            current_len += len;
        }
        if !current.is_empty() {
            push_trimmed(&mut merged, &current);
        }
        merged
    }

    /// Last resort for text with no usable separator: fixed windows of `chunk_size`.
    fn split_by_length(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            let mut out = Vec::new();
            push_trimmed(&mut out, text);
            return out;
        }
        warn!(
            chunk_size = self.chunk_size,
            "DDL piece has no statement boundary within the chunk size; splitting by length"
        );
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        for window in chars.chunks(self.chunk_size) {
            let piece: String = window.iter().collect();
            push_trimmed(&mut out, &piece);
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Splits `text` at every match of `separator`, keeping the match on the configured side.
fn split_keeping<'a>(text: &'a str, separator: &Separator) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for m in separator.pattern.find_iter(text) {
        let cut = match separator.keep {
            Keep::Leading => m.start(),
            Keep::Trailing => m.end(),
        };
        if cut > start {
            pieces.push(&text[start..cut]);
        }
        start = cut;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
