use crate::errors::RagError;

/// Leading keywords accepted as a SQL statement when strict validation is on.
pub const SQL_STATEMENT_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "with", "create", "alter",
];

/// Checks whether the first word of `sql` is a recognized statement keyword.
///
/// Opening parentheses are skipped so `(SELECT ...) UNION (...)` is accepted.
pub fn is_recognized_statement(sql: &str) -> bool {
    let body = sql.trim_start().trim_start_matches(['(', ' ', '\t', '\n']);
    let first_word: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    SQL_STATEMENT_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(&first_word))
}

/// Returns `MalformedGeneration` unless `sql` starts with a recognized keyword.
pub fn validate_statement(sql: &str) -> Result<(), RagError> {
    if is_recognized_statement(sql) {
        Ok(())
    } else {
        let preview: String = sql.chars().take(120).collect();
        Err(RagError::MalformedGeneration(preview))
    }
}
