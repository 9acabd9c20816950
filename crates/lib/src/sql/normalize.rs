//! # SQL Normalizer
//!
//! Strips comments and tidies whitespace using the `sqlparser` tokenizer, so quoted
//! strings, quoted identifiers and dollar-quoted bodies are never touched.

use sqlparser::{
    dialect::{Dialect, GenericDialect, MySqlDialect},
    tokenizer::{Token, Tokenizer, Whitespace},
};
use tracing::debug;

/// Normalizes a SQL string.
///
/// - `-- ...`, `# ...` and `/* ... */` comments are removed; a block comment becomes a
///   single space. `#` directly followed by text is kept.
/// - `\r\n` becomes `\n`, blank lines are dropped and trailing whitespace is trimmed.
/// - Interior runs of spaces and tabs collapse to one space; leading indentation and
///   literal contents are kept.
/// - The result is trimmed. Text that does not tokenize as SQL is only trimmed.
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize_sql(sql: &str) -> String {
    let source = sql.replace("\r\n", "\n");
    match tokenize(&source) {
        Ok(tokens) => render(&tokens),
        Err(e) => {
            debug!(error = %e, "Output is not tokenizable SQL; leaving it as is");
            source.trim().to_string()
        }
    }
}

/// MySQL rules first. MySQL reads `$` as an identifier character, so a word starting
/// with `$` means a dollar-quoted body and the text is tokenized again generically.
fn tokenize(sql: &str) -> Result<Vec<Token>, sqlparser::tokenizer::TokenizerError> {
    let tokens = tokenize_with(&MySqlDialect {}, sql)?;
    let dollar_quoted = tokens
        .iter()
        .any(|t| matches!(t, Token::Word(w) if w.quote_style.is_none() && w.value.starts_with('$')));
    if dollar_quoted {
        return tokenize_with(&GenericDialect {}, sql);
    }
    Ok(tokens)
}

fn tokenize_with(
    dialect: &dyn Dialect,
    sql: &str,
) -> Result<Vec<Token>, sqlparser::tokenizer::TokenizerError> {
    Tokenizer::new(dialect, sql).with_unescape(false).tokenize()
}

fn render(tokens: &[Token]) -> String {
    let mut out = LineWriter::default();
    for token in tokens {
        match token {
            Token::Whitespace(Whitespace::Newline) => out.end_line(),
            Token::Whitespace(Whitespace::Space) => out.push_space(' '),
            Token::Whitespace(Whitespace::Tab) => out.push_space('\t'),
            Token::Whitespace(Whitespace::MultiLineComment(_)) => out.push_space(' '),
            Token::Whitespace(Whitespace::SingleLineComment { comment, prefix }) => {
                let body = comment.strip_suffix('\n').unwrap_or(comment.as_str());
                if prefix == "#" && body.starts_with(|c: char| !c.is_whitespace()) {
                    out.push_str(&format!("{prefix}{body}"));
                }
                if comment.ends_with('\n') {
                    out.end_line();
                }
            }
            other => out.push_str(&other.to_string()),
        }
    }
    out.end_line();
    out.text.trim().to_string()
}

#[derive(Default)]
struct LineWriter {
    text: String,
    /// Byte offset where the current output line begins.
    line_start: usize,
}

impl LineWriter {
    /// Appends token text verbatim. Newlines inside literals start a new line.
    fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        if let Some(offset) = s.rfind('\n') {
            self.line_start = self.text.len() - s.len() + offset + 1;
        }
    }

    fn at_line_start(&self) -> bool {
        self.text[self.line_start..]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// Indentation is kept verbatim; any other whitespace run collapses to one space.
    fn push_space(&mut self, c: char) {
        if self.at_line_start() {
            self.text.push(c);
        } else if !self.text.ends_with([' ', '\t']) {
            self.text.push(' ');
        }
    }

    /// Trims the finished line and drops it entirely if nothing is left.
    fn end_line(&mut self) {
        let trimmed_len = self.text.trim_end_matches([' ', '\t']).len();
        self.text.truncate(trimmed_len.max(self.line_start));
        if self.text.len() == self.line_start {
            return;
        }
        self.text.push('\n');
        self.line_start = self.text.len();
    }
}
