//! Post-processing applied to raw model output before it is returned as SQL.

pub mod fence;
pub mod normalize;
pub mod validate;

pub use fence::strip_md_fence;
pub use normalize::normalize_sql;
pub use validate::{is_recognized_statement, validate_statement, SQL_STATEMENT_KEYWORDS};
