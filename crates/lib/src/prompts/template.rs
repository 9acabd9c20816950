//! # Default Prompt Template
//!
//! The generation prompt is a fixed three-slot template. Slots are filled in a single
//! pass, so braces inside the instructions, the question or the DDL are never
//! re-interpreted as slots.

use crate::errors::RagError;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// The default template. Placeholders: `{system}`, `{question}`, `{context}`.
pub const SQL_GENERATION_TEMPLATE: &str =
    "{system}\n\n### User Request\n{question}\n\n### Relevant DDL\n{context}\n";

const SLOTS: [&str; 3] = ["system", "question", "context"];

static SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(system|question|context)\}").expect("valid slot regex"));

/// A validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: SQL_GENERATION_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Creates a template, requiring each of the three slots to be present.
    pub fn new(template: impl Into<String>) -> Result<Self, RagError> {
        let template = template.into();
        for slot in SLOTS {
            if !template.contains(&format!("{{{slot}}}")) {
                return Err(RagError::Configuration(format!(
                    "prompt template is missing the {{{slot}}} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fills the slots verbatim.
    pub fn render(&self, system: &str, question: &str, context: &str) -> String {
        SLOT.replace_all(&self.template, |caps: &Captures| match &caps[1] {
            "system" => system.to_string(),
            "question" => question.to_string(),
            _ => context.to_string(),
        })
        .into_owned()
    }
}
