//! # Query Pipeline
//!
//! Orchestrates one request: retrieve schema context, assemble the prompt, call the
//! model once, then clean the output into SQL.

use crate::{
    constants::DEFAULT_TOP_K,
    errors::{RagError, Upstream},
    prompts::{manager::PromptManager, template::PromptTemplate},
    providers::ai::AiProvider,
    retriever::ContextRetriever,
    sql::{normalize_sql, strip_md_fence, validate_statement},
    types::GenerationResult,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of schema chunks retrieved per question.
    pub top_k: usize,
    /// Reject output that does not start with a recognized SQL keyword.
    pub strict_validation: bool,
    pub generation_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            strict_validation: false,
            generation_timeout: None,
        }
    }
}

#[derive(Debug)]
pub struct QueryPipeline {
    retriever: ContextRetriever,
    prompts: Arc<PromptManager>,
    ai_provider: Box<dyn AiProvider>,
    template: PromptTemplate,
    options: PipelineOptions,
}

impl QueryPipeline {
    pub fn new(
        retriever: ContextRetriever,
        prompts: Arc<PromptManager>,
        ai_provider: Box<dyn AiProvider>,
    ) -> Self {
        Self {
            retriever,
            prompts,
            ai_provider,
            template: PromptTemplate::default(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Builds the generation prompt from the current system instructions.
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        let system = self.prompts.current();
        self.template.render(&system, question, context)
    }

    /// Answers `question` with a SQL statement and the schema context used.
    pub async fn handle(&self, question: &str) -> Result<GenerationResult, RagError> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }

        let ddl_context = self.retriever.retrieve(question, self.options.top_k).await?;
        let prompt = self.build_prompt(question, &ddl_context);
        debug!(prompt = %prompt, "Assembled generation prompt");

        let raw = self.generate(&prompt).await?;
        debug!(raw_response = %raw, "Raw model output");

        let sql = normalize_sql(&strip_md_fence(&raw));
        if self.options.strict_validation {
            validate_statement(&sql)?;
        }
        info!(sql = %sql, "Generated SQL");

        Ok(GenerationResult { sql, ddl_context })
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let call = self.ai_provider.generate(prompt);
        let raw = match self.options.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                RagError::upstream(
                    Upstream::Generation,
                    format!("no response within {}s", limit.as_secs_f64()),
                )
            })?,
            None => call.await,
        };
        raw.map_err(|e| e.into_upstream(Upstream::Generation))
    }
}
