//! # Prompts
//!
//! The live system instructions (`manager`) and the template that combines them with
//! a question and its retrieved schema context (`template`).

pub mod manager;
pub mod template;
