//! LLM-backed query handling for code-explainer.
//!
//! A query is classified into an [`ActionDescriptor`](explainer_core::model::ActionDescriptor),
//! the function set is loaded, and the [`ActionEngine`] runs the selected
//! branch: summarizing functions one request at a time and, when asked, an
//! overall analysis over those summaries.
//!
//! # Architecture
//!
//! - **provider**: `LlmProvider` trait with OpenAI-compatible and Anthropic implementations
//! - **prompts**: prompt templates for classification, summaries and analysis
//! - **classify** / **summarize** / **analysis**: one adapter per kind of LLM request
//! - **engine**: the action dispatch engine
//! - **cost**: token usage and cost accounting
//! - **progress**: terminal spinner via `indicatif`

pub mod analysis;
pub mod classify;
pub mod cost;
pub mod engine;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod summarize;

pub use classify::{ClassificationError, classify};
pub use cost::{CostTracker, MeteredProvider, Usage};
pub use engine::{ActionEngine, QueryError};
pub use provider::{
    LlmProvider, LlmResponse, ProviderError, ProviderSettings, StructuredResponse, ToolSpec,
    available_providers, create_provider,
};
pub use summarize::SummarizationError;
