//! Per-function summarization: one completion request per function.

use crate::prompts::{SUMMARY_SYSTEM, summary_prompt};
use crate::provider::{LlmProvider, ProviderError};
use explainer_core::model::FunctionRecord;

/// Errors from generating a summary or an overall analysis.
#[derive(Debug, thiserror::Error)]
pub enum SummarizationError {
    #[error("failed to summarize function '{name}': {source}")]
    Function {
        name: String,
        #[source]
        source: ProviderError,
    },
    #[error("failed to generate overall analysis: {0}")]
    OverallAnalysis(#[source] ProviderError),
}

/// Explain one function. The response text is returned verbatim.
pub fn summarize(
    provider: &dyn LlmProvider,
    function: &FunctionRecord,
) -> Result<String, SummarizationError> {
    let prompt = summary_prompt(function);
    tracing::debug!(function = %function.name, prompt_chars = prompt.len(), "summarizing");

    provider
        .complete(SUMMARY_SYSTEM, &prompt)
        .map(|response| response.text)
        .map_err(|source| SummarizationError::Function {
            name: function.name.clone(),
            source,
        })
}
