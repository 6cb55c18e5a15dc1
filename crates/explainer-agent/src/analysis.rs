//! Cross-function overall analysis: one completion request per query.

use crate::prompts::{ANALYSIS_SYSTEM, overall_analysis_prompt};
use crate::provider::LlmProvider;
use crate::summarize::SummarizationError;
use explainer_core::model::AnalysisInput;

/// Analyze the code as a whole from its function summaries.
pub fn overall_analysis(
    provider: &dyn LlmProvider,
    summaries: &[AnalysisInput],
) -> Result<String, SummarizationError> {
    tracing::info!("Generating overall code analysis from {} summaries", summaries.len());
    let prompt = overall_analysis_prompt(summaries);

    provider
        .complete(ANALYSIS_SYSTEM, &prompt)
        .map(|response| response.text)
        .map_err(SummarizationError::OverallAnalysis)
}
