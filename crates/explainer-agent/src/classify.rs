//! Query classification: free text in, [`ActionDescriptor`] out.
//!
//! There is no local fallback heuristic. If the service cannot produce a
//! descriptor that matches the schema, the query fails.

use crate::prompts::{
    CLASSIFY_SYSTEM, CLASSIFY_TOOL_DESCRIPTION, CLASSIFY_TOOL_NAME, classification_prompt,
};
use crate::provider::{LlmProvider, ProviderError, ToolSpec};
use explainer_core::model::ActionDescriptor;

/// Errors from classifying a query.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("query classification failed: {0}")]
    Service(#[source] ProviderError),
    #[error("classification payload does not match the action schema: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("classification payload rejected: {0}")]
    Constraint(String),
}

/// Tool definition whose parameters are the JSON schema of [`ActionDescriptor`].
pub fn action_tool() -> ToolSpec {
    let mut schema = schemars::schema_for!(ActionDescriptor);
    schema.remove("$schema");
    ToolSpec {
        name: CLASSIFY_TOOL_NAME.to_string(),
        description: CLASSIFY_TOOL_DESCRIPTION.to_string(),
        parameters: schema.to_value(),
    }
}

/// Ask the LLM which actions `query` requests for `file_path`.
pub fn classify(
    provider: &dyn LlmProvider,
    query: &str,
    file_path: &str,
) -> Result<ActionDescriptor, ClassificationError> {
    tracing::info!("Triaging query: {}", query);

    let user = classification_prompt(query, file_path);
    let response = provider
        .complete_structured(CLASSIFY_SYSTEM, &user, &action_tool())
        .map_err(ClassificationError::Service)?;

    let action = parse_descriptor(response.payload)?;
    tracing::info!(
        explain_code = action.explain_code,
        find_important_functions = action.find_important_functions,
        summarize_specific_function = action.summarize_specific_function,
        overall_analysis = action.overall_analysis,
        function_name = action.function_name.as_deref().unwrap_or(""),
        top_n = action.top_n,
        "query classified"
    );
    Ok(action)
}

/// Validate a structured payload into an [`ActionDescriptor`].
pub fn parse_descriptor(
    payload: serde_json::Value,
) -> Result<ActionDescriptor, ClassificationError> {
    let action: ActionDescriptor = serde_json::from_value(payload)?;
    action.validate().map_err(ClassificationError::Constraint)?;
    Ok(action)
}
