//! Prompt templates for every LLM request the agent makes.

use explainer_core::model::{AnalysisInput, FunctionRecord};

/// Name of the tool the classifier is forced to call.
pub const CLASSIFY_TOOL_NAME: &str = "determine_action";

pub const CLASSIFY_TOOL_DESCRIPTION: &str =
    "Determine what action to take based on the user query";

pub const CLASSIFY_SYSTEM: &str = "You are a code analysis assistant that helps users understand code. \
Based on the user query, determine which actions to take by calling the provided tool. \
Several actions may apply to the same query.";

pub const SUMMARY_SYSTEM: &str = "You are an expert software developer and technical writer.";

pub const ANALYSIS_SYSTEM: &str = "You are an expert software architect and code reviewer.";

/// Instruction asking the model to classify `query` against the four actions.
pub fn classification_prompt(query: &str, file_path: &str) -> String {
    format!(
        "Based on the user query, determine what action I should take.

Available actions:
1. Explain what the code does in natural language (explain_code)
2. Find the most important functions in the code (find_important_functions, with top_n)
3. Summarize a specific function, if the user mentions a function name \
(summarize_specific_function, with function_name)
4. Provide an overall analysis of the codebase (overall_analysis)

USER QUERY: {query}
CODE FILE: {file_path}

Determine the actions that best match the user's intention."
    )
}

/// Instruction asking for a plain-language explanation of one function.
pub fn summary_prompt(function: &FunctionRecord) -> String {
    let docstring = if function.has_docstring() {
        function.docstring.as_str()
    } else {
        "N/A"
    };
    format!(
        "Your task is to analyze the following function and explain its purpose in simple terms.
Only write the explanation. Do not repeat the code.

---

Function Name: {}
Docstring: {}
Fan-in: {}
Fan-out: {}
Entry Point: {}

Code:
{}
",
        function.name,
        docstring,
        function.fan_in,
        function.fan_out,
        if function.is_entry_point { "True" } else { "False" },
        function.code
    )
}

/// Instruction asking for one analysis across all `summaries`.
pub fn overall_analysis_prompt(summaries: &[AnalysisInput]) -> String {
    let blocks: Vec<String> = summaries
        .iter()
        .map(|s| {
            format!(
                "Function: {}\nPurpose: {}\nKey Features: {}",
                s.name,
                s.purpose,
                s.key_features.join(", ")
            )
        })
        .collect();

    format!(
        "Based on the summaries of key functions below, provide an overall analysis of this codebase.
Consider:
- The main purpose of the code
- Architecture patterns used
- Quality of the implementation
- Potential areas for improvement

Your analysis should be concise but insightful.

---

Function Summaries:
{}
",
        blocks.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FunctionRecord {
        FunctionRecord {
            name: "test_function".to_string(),
            code: "def test_function():\n    return True".to_string(),
            docstring: String::new(),
            fan_in: 2,
            fan_out: 1,
            is_entry_point: false,
        }
    }

    #[test]
    fn test_classification_prompt_embeds_query_and_file() {
        let prompt = classification_prompt("what does main do?", "examples/app.json");
        assert!(prompt.contains("USER QUERY: what does main do?"));
        assert!(prompt.contains("CODE FILE: examples/app.json"));
        assert!(prompt.contains("overall_analysis"));
    }

    #[test]
    fn test_summary_prompt_fields() {
        let prompt = summary_prompt(&record());
        assert!(prompt.contains("Function Name: test_function"));
        assert!(prompt.contains("Docstring: N/A"));
        assert!(prompt.contains("Fan-in: 2"));
        assert!(prompt.contains("Fan-out: 1"));
        assert!(prompt.contains("Entry Point: False"));
        assert!(prompt.contains("def test_function():\n    return True"));
    }

    #[test]
    fn test_summary_prompt_keeps_docstring() {
        let mut f = record();
        f.docstring = "Always true.".to_string();
        f.is_entry_point = true;
        let prompt = summary_prompt(&f);
        assert!(prompt.contains("Docstring: Always true."));
        assert!(prompt.contains("Entry Point: True"));
    }

    #[test]
    fn test_overall_analysis_prompt_lists_every_summary() {
        let inputs = vec![
            AnalysisInput {
                name: "load".to_string(),
                purpose: "Reads input.".to_string(),
                key_features: vec!["io".to_string(), "json".to_string()],
            },
            AnalysisInput {
                name: "run".to_string(),
                purpose: "Drives the loop.".to_string(),
                key_features: Vec::new(),
            },
        ];
        let prompt = overall_analysis_prompt(&inputs);
        assert!(prompt.contains("Function: load\nPurpose: Reads input.\nKey Features: io, json"));
        assert!(prompt.contains("Function: run\nPurpose: Drives the loop.\nKey Features: "));
    }
}
