//! Data model shared by the loader, the scorer, the formatter and the dispatch engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default number of functions selected when ranking by importance.
pub const DEFAULT_TOP_N: u32 = 3;

/// One discovered function in the target file.
///
/// Fan-in/fan-out and the entry-point flag come from an external static-analysis
/// pass and are used only as scoring inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub docstring: String,
    /// Number of callers.
    #[serde(default)]
    pub fan_in: u32,
    /// Number of callees.
    #[serde(default)]
    pub fan_out: u32,
    #[serde(default)]
    pub is_entry_point: bool,
}

impl FunctionRecord {
    pub fn has_docstring(&self) -> bool {
        !self.docstring.is_empty()
    }
}

/// A loaded source file description: the file name plus its functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeFile {
    pub file: String,
    pub functions: Vec<FunctionRecord>,
}

impl CodeFile {
    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Which operations a user query asks for.
///
/// The flags are independent: any combination may be set. [`ActionDescriptor::primary`]
/// resolves them into the one primary branch that runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ActionDescriptor {
    /// Explain what the code does in natural language
    pub explain_code: bool,
    /// Find the most important functions
    pub find_important_functions: bool,
    /// Summarize a specific function
    pub summarize_specific_function: bool,
    /// Provide an overall analysis of the codebase
    pub overall_analysis: bool,
    /// Name of the function to summarize if summarize_specific_function is true
    pub function_name: Option<String>,
    /// Number of important functions to find
    #[schemars(range(min = 1))]
    pub top_n: u32,
}

impl Default for ActionDescriptor {
    fn default() -> Self {
        Self {
            explain_code: false,
            find_important_functions: false,
            summarize_specific_function: false,
            overall_analysis: false,
            function_name: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// The primary branch selected for a query, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction<'a> {
    /// Summarize every function in the input set.
    ExplainAll,
    /// Rank all functions and summarize the top `top_n`.
    FindImportant { top_n: usize },
    /// Summarize the single function with this exact name.
    SummarizeOne { name: &'a str },
    /// No primary branch; only the overall analysis may still run.
    Nothing,
}

impl ActionDescriptor {
    /// Function name to look up, if one was given and is not blank.
    pub fn requested_function(&self) -> Option<&str> {
        self.function_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn top_n(&self) -> usize {
        self.top_n as usize
    }

    /// Resolve the flags into the primary branch.
    ///
    /// Priority: explain_code, then find_important_functions, then
    /// summarize_specific_function (only with a function name). Only the first
    /// match runs.
    pub fn primary(&self) -> PrimaryAction<'_> {
        if self.explain_code {
            PrimaryAction::ExplainAll
        } else if self.find_important_functions {
            PrimaryAction::FindImportant {
                top_n: self.top_n(),
            }
        } else if self.summarize_specific_function
            && let Some(name) = self.requested_function()
        {
            PrimaryAction::SummarizeOne { name }
        } else {
            PrimaryAction::Nothing
        }
    }

    /// Check constraints the JSON schema declares but serde does not enforce.
    pub fn validate(&self) -> Result<(), String> {
        if self.top_n == 0 {
            return Err("top_n must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Generated explanation for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub name: String,
    pub code: String,
    pub explanation: String,
}

impl FunctionSummary {
    pub fn new(record: &FunctionRecord, explanation: String) -> Self {
        Self {
            name: record.name.clone(),
            code: record.code.clone(),
            explanation,
        }
    }
}

/// Input row for the cross-function overall analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub name: String,
    pub purpose: String,
    pub key_features: Vec<String>,
}

impl From<&FunctionSummary> for AnalysisInput {
    fn from(summary: &FunctionSummary) -> Self {
        Self {
            name: summary.name.clone(),
            purpose: summary.explanation.clone(),
            key_features: Vec::new(),
        }
    }
}

/// Result key a summary list is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySlot {
    /// `summarized_functions`: every function was explained.
    Summarized,
    /// `important_functions`: the top-ranked subset.
    Important,
    /// `function_summary`: one named function.
    Specific,
}

impl SummarySlot {
    pub fn key(self) -> &'static str {
        match self {
            Self::Summarized => "summarized_functions",
            Self::Important => "important_functions",
            Self::Specific => "function_summary",
        }
    }

    /// Heading used when displaying this list.
    pub fn title(self) -> &'static str {
        match self {
            Self::Summarized => "Function Summaries",
            Self::Important => "Important Functions",
            Self::Specific => "Function Summary",
        }
    }
}

/// Output of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_functions: Option<Vec<FunctionSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important_functions: Option<Vec<FunctionSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_summary: Option<Vec<FunctionSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn slot_mut(&mut self, slot: SummarySlot) -> &mut Option<Vec<FunctionSummary>> {
        match slot {
            SummarySlot::Summarized => &mut self.summarized_functions,
            SummarySlot::Important => &mut self.important_functions,
            SummarySlot::Specific => &mut self.function_summary,
        }
    }

    /// First populated summary list, in display order.
    pub fn summaries(&self) -> Option<(SummarySlot, &[FunctionSummary])> {
        [
            (SummarySlot::Summarized, &self.summarized_functions),
            (SummarySlot::Important, &self.important_functions),
            (SummarySlot::Specific, &self.function_summary),
        ]
        .into_iter()
        .find_map(|(slot, list)| list.as_deref().map(|l| (slot, l)))
    }

    /// True when only the `file` key is set.
    pub fn is_empty(&self) -> bool {
        self.summaries().is_none()
            && self.overall_analysis.is_none()
            && self.markdown.is_none()
            && self.error.is_none()
    }
}
