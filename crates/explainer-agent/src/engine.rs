//! Action dispatch engine: classify a query, run the selected branch, and compose
//! a single [`QueryResult`].
//!
//! Flow for one query: classify → load → primary branch → optional overall
//! analysis → done. The primary branch is chosen by
//! [`ActionDescriptor::primary`]; only that branch runs. Overall analysis
//! reuses the primary branch's summaries when there are any, otherwise it
//! summarizes the top-ranked functions first.
//!
//! Every LLM call is blocking and made in selection order. Any classification
//! or summarization failure aborts the query with no partial result. A missing
//! named function is not an error: it is reported in [`QueryResult::error`].

use crate::analysis::overall_analysis;
use crate::classify::{ClassificationError, classify};
use crate::cost::{MeteredProvider, Usage};
use crate::progress::QueryProgress;
use crate::provider::LlmProvider;
use crate::summarize::{SummarizationError, summarize};
use explainer_core::format::render_markdown;
use explainer_core::loader::{self, LoadError};
use explainer_core::model::{
    ActionDescriptor, AnalysisInput, CodeFile, FunctionRecord, FunctionSummary, PrimaryAction,
    QueryResult, SummarySlot,
};
use explainer_core::scoring::select_top_n;
use std::path::Path;

/// Fatal errors that abort a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Summarization(#[from] SummarizationError),
}

/// What the primary branch produced.
#[derive(Debug)]
enum PrimaryOutcome {
    Summaries {
        slot: SummarySlot,
        summaries: Vec<FunctionSummary>,
    },
    NotFound {
        name: String,
    },
    Nothing,
}

/// Runs queries against a single LLM provider.
pub struct ActionEngine {
    provider: MeteredProvider,
    show_progress: bool,
}

impl ActionEngine {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        tracing::info!("Initialized ActionEngine with model: {}", provider.model_name());
        Self {
            provider: MeteredProvider::new(provider),
            show_progress: false,
        }
    }

    /// Show a terminal spinner while queries run.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Usage accumulated over every query this engine has run.
    pub fn usage(&self) -> Usage {
        self.provider.usage()
    }

    /// Classify `query`, load the function set at `file_path`, and run the requested actions.
    pub fn process_query(
        &self,
        query: &str,
        file_path: &Path,
    ) -> Result<QueryResult, QueryError> {
        tracing::info!("Processing query: {} for file: {}", query, file_path.display());
        let progress = QueryProgress::new(self.show_progress);

        progress.stage("Classifying query");
        let action = classify(&self.provider, query, &file_path.display().to_string())?;

        progress.stage("Loading functions");
        let code_file = loader::load(Some(file_path))?;

        let result = self.run(&action, &code_file, &progress);
        progress.finish();
        result
    }

    /// Run an already-classified action against an already-loaded function set.
    pub fn dispatch(
        &self,
        action: &ActionDescriptor,
        code_file: &CodeFile,
    ) -> Result<QueryResult, QueryError> {
        self.run(action, code_file, &QueryProgress::hidden())
    }

    fn run(
        &self,
        action: &ActionDescriptor,
        code_file: &CodeFile,
        progress: &QueryProgress,
    ) -> Result<QueryResult, QueryError> {
        let mut result = QueryResult::new(code_file.file.clone());

        let outcome = self.run_primary(action.primary(), code_file, progress)?;
        tracing::info!(outcome = outcome_label(&outcome), "primary action dispatched");

        let mut listing = match outcome {
            PrimaryOutcome::Summaries { slot, summaries } => Some((slot, summaries)),
            PrimaryOutcome::NotFound { name } => {
                tracing::warn!("Function not found: {}", name);
                result.error = Some(format!("Function '{}' not found", name));
                None
            }
            PrimaryOutcome::Nothing => None,
        };

        if action.overall_analysis {
            if listing.is_none() {
                tracing::info!(
                    "No summaries from the primary action; summarizing top {} functions",
                    action.top_n
                );
                let selected = select_top_n(&code_file.functions, action.top_n());
                let summaries = self.summarize_each(&selected, progress)?;
                listing = Some((SummarySlot::Important, summaries));
            }
            let summaries = listing
                .as_ref()
                .map(|(_, summaries)| summaries.as_slice())
                .unwrap_or_default();

            progress.stage("Writing overall analysis");
            let inputs: Vec<AnalysisInput> = summaries.iter().map(AnalysisInput::from).collect();
            result.overall_analysis = Some(overall_analysis(&self.provider, &inputs)?);
            tracing::info!("overall analysis appended");
        }

        if let Some((slot, summaries)) = listing {
            result.markdown = Some(render_markdown(&code_file.file, &summaries));
            *result.slot_mut(slot) = Some(summaries);
        }

        tracing::info!(usage = %self.usage(), "query done");
        Ok(result)
    }

    fn run_primary(
        &self,
        primary: PrimaryAction<'_>,
        code_file: &CodeFile,
        progress: &QueryProgress,
    ) -> Result<PrimaryOutcome, SummarizationError> {
        match primary {
            PrimaryAction::ExplainAll => {
                tracing::info!(
                    "Generating summaries for all {} functions",
                    code_file.functions.len()
                );
                let all: Vec<&FunctionRecord> = code_file.functions.iter().collect();
                Ok(PrimaryOutcome::Summaries {
                    slot: SummarySlot::Summarized,
                    summaries: self.summarize_each(&all, progress)?,
                })
            }
            PrimaryAction::FindImportant { top_n } => {
                tracing::info!(
                    "Finding {} important functions from {} total",
                    top_n,
                    code_file.functions.len()
                );
                let selected = select_top_n(&code_file.functions, top_n);
                Ok(PrimaryOutcome::Summaries {
                    slot: SummarySlot::Important,
                    summaries: self.summarize_each(&selected, progress)?,
                })
            }
            PrimaryAction::SummarizeOne { name } => {
                tracing::info!("Summarizing specific function: {}", name);
                match code_file.find(name) {
                    Some(function) => Ok(PrimaryOutcome::Summaries {
                        slot: SummarySlot::Specific,
                        summaries: self.summarize_each(&[function], progress)?,
                    }),
                    None => Ok(PrimaryOutcome::NotFound {
                        name: name.to_string(),
                    }),
                }
            }
            PrimaryAction::Nothing => Ok(PrimaryOutcome::Nothing),
        }
    }

    /// Summarize `functions` in order, one request each; stops at the first failure.
    fn summarize_each(
        &self,
        functions: &[&FunctionRecord],
        progress: &QueryProgress,
    ) -> Result<Vec<FunctionSummary>, SummarizationError> {
        let mut summaries = Vec::with_capacity(functions.len());
        for (index, function) in functions.iter().enumerate() {
            progress.function(&function.name, index, functions.len());
            let explanation = summarize(&self.provider, function)?;
            summaries.push(FunctionSummary::new(function, explanation));
        }
        Ok(summaries)
    }
}

fn outcome_label(outcome: &PrimaryOutcome) -> &'static str {
    match outcome {
        PrimaryOutcome::Summaries { slot, .. } => slot.key(),
        PrimaryOutcome::NotFound { .. } => "function_not_found",
        PrimaryOutcome::Nothing => "none",
    }
}
