//! Core types for code-explainer: the function model, the rule-based importance
//! scorer, the JSON input loader, and Markdown/JSON rendering of summaries.
//!
//! Nothing in this crate talks to a network service. The LLM-facing adapters
//! and the dispatch engine live in `explainer-agent`.

pub mod config;
pub mod format;
pub mod loader;
pub mod model;
pub mod scoring;
