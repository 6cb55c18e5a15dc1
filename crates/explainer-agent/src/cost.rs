//! Token usage and cost accounting across LLM calls.

use crate::provider::{LlmProvider, LlmResponse, ProviderError, StructuredResponse, ToolSpec};
use std::cell::RefCell;

/// Snapshot of usage so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Usage {
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} LLM calls, ~{} input / ~{} output tokens, ${:.4}",
            self.calls, self.input_tokens, self.output_tokens, self.cost_usd
        )
    }
}

/// Running cost tracker.
#[derive(Debug, Default)]
pub struct CostTracker {
    pub calls: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    input_rate: f64,
    output_rate: f64,
}

impl CostTracker {
    pub fn new(provider: &dyn LlmProvider) -> Self {
        Self {
            calls: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            input_rate: provider.cost_per_mtok_input(),
            output_rate: provider.cost_per_mtok_output(),
        }
    }

    /// Record token usage from a response.
    pub fn record(&mut self, input_tokens: Option<u64>, output_tokens: Option<u64>) {
        self.calls += 1;
        if let Some(t) = input_tokens {
            self.total_input_tokens += t;
        }
        if let Some(t) = output_tokens {
            self.total_output_tokens += t;
        }
    }

    /// Current total cost in USD.
    pub fn total_cost_usd(&self) -> f64 {
        (self.total_input_tokens as f64 / 1_000_000.0) * self.input_rate
            + (self.total_output_tokens as f64 / 1_000_000.0) * self.output_rate
    }

    pub fn usage(&self) -> Usage {
        Usage {
            calls: self.calls,
            input_tokens: self.total_input_tokens,
            output_tokens: self.total_output_tokens,
            cost_usd: self.total_cost_usd(),
        }
    }
}

/// Wraps a provider and records the usage of every successful call.
pub struct MeteredProvider {
    inner: Box<dyn LlmProvider>,
    tracker: RefCell<CostTracker>,
}

impl MeteredProvider {
    pub fn new(inner: Box<dyn LlmProvider>) -> Self {
        let tracker = RefCell::new(CostTracker::new(inner.as_ref()));
        Self { inner, tracker }
    }

    pub fn usage(&self) -> Usage {
        self.tracker.borrow().usage()
    }
}

impl LlmProvider for MeteredProvider {
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        let response = self.inner.complete(system, user)?;
        self.tracker
            .borrow_mut()
            .record(response.input_tokens, response.output_tokens);
        Ok(response)
    }

    fn complete_structured(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<StructuredResponse, ProviderError> {
        let response = self.inner.complete_structured(system, user, tool)?;
        self.tracker
            .borrow_mut()
            .record(response.input_tokens, response.output_tokens);
        Ok(response)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn cost_per_mtok_input(&self) -> f64 {
        self.inner.cost_per_mtok_input()
    }

    fn cost_per_mtok_output(&self) -> f64 {
        self.inner.cost_per_mtok_output()
    }
}
