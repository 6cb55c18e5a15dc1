//! Terminal progress display while a query runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner showing the current stage of a query.
pub struct QueryProgress {
    bar: ProgressBar,
}

impl QueryProgress {
    /// A visible spinner on stderr, or a hidden one when `visible` is false.
    pub fn new(visible: bool) -> Self {
        if !visible {
            return Self::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .expect("valid template"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show the stage currently in progress.
    pub fn stage(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Show progress through a list of functions.
    pub fn function(&self, name: &str, index: usize, total: usize) {
        self.stage(format!("Summarizing `{}` ({}/{})", name, index + 1, total));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for QueryProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
