//! CLI binary for code-explainer: ask natural-language questions about a file's functions.

use anyhow::{Context, Result};
use clap::Parser;
use explainer_agent::{
    ActionEngine, LlmProvider, ProviderError, ProviderSettings, create_provider,
};
use explainer_core::config::{ExplainerConfig, LlmConfig, OutputFormat, api_key_var};
use explainer_core::format::render_json;
use explainer_core::loader::DEFAULT_INPUT_PATH;
use explainer_core::model::QueryResult;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "code-explainer",
    about = "Code Explainer Agent - analyze and explain code functions"
)]
struct Cli {
    /// Path to the input JSON file describing the code's functions
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to save the output file (defaults to outputs/analysis.md)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Model to use (defaults to the provider's own default model)
    #[arg(long)]
    model: Option<String>,

    /// LLM provider: openai, anthropic
    #[arg(long)]
    provider: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[arg(long)]
    base_url: Option<String>,

    /// Output file format: markdown, json
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Query to analyze (if not in interactive mode)
    #[arg(short, long)]
    query: Option<String>,

    /// Directory holding .code-explainer/config.toml (defaults to current directory)
    #[arg(long)]
    root: Option<PathBuf>,
}

/// Effective settings after config file, environment and flags are merged.
struct Settings {
    llm: LlmConfig,
    input: PathBuf,
    output: PathBuf,
    format: OutputFormat,
}

impl Settings {
    /// Apply command-line flags on top of the loaded config.
    fn resolve(cli: &Cli, config: ExplainerConfig) -> Self {
        let ExplainerConfig {
            input,
            mut llm,
            output,
        } = config;

        if let Some(provider) = &cli.provider {
            llm.provider.clone_from(provider);
        }
        if cli.model.is_some() {
            llm.model.clone_from(&cli.model);
        }
        if cli.base_url.is_some() {
            llm.base_url.clone_from(&cli.base_url);
        }

        Self {
            llm,
            input: cli
                .input
                .clone()
                .or(input)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output: cli.output.clone().unwrap_or(output.path),
            format: cli.format.unwrap_or(output.format),
        }
    }

    fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }

    fn create_provider(&self, api_key: &str) -> Result<Box<dyn LlmProvider>, ProviderError> {
        create_provider(
            &self.llm.provider,
            api_key,
            self.llm.model.as_deref(),
            self.llm.base_url.as_deref(),
            self.provider_settings(),
        )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match &cli.root {
        Some(p) => p.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let settings = Settings::resolve(&cli, ExplainerConfig::load(&root)?);

    let key_var = api_key_var(&settings.llm.provider);
    let api_key = match std::env::var(key_var) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("Error: {} environment variable not set", key_var);
            return Ok(());
        }
    };

    eprintln!("Code Explainer Agent");
    eprintln!("This agent analyzes code and explains what it does.");

    let provider = settings.create_provider(&api_key)?;
    let engine = ActionEngine::new(provider).with_progress(std::io::stderr().is_terminal());

    if cli.interactive {
        run_interactive(&engine, &settings)
    } else {
        let Some(query) = cli.query.as_deref() else {
            eprintln!("No query provided. Use --query or --interactive");
            return Ok(());
        };
        run_query(&engine, &settings, query)
    }
}

fn run_interactive(engine: &ActionEngine, settings: &Settings) -> Result<()> {
    eprintln!("\nInteractive mode: type 'exit' to quit");
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("\nWhat would you like to know about the code? ");
        std::io::stderr().flush().ok();

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(e) = run_query(engine, settings, query) {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

fn run_query(engine: &ActionEngine, settings: &Settings, query: &str) -> Result<()> {
    eprintln!("Processing query: {}", query);
    let result = engine
        .process_query(query, &settings.input)
        .with_context(|| format!("query failed: {}", query))?;

    if let Some(path) = write_output(&result, &settings.output, settings.format)? {
        eprintln!("Results saved to: {}", path.display());
    }
    print!("{}", render_results(&result));
    tracing::info!("Usage so far: {}", engine.usage());
    Ok(())
}

/// Write the result to `path` in `format`, if the result has anything to write.
fn write_output(
    result: &QueryResult,
    path: &Path,
    format: OutputFormat,
) -> Result<Option<PathBuf>> {
    let contents = match format {
        OutputFormat::Markdown => result.markdown.clone(),
        OutputFormat::Json => result
            .summaries()
            .map(|(_, summaries)| render_json(&result.file, summaries))
            .transpose()?,
    };
    let Some(contents) = contents else {
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write results to {}", path.display()))?;
    Ok(Some(path.to_path_buf()))
}

/// Human-readable rendering of a result for the terminal.
fn render_results(result: &QueryResult) -> String {
    if let Some(error) = &result.error {
        return format!("Error: {}\n", error);
    }

    let mut out = String::new();
    if let Some(analysis) = &result.overall_analysis {
        out.push_str(&format!("\nOverall Analysis:\n{}\n", analysis));
    }
    if let Some((slot, summaries)) = result.summaries() {
        out.push_str(&format!("\n{}:\n", slot.title()));
        for summary in summaries {
            out.push_str(&format!("\n{}\n{}\n", summary.name, summary.explanation));
        }
    }
    if out.is_empty() {
        out.push_str("No matching action for this query.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use explainer_core::model::FunctionSummary;

    fn summary(name: &str) -> FunctionSummary {
        FunctionSummary {
            name: name.to_string(),
            code: format!("fn {}() {{}}", name),
            explanation: format!("{} does things", name),
        }
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "code-explainer",
            "--input",
            "data.json",
            "--query",
            "explain the code",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("data.json")));
        assert_eq!(cli.query.as_deref(), Some("explain the code"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(!cli.interactive);
    }

    #[test]
    fn test_anthropic_without_model_uses_its_default() {
        let cli = Cli::try_parse_from(["code-explainer", "--provider", "anthropic"]).unwrap();
        let settings = Settings::resolve(&cli, ExplainerConfig::default());
        assert_eq!(settings.llm.provider, "anthropic");
        assert!(settings.llm.model.is_none());

        let provider = settings.create_provider("key").unwrap();
        assert_eq!(
            provider.model_name(),
            explainer_agent::provider::AnthropicProvider::DEFAULT_MODEL
        );
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = ExplainerConfig::default();
        config.llm.model = Some("gpt-4o".to_string());
        config.input = Some(PathBuf::from("from_config.json"));
        config.output.format = OutputFormat::Json;

        let cli = Cli::try_parse_from([
            "code-explainer",
            "--model",
            "gpt-4.1-mini",
            "--output",
            "out/doc.md",
            "--format",
            "markdown",
        ])
        .unwrap();
        let settings = Settings::resolve(&cli, config);
        assert_eq!(settings.llm.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(settings.input, PathBuf::from("from_config.json"));
        assert_eq!(settings.output, PathBuf::from("out/doc.md"));
        assert_eq!(settings.format, OutputFormat::Markdown);
        assert_eq!(settings.create_provider("key").unwrap().model_name(), "gpt-4.1-mini");
    }

    #[test]
    fn test_defaults_without_flags_or_config() {
        let cli = Cli::try_parse_from(["code-explainer"]).unwrap();
        let settings = Settings::resolve(&cli, ExplainerConfig::default());
        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(settings.output, PathBuf::from("outputs/analysis.md"));
        assert_eq!(settings.create_provider("key").unwrap().model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_render_results_error_only() {
        let mut result = QueryResult::new("a.rs");
        result.error = Some("Function 'x' not found".to_string());
        result.important_functions = Some(vec![summary("main")]);
        assert_eq!(render_results(&result), "Error: Function 'x' not found\n");
    }

    #[test]
    fn test_render_results_analysis_and_summaries() {
        let mut result = QueryResult::new("a.rs");
        result.overall_analysis = Some("A small tool.".to_string());
        result.important_functions = Some(vec![summary("main"), summary("run")]);

        let text = render_results(&result);
        assert!(text.contains("Overall Analysis:\nA small tool."));
        assert!(text.contains("Important Functions:"));
        assert!(text.find("main").unwrap() < text.find("run does things").unwrap());
    }

    #[test]
    fn test_render_results_empty() {
        let text = render_results(&QueryResult::new("a.rs"));
        assert!(text.contains("No matching action"));
    }

    #[test]
    fn test_write_output_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("outputs/analysis.md");
        let mut result = QueryResult::new("a.rs");
        result.markdown = Some("# doc\n".to_string());

        let written = write_output(&result, &path, OutputFormat::Markdown).unwrap();
        assert_eq!(written, Some(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# doc\n");
    }

    #[test]
    fn test_write_output_json_and_nothing_to_write() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("analysis.json");

        let empty = QueryResult::new("a.rs");
        assert!(write_output(&empty, &path, OutputFormat::Json).unwrap().is_none());
        assert!(!path.exists());

        let mut result = QueryResult::new("a.rs");
        result.function_summary = Some(vec![summary("main")]);
        write_output(&result, &path, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["file"], "a.rs");
        assert_eq!(parsed["summarized_functions"][0]["name"], "main");
    }
}
