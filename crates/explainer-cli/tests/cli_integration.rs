//! Integration tests for explainer-cli functionality.
//! Tests the underlying library functions that the CLI invokes.

use explainer_agent::{ProviderSettings, available_providers, create_provider};
use explainer_core::config::{ExplainerConfig, OutputFormat};
use explainer_core::loader;
use std::path::{Path, PathBuf};

fn write_config(root: &Path, contents: &str) {
    let dir = root.join(".code-explainer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_config_defaults_without_file() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = ExplainerConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.llm.max_tokens, 4096);
    assert_eq!(config.output.path, PathBuf::from("outputs/analysis.md"));
    assert_eq!(config.output.format, OutputFormat::Markdown);
}

#[test]
fn test_config_file_sets_input_and_output() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(
        tmpdir.path(),
        r#"
input = "functions.json"

[output]
path = "docs/explained.json"
format = "json"
"#,
    );

    let config = ExplainerConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.input, Some(PathBuf::from("functions.json")));
    assert_eq!(config.output.path, PathBuf::from("docs/explained.json"));
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_config_without_model_lets_each_provider_choose() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(tmpdir.path(), "[llm]\nprovider = \"anthropic\"\n");

    let config = ExplainerConfig::load(tmpdir.path()).unwrap();
    assert!(config.llm.model.is_none());
    let provider = create_provider(
        &config.llm.provider,
        "test-key",
        config.llm.model.as_deref(),
        None,
        ProviderSettings::default(),
    )
    .unwrap();
    assert!(provider.model_name().starts_with("claude"));
}

#[test]
fn test_config_rejects_malformed_toml() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(tmpdir.path(), "[llm\nmodel = ");
    assert!(ExplainerConfig::load(tmpdir.path()).is_err());
}

#[test]
fn test_every_available_provider_can_be_created() {
    for name in available_providers() {
        let provider =
            create_provider(name, "test-key", None, None, ProviderSettings::default()).unwrap();
        assert!(!provider.model_name().is_empty());
    }
}

#[test]
fn test_demo_input_is_loadable() {
    let demo = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(loader::DEFAULT_INPUT_PATH);
    let code_file = loader::load(Some(&demo)).unwrap();
    assert!(!code_file.functions.is_empty());
    assert!(code_file.functions.iter().any(|f| f.is_entry_point));
}
