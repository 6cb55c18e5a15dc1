//! Read the function-set JSON document from disk.
//!
//! Expected shape:
//! `{"file": "app.py", "functions": [{"name", "code", "docstring", "fan_in", "fan_out", "is_entry_point"}]}`

use crate::model::CodeFile;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Input used when no path is given.
pub const DEFAULT_INPUT_PATH: &str = "demos/dummy_input.json";

/// Errors from loading an input document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read input from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid input JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("duplicate function name in input: '{0}'")]
    DuplicateFunction(String),
}

/// Path that [`load`] reads for a given optional override.
pub fn input_path(path: Option<&Path>) -> PathBuf {
    path.map_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH), Path::to_path_buf)
}

/// Load a function set from disk. `None` reads [`DEFAULT_INPUT_PATH`].
pub fn load(path: Option<&Path>) -> Result<CodeFile, LoadError> {
    let path = input_path(path);
    tracing::info!("Loading code data from: {}", path.display());
    let json = fs::read_to_string(&path).map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
    })?;
    from_json(&json)
}

/// Parse a function set from a JSON string.
pub fn from_json(json: &str) -> Result<CodeFile, LoadError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(LoadError::NotAnObject(json_type(&value)));
    }
    let code_file: CodeFile = serde_json::from_value(value)?;

    let mut seen = HashSet::new();
    for function in &code_file.functions {
        if !seen.insert(function.name.as_str()) {
            return Err(LoadError::DuplicateFunction(function.name.clone()));
        }
    }

    tracing::debug!(
        file = %code_file.file,
        functions = code_file.functions.len(),
        "loaded function set"
    );
    Ok(code_file)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_full_document() {
        let code_file = from_json(
            r#"{
                "file": "calc.py",
                "functions": [
                    {"name": "add", "code": "def add(a, b): return a + b",
                     "docstring": "Add.", "fan_in": 2, "fan_out": 0, "is_entry_point": false},
                    {"name": "main", "code": "def main(): add(1, 2)",
                     "fan_in": 0, "fan_out": 1, "is_entry_point": true}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(code_file.file, "calc.py");
        assert_eq!(code_file.functions.len(), 2);
        assert_eq!(code_file.functions[1].docstring, "");
        assert!(code_file.find("main").unwrap().is_entry_point);
    }

    #[test]
    fn test_missing_keys_default() {
        let code_file = from_json("{}").unwrap();
        assert_eq!(code_file.file, "");
        assert!(code_file.functions.is_empty());
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            from_json("[1, 2]"),
            Err(LoadError::NotAnObject("an array"))
        ));
        assert!(matches!(
            from_json("\"text\""),
            Err(LoadError::NotAnObject("a string"))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(from_json("{not json"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_rejects_function_without_code() {
        let err = from_json(r#"{"file": "a.py", "functions": [{"name": "f"}]}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = from_json(
            r#"{"file": "a.py", "functions": [
                {"name": "f", "code": "def f(): pass"},
                {"name": "f", "code": "def f(): return 1"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateFunction(ref name) if name == "f"));
    }

    #[test]
    fn test_default_input_path() {
        assert_eq!(input_path(None), PathBuf::from("demos/dummy_input.json"));
        assert_eq!(
            input_path(Some(Path::new("custom/path.json"))),
            PathBuf::from("custom/path.json")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Some(Path::new("/nonexistent/input.json"))).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/input.json"));
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("input.json");
        fs::write(
            &path,
            r#"{"file": "x.py", "functions": [{"name": "x", "code": "pass"}]}"#,
        )
        .unwrap();
        let code_file = load(Some(&path)).unwrap();
        assert_eq!(code_file.file, "x.py");
        assert_eq!(code_file.functions[0].name, "x");
    }
}
