//! Render summary lists as Markdown documentation or JSON.

use crate::model::FunctionSummary;
use serde::Serialize;
use std::path::Path;

/// Label preceding each generated explanation in Markdown output.
pub const EXPLANATION_LABEL: &str = "**Explanation:**";

/// Text preceding the function name in each function heading.
pub const FUNCTION_HEADING_PREFIX: &str = "## 🔹 Function: ";

/// Markdown heading for a function block.
pub fn function_heading(name: &str) -> String {
    format!("{}{}", FUNCTION_HEADING_PREFIX, inline_code(name))
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Wrap `text` in a code span whose delimiter is longer than any backtick run inside it.
pub fn inline_code(text: &str) -> String {
    match longest_backtick_run(text) {
        0 => format!("`{}`", text),
        run => {
            let fence = "`".repeat(run + 1);
            format!("{fence} {text} {fence}")
        }
    }
}

/// Fenced code block that stays closed even if `code` contains backtick fences.
fn code_block(lang: &str, code: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    format!("{fence}{lang}\n{code}\n{fence}\n\n")
}

/// Render `summaries` as a Markdown document titled with `file`.
pub fn render_markdown(file: &str, summaries: &[FunctionSummary]) -> String {
    let lang = fence_language(file);
    let mut md = format!("# 📄 Documentation for {}\n\n", inline_code(file));

    for summary in summaries {
        md.push_str(&function_heading(&summary.name));
        md.push_str("\n\n");
        md.push_str(&code_block(lang, summary.code.trim_end()));
        md.push_str(EXPLANATION_LABEL);
        md.push_str("\n\n");
        md.push_str(&summary.explanation);
        md.push_str("\n\n---\n\n");
    }

    md
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    file: &'a str,
    summarized_functions: &'a [FunctionSummary],
}

/// Render `summaries` as pretty-printed JSON: `{"file": ..., "summarized_functions": [...]}`.
pub fn render_json(file: &str, summaries: &[FunctionSummary]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonDocument {
        file,
        summarized_functions: summaries,
    })
}

/// Code fence info string for a source file, from its extension.
pub fn fence_language(file: &str) -> &'static str {
    let ext = Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "py" | "pyi" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "scala" => "scala",
        "sh" | "bash" => "bash",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> FunctionSummary {
        FunctionSummary {
            name: "test_function".to_string(),
            code: "def test_function():\n    return True".to_string(),
            explanation: "This is a test function.".to_string(),
        }
    }

    #[test]
    fn test_render_markdown_layout() {
        let md = render_markdown("test_file.py", &[summary()]);
        assert!(md.contains("# 📄 Documentation for `test_file.py`"));
        assert!(md.contains("## 🔹 Function: `test_function`"));
        assert!(md.contains("```python\ndef test_function():\n    return True\n```"));
        assert!(md.contains("**Explanation:**"));
        assert!(md.contains("This is a test function."));
    }

    #[test]
    fn test_render_markdown_empty_list() {
        let md = render_markdown("empty.rs", &[]);
        assert_eq!(md, "# 📄 Documentation for `empty.rs`\n\n");
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json("test_file.py", &[summary()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["file"], "test_file.py");
        assert_eq!(parsed["summarized_functions"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["summarized_functions"][0]["name"], "test_function");
        assert_eq!(
            parsed["summarized_functions"][0]["explanation"],
            "This is a test function."
        );
    }

    #[test]
    fn test_inline_code_escapes_backticks() {
        assert_eq!(inline_code("plain"), "`plain`");
        assert_eq!(inline_code("a`b"), "`` a`b ``");
        assert_eq!(inline_code("x``y"), "``` x``y ```");
        assert_eq!(function_heading("op`"), "## 🔹 Function: `` op` ``");
    }

    #[test]
    fn test_code_block_outgrows_inner_fences() {
        let mut s = summary();
        s.code = "def doc():\n    \"\"\"\n    ```\n    example\n    ```\n    \"\"\"".to_string();
        let md = render_markdown("doc.py", &[s]);
        assert!(md.contains("````python\ndef doc():"));
        assert!(md.contains("    ```\n    \"\"\"\n````\n\n**Explanation:**"));
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("src/main.rs"), "rust");
        assert_eq!(fence_language("app.PY"), "python");
        assert_eq!(fence_language("Makefile"), "");
    }
}
