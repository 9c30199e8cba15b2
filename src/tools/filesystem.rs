//! Directory search and option listing.

use std::collections::BTreeSet;
use std::path::Path;

use glob::{glob_with, MatchOptions, Pattern};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{decode_args, Tool, ToolError};
use crate::response::ToolResult;

const SEARCH_FOLDER: &str = "search_folder";
const LIST_OPTIONS: &str = "list_options";

// =============================================================================
// search_folder
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchFolderArgs {
    #[serde(default)]
    pattern: String,
    #[serde(default = "default_search_path")]
    path: String,
}

fn default_search_path() -> String {
    ".".to_string()
}

/// Finds directories whose name contains a pattern, in `path` and one level below.
pub struct SearchFolderTool {
    max_results: usize,
}

impl SearchFolderTool {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    fn matching_dirs(glob_pattern: &str) -> Result<Vec<String>, ToolError> {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        let entries = glob_with(glob_pattern, options).map_err(|e| ToolError::Execution {
            tool: SEARCH_FOLDER.to_string(),
            message: e.to_string(),
        })?;

        Ok(entries
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .map(|p| std::path::absolute(&p).unwrap_or(p))
            .map(|p| p.display().to_string())
            .collect())
    }
}

impl Tool for SearchFolderTool {
    fn description(&self) -> &str {
        "Search for directories matching a pattern"
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: SearchFolderArgs = decode_args(SEARCH_FOLDER, args)?;
        let base = Pattern::escape(&Path::new(&args.path).to_string_lossy());
        let needle = Pattern::escape(&args.pattern);

        let mut matches = BTreeSet::new();
        matches.extend(Self::matching_dirs(&format!("{}/*{}*", base, needle))?);
        matches.extend(Self::matching_dirs(&format!("{}/*/*{}*", base, needle))?);

        if matches.is_empty() {
            return Ok(ToolResult::info(format!(
                "No directories found matching '{}'",
                args.pattern
            ))
            .with_results(Vec::new()));
        }

        let total = matches.len();
        let results: Vec<String> = matches.into_iter().take(self.max_results).collect();

        Ok(ToolResult::info(format!(
            "Found {} directories matching '{}'",
            total, args.pattern
        ))
        .with_results(results))
    }
}

// =============================================================================
// list_options
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListOptionsArgs {
    #[serde(default)]
    options: Vec<String>,
    #[serde(default = "default_prompt")]
    message: String,
}

fn default_prompt() -> String {
    "Please choose:".to_string()
}

/// Presents a numbered list of choices to the user.
pub struct ListOptionsTool;

impl Tool for ListOptionsTool {
    fn description(&self) -> &str {
        "Present multiple options for user selection"
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: ListOptionsArgs = decode_args(LIST_OPTIONS, args)?;
        if args.options.is_empty() {
            return Ok(ToolResult::info("No options available"));
        }

        let numbered: Vec<String> = args
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}. {}", i + 1, option))
            .collect();

        Ok(ToolResult::question(
            format!("{}\n{}", args.message, numbered.join("\n")),
            args.options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Action;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn search(dir: &Path, pattern: &str, max: usize) -> ToolResult {
        SearchFolderTool::new(max)
            .execute(&args(json!({"pattern": pattern, "path": dir.to_string_lossy()})))
            .unwrap()
    }

    #[test]
    fn test_search_finds_top_level_and_nested_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::create_dir_all(tmp.path().join("lib").join("src2")).unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();

        let result = search(tmp.path(), "src", 10);
        assert_eq!(result.action, Action::Info);
        assert!(result.command.is_none());

        let results = result.results.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].ends_with("lib/src2"));
        assert!(results[1].ends_with("src"));
        assert!(Path::new(&results[0]).is_absolute());
        assert!(result.message.contains("Found 2 directories"));
    }

    #[test]
    fn test_search_ignores_files_and_deeper_levels() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("src.txt"), "x").unwrap();
        fs::create_dir_all(tmp.path().join("a").join("b").join("src")).unwrap();

        let result = search(tmp.path(), "src", 10);
        assert_eq!(result.results, Some(Vec::new()));
        assert_eq!(result.message, "No directories found matching 'src'");
    }

    #[test]
    fn test_search_caps_results_but_reports_total() {
        let tmp = TempDir::new().unwrap();
        for i in 0..12 {
            fs::create_dir(tmp.path().join(format!("proj{:02}", i))).unwrap();
        }

        let result = search(tmp.path(), "proj", 10);
        let results = result.results.unwrap();
        assert_eq!(results.len(), 10);
        assert!(results[0].ends_with("proj00"));
        assert!(result.message.contains("Found 12"));
    }

    #[test]
    fn test_search_escapes_glob_metacharacters() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("a[1]")).unwrap();
        fs::create_dir(tmp.path().join("a1")).unwrap();

        let results = search(tmp.path(), "[1]", 10).results.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].ends_with("a[1]"));
    }

    #[test]
    fn test_search_skips_hidden_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".cache")).unwrap();

        let result = search(tmp.path(), "cache", 10);
        assert_eq!(result.results, Some(Vec::new()));
    }

    #[test]
    fn test_list_options_numbers_choices() {
        let result = ListOptionsTool
            .execute(&args(json!({"options": ["alpha", "beta"], "message": "Pick:"})))
            .unwrap();

        assert_eq!(result.action, Action::Question);
        assert_eq!(result.message, "Pick:\n1. alpha\n2. beta");
        assert_eq!(result.options, Some(vec!["alpha".to_string(), "beta".to_string()]));
    }

    #[test]
    fn test_list_options_default_message() {
        let result = ListOptionsTool
            .execute(&args(json!({"options": ["only"]})))
            .unwrap();
        assert_eq!(result.message, "Please choose:\n1. only");
    }

    #[test]
    fn test_list_options_empty_fails_softly() {
        let result = ListOptionsTool.execute(&Map::new()).unwrap();
        assert_eq!(result.action, Action::Info);
        assert_eq!(result.message, "No options available");
    }
}
