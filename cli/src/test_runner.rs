use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use latte::{ParseError, Parser};

use crate::config::{Config, parse_syntax};

const TEST_SUFFIX: &str = ".test.latte";

#[derive(Debug, Deserialize)]
pub struct ExpectedError {
    /// Substring that must appear in the error message.
    pub contains: String,

    /// If set, the error's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Initial syntax. Defaults to the project config, then "latte".
    #[serde(default)]
    pub syntax: Option<String>,

    /// Extra pair macros for this template.
    #[serde(default)]
    pub pair_macros: Vec<String>,

    /// Built-in pair macros to ignore for this template.
    #[serde(default)]
    pub ignore_macros: Vec<String>,

    /// Expected errors in order. Absent means the template must be clean.
    #[serde(default)]
    pub expect_errors: Option<Vec<ExpectedError>>,
}

/// Split a `.test.latte` file into its TOML config and template source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    // An empty frontmatter block closes immediately.
    let (toml_str, rest) = if let Some(rest) = after_open.strip_prefix("---") {
        ("", rest)
    } else {
        let close_pos = after_open
            .find("\n---")
            .ok_or("missing closing --- frontmatter delimiter")?;
        (
            after_open[..close_pos].trim_end_matches('\r'),
            &after_open[close_pos + 4..],
        )
    };

    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn fail(path: &Path, description: Option<String>, reason: String) -> Self {
        TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Fail(reason),
        }
    }
}

fn run_single_test(path: &Path, base: &Config) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return TestResult::fail(path, None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return TestResult::fail(path, None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();

    let syntax = match config.syntax.as_deref() {
        Some(name) => parse_syntax(name),
        None => base.syntax(None),
    };
    let syntax = match syntax {
        Ok(s) => s,
        Err(e) => return TestResult::fail(path, description, e.to_string()),
    };

    let pair_macros = base
        .pair_macros()
        .with(config.pair_macros.iter().cloned())
        .without(&config.ignore_macros);

    let result = Parser::new(source.to_string(), 0)
        .with_syntax(syntax)
        .with_pair_macros(pair_macros)
        .parse();

    let expected = config.expect_errors.as_deref().unwrap_or(&[]);
    let outcome = match check_errors(source, &result.errors, expected) {
        Some(reason) => TestOutcome::Fail(reason),
        None => TestOutcome::Pass,
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Check that actual errors match expectations. Returns `Some(reason)` on mismatch.
fn check_errors(source: &str, actual: &[ParseError], expected: &[ExpectedError]) -> Option<String> {
    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual
            .iter()
            .map(|e| {
                format!(
                    "  - {} (line {})",
                    e.message,
                    byte_offset_to_line(source, e.start())
                )
            })
            .collect();
        return Some(format!(
            "expected {} error(s), got {}\n  actual errors:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected.iter()).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "error[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual.message
            ));
        }

        if let Some(expected_line) = expected.line {
            let actual_line = byte_offset_to_line(source, actual.start());
            if actual_line != expected_line {
                return Some(format!(
                    "error[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    None
}

/// Discover test files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot read test directory");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn label_for(result: &TestResult) -> &str {
    if let Some(description) = &result.description {
        return description;
    }
    result
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_suffix(TEST_SUFFIX))
        .unwrap_or("?")
}

fn print_failures(failures: &[TestResult]) {
    eprintln!();
    eprintln!("failures:");
    for f in failures {
        eprintln!();
        eprintln!("  --- {} ---", f.path.display());
        if let TestOutcome::Fail(reason) = &f.outcome {
            for line in reason.lines() {
                eprintln!("  {}", line);
            }
        }
    }
}

fn print_summary(passed: usize, failed: usize, no_color: bool) {
    eprintln!();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
    } else {
        let bad = if no_color {
            "FAILED"
        } else {
            "\x1b[31mFAILED\x1b[0m"
        };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            bad,
            passed,
            failed,
            passed + failed
        );
    }
}

/// Run every test file under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String], base: &Config) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        filter_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file, base);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label_for(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), label_for(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        print_failures(&failures);
    }
    print_summary(passed, failures.len(), no_color);

    if failures.is_empty() { 0 } else { 1 }
}

fn filter_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all_categories;
    }

    let mut filtered = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let mut found = false;
        for (cat, files) in &all_categories {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.clone(), files.clone());
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn frontmatter_split() {
        let (config, source) = parse_test_file(
            "---\ndescription = \"x\"\n[[expect_errors]]\ncontains = \"unclosed\"\nline = 2\n---\n{if}\n",
        )
        .unwrap();
        assert_eq!(config.description.as_deref(), Some("x"));
        let expected = config.expect_errors.unwrap();
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].line, Some(2));
        assert_eq!(source, "{if}\n");
    }

    #[test]
    fn empty_frontmatter() {
        let (config, source) = parse_test_file("---\n---\n{if}{/if}").unwrap();
        assert!(config.expect_errors.is_none());
        assert_eq!(source, "{if}{/if}");
    }

    #[test]
    fn frontmatter_errors() {
        assert!(parse_test_file("{if}").is_err());
        assert!(parse_test_file("---\ndescription = \"x\"\n{if}").is_err());
        assert!(parse_test_file("---\nbogus = 1\n---\n").is_err());
    }

    #[test]
    fn error_expectations() {
        let source = "a\n{/if}\n";
        let result = Parser::new(source.to_string(), 0).parse();
        let matching = [ExpectedError {
            contains: "unopened macro: if".into(),
            line: Some(2),
        }];
        assert!(check_errors(source, &result.errors, &matching).is_none());

        let wrong_line = [ExpectedError {
            contains: "unopened".into(),
            line: Some(1),
        }];
        let reason = check_errors(source, &result.errors, &wrong_line).unwrap();
        assert!(reason.contains("expected on line 1, but span is on line 2"));

        let reason = check_errors(source, &result.errors, &[]).unwrap();
        assert!(reason.starts_with("expected 0 error(s), got 1"));
    }

    #[test]
    fn discovers_fixture_categories() {
        let categories = discover_categorized(&fixtures());
        assert!(categories.contains_key("balance"));
        assert!(categories.contains_key("syntax"));
        assert!(categories.values().all(|files| !files.is_empty()));
    }

    #[test]
    fn fixture_corpus_passes() {
        assert_eq!(run_tests(&fixtures(), true, &[], &Config::default()), 0);
    }

    #[test]
    fn single_fixture_file() {
        let file = fixtures().join("balance/mismatched_close.test.latte");
        assert_eq!(run_tests(&file, true, &[], &Config::default()), 0);
    }

    #[test]
    fn failing_test_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wrong.test.latte");
        std::fs::write(&file, "---\ndescription = \"claims clean\"\n---\n{if}\n").unwrap();
        assert_eq!(run_tests(dir.path(), true, &[], &Config::default()), 1);
    }

    #[test]
    fn unknown_category_runs_nothing() {
        assert_eq!(
            run_tests(&fixtures(), true, &["nope".to_string()], &Config::default()),
            1
        );
    }
}
