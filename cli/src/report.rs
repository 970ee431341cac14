use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::StandardStream;
use serde::Serialize;

use latte::ParseError;

/// Output format for `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Annotated source snippets
    #[default]
    Human,
    /// One JSON array of diagnostics on stdout
    Json,
}

/// A diagnostic as written by `--format json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsonDiagnostic {
    pub file: String,
    pub kind: &'static str,
    pub message: String,
    pub start: usize,
    pub end: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based.
    pub column: usize,
    pub severity: &'static str,
}

pub fn emit_human(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    errors: &[ParseError],
) {
    for error in errors {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    }
}

pub fn to_json(files: &SimpleFiles<String, String>, errors: &[ParseError]) -> Vec<JsonDiagnostic> {
    errors
        .iter()
        .map(|error| {
            let file = files.name(error.file_id).unwrap_or_default();
            let (line, column) = files
                .location(error.file_id, error.start())
                .map(|loc| (loc.line_number, loc.column_number))
                .unwrap_or((0, 0));
            JsonDiagnostic {
                file,
                kind: error.kind.as_str(),
                message: error.message.clone(),
                start: error.start(),
                end: error.end(),
                line,
                column,
                severity: "error",
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use latte::Parser;

    #[test]
    fn json_locations_are_one_based() {
        let mut files = SimpleFiles::new();
        let source = "<p>\n  {if $a}\n</p>\n".to_string();
        let file_id = files.add("page.latte".to_string(), source.clone());
        let result = Parser::new(source, file_id).parse();

        let json = to_json(&files, &result.errors);
        assert_eq!(
            json,
            vec![JsonDiagnostic {
                file: "page.latte".to_string(),
                kind: "unclosed-macro",
                message: "unclosed macro: if".to_string(),
                start: 7,
                end: 9,
                line: 2,
                column: 4,
                severity: "error",
            }]
        );
    }

    #[test]
    fn json_serialization_shape() {
        let diagnostic = JsonDiagnostic {
            file: "a.latte".to_string(),
            kind: "unopened-macro",
            message: "unopened macro: if".to_string(),
            start: 1,
            end: 4,
            line: 1,
            column: 2,
            severity: "error",
        };
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["kind"], "unopened-macro");
        assert_eq!(value["line"], 1);
        assert_eq!(value["severity"], "error");
    }
}
