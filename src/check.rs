use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::doxyfile::Doxyfile;
use crate::lexer::Token;
use crate::schema::{self, Kind};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub key: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", label, self.key, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Directory INPUT entries are resolved against. Existence is not
    /// checked when unset.
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    fn warn(&mut self, key: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            key: key.to_string(),
            message: message.into(),
        });
    }

    fn error(&mut self, key: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            key: key.to_string(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// No errors. With `strict`, warnings count too.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors() == 0 && (!strict || self.warnings() == 0)
    }
}

/// Validates every setting of a document.
pub fn check(doc: &Doxyfile, options: &CheckOptions) -> Report {
    let mut report = Report::default();

    for setting in doc.settings() {
        let Some(spec) = schema::lookup(&setting.key) else {
            report.warn(&setting.key, "unknown option");
            continue;
        };
        check_kind(&mut report, &setting.key, &setting.value, spec.kind);
    }

    if let Some(mapping) = doc.get("EXTENSION_MAPPING") {
        for entry in mapping.as_list() {
            match entry.split_once('=') {
                Some((ext, lang)) if !ext.is_empty() && !lang.is_empty() => {}
                _ => report.warn(
                    "EXTENSION_MAPPING",
                    format!("{:?} is not of the form ext=language", entry),
                ),
            }
        }
    }

    if let (Some(base), Some(input)) = (&options.base_dir, doc.get("INPUT")) {
        for entry in input.as_list() {
            if !base.join(entry).exists() {
                report.warn("INPUT", format!("{} does not exist", entry));
            }
        }
    }

    let html = effective_bool(doc, "GENERATE_HTML");
    let latex = effective_bool(doc, "GENERATE_LATEX");
    if html == Some(false) && latex == Some(false) {
        report.warn("GENERATE_HTML", "no output format is enabled");
    }

    report
}

/// Value of a boolean option, using its default when unset.
fn effective_bool(doc: &Doxyfile, key: &str) -> Option<bool> {
    match doc.get(key) {
        Some(value) => value.as_bool(),
        None => schema::lookup(key).and_then(|spec| Value::from(spec.default).as_bool()),
    }
}

fn check_kind(report: &mut Report, key: &str, value: &Value, kind: Kind) {
    // Values that failed to coerce while parsing are kept as raw text.
    let result = match (value, kind) {
        (Value::Str(raw), Kind::Bool | Kind::Int { .. }) => {
            Value::coerce(&[Token::bare(raw.clone())], kind).map(|_| ())
        }
        _ => value.validate(kind),
    };
    if let Err(err) = result {
        report.error(key, format!("{} (expected {})", err, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse_str};
    use std::fs;
    use tempfile::TempDir;

    fn run(text: &str) -> Report {
        let doc = parse_str(text, &ParseOptions::verbatim()).unwrap();
        check(&doc, &CheckOptions::default())
    }

    #[test]
    fn test_valid_file_has_no_diagnostics() {
        let report = run("RECURSIVE = YES\nTREEVIEW_WIDTH = 250\nEXTENSION_MAPPING = py=Python\n");

        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert!(report.passed(true));
    }

    #[test]
    fn test_bad_bool_is_error() {
        let report = run("EXTRACT_PRIVATE = sometimes\n");

        assert_eq!(report.errors(), 1);
        assert_eq!(report.diagnostics[0].key, "EXTRACT_PRIVATE");
        assert!(!report.passed(false));
    }

    #[test]
    fn test_out_of_range_int_is_error() {
        let report = run("TREEVIEW_WIDTH = 5000\n");

        assert_eq!(report.errors(), 1);
        assert!(report.diagnostics[0].message.contains("outside 0..=1500"));
    }

    #[test]
    fn test_unknown_key_is_warning() {
        let report = run("SOMETHING_ELSE = 1\n");

        assert_eq!(report.warnings(), 1);
        assert!(report.passed(false));
        assert!(!report.passed(true));
    }

    #[test]
    fn test_bad_extension_mapping_is_warning() {
        let report = run("EXTENSION_MAPPING = py=Python pyw\n");

        assert_eq!(report.warnings(), 1);
        assert!(report.diagnostics[0].message.contains("pyw"));
    }

    #[test]
    fn test_no_output_format_is_warning() {
        let report = run("GENERATE_HTML = NO\nGENERATE_LATEX = NO\n");

        assert_eq!(report.warnings(), 1);
    }

    #[test]
    fn test_html_off_with_latex_unset_is_warning() {
        let report = run("GENERATE_HTML = NO\n");

        assert_eq!(report.warnings(), 1);
        assert_eq!(report.diagnostics[0].message, "no output format is enabled");
    }

    #[test]
    fn test_raw_value_with_quote_reports_expected_kind() {
        let report = run("EXTRACT_ALL = \"say \\\"hi\\\"\"\n");

        assert_eq!(report.errors(), 1);
        assert!(
            report.diagnostics[0].message.contains("expected boolean"),
            "{}",
            report.diagnostics[0].message
        );
    }

    #[test]
    fn test_missing_input_is_warning_with_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let doc = parse_str("INPUT = src missing\n", &ParseOptions::verbatim()).unwrap();
        let options = CheckOptions {
            base_dir: Some(dir.path().to_path_buf()),
        };

        let report = check(&doc, &options);

        assert_eq!(report.warnings(), 1);
        assert_eq!(report.diagnostics[0].message, "missing does not exist");
    }
}
