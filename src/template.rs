use chrono::Utc;

use crate::doxyfile::Doxyfile;
use crate::schema;
use crate::value::Value;

/// Values that override the schema defaults in a generated file.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    pub project_name: Option<String>,
    pub project_brief: Option<String>,
    pub input: Vec<String>,
}

/// Builds the configuration for documenting a Python source tree.
///
/// Every recognized option is written, each preceded by its help text.
pub fn python_project(options: &TemplateOptions) -> Doxyfile {
    let mut doc = Doxyfile::new();
    doc.push_comment(" Doxyfile for a Python project");
    doc.push_comment(format!(" Generated by doxyconf on {}", Utc::now().to_rfc3339()));

    for spec in schema::all() {
        doc.push_blank();
        doc.push_comment(format!(" {}", spec.help));

        let value = match spec.name {
            "PROJECT_NAME" => options.project_name.clone().map(Value::Str),
            "PROJECT_BRIEF" => options.project_brief.clone().map(Value::Str),
            "INPUT" if !options.input.is_empty() => Some(Value::List(options.input.clone())),
            _ => None,
        };
        doc.set(spec.name, value.unwrap_or_else(|| spec.default.into()));
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckOptions, check};
    use crate::parser::{ParseOptions, parse_str};
    use crate::writer;

    #[test]
    fn test_template_has_every_option() {
        let doc = python_project(&TemplateOptions::default());

        assert_eq!(doc.len(), schema::all().len());
        assert_eq!(doc.get("OPTIMIZE_OUTPUT_FOR_PYTHON"), Some(&Value::Bool(true)));
        assert_eq!(doc.get("FILE_PATTERNS").unwrap().as_list(), vec!["*.py"]);
        assert_eq!(doc.get("TREEVIEW_WIDTH").and_then(Value::as_int), Some(250));
    }

    #[test]
    fn test_template_applies_overrides() {
        let options = TemplateOptions {
            project_name: Some("pytest gui".to_string()),
            project_brief: None,
            input: vec!["pytest_gui".to_string(), "scripts".to_string()],
        };

        let doc = python_project(&options);

        assert_eq!(doc.get("PROJECT_NAME").and_then(Value::as_str), Some("pytest gui"));
        assert_eq!(doc.get("INPUT").unwrap().as_list(), vec!["pytest_gui", "scripts"]);
    }

    #[test]
    fn test_template_passes_check() {
        let doc = python_project(&TemplateOptions::default());

        let report = check(&doc, &CheckOptions::default());

        assert!(report.passed(true), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_template_round_trips() {
        let doc = python_project(&TemplateOptions::default());
        let text = writer::to_string(&doc);

        let reparsed = parse_str(&text, &ParseOptions::verbatim()).unwrap();

        assert_eq!(reparsed, doc);
        assert_eq!(writer::to_string(&reparsed), text);
    }
}
