//! Table of the settings this tool understands.
//!
//! Only the options used to document a Python source tree are listed. Anything
//! else found in a file is kept and written back, but `check` flags it.

use std::fmt;

/// The value type an option expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int { min: i64, max: i64 },
    Str,
    List,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "boolean (YES/NO)"),
            Kind::Int { min, max } => write!(f, "integer in {}..={}", min, max),
            Kind::Str => write!(f, "string"),
            Kind::List => write!(f, "list"),
        }
    }
}

/// Default written by `init` for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
    List(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: Kind,
    pub default: DefaultValue,
    pub help: &'static str,
}

const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "PROJECT_NAME",
        kind: Kind::Str,
        default: DefaultValue::Str("My Project"),
        help: "Name of the project, shown on every generated page.",
    },
    OptionSpec {
        name: "PROJECT_NUMBER",
        kind: Kind::Str,
        default: DefaultValue::Str(""),
        help: "Project or revision number.",
    },
    OptionSpec {
        name: "PROJECT_BRIEF",
        kind: Kind::Str,
        default: DefaultValue::Str(""),
        help: "One line description shown at the top of each page.",
    },
    OptionSpec {
        name: "OUTPUT_DIRECTORY",
        kind: Kind::Str,
        default: DefaultValue::Str("docs"),
        help: "Base directory for all generated output.",
    },
    OptionSpec {
        name: "FULL_PATH_NAMES",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Prepend the full path before file names in the file list.",
    },
    OptionSpec {
        name: "JAVADOC_AUTOBRIEF",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Treat the first line of a Javadoc-style comment as the brief description.",
    },
    OptionSpec {
        name: "QT_AUTOBRIEF",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Treat the first line of a Qt-style comment as the brief description.",
    },
    OptionSpec {
        name: "MULTILINE_CPP_IS_BRIEF",
        kind: Kind::Bool,
        default: DefaultValue::Bool(false),
        help: "Treat a multi-line C++ comment block as a brief description.",
    },
    OptionSpec {
        name: "INHERIT_DOCS",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Undocumented members inherit the documentation of the member they override.",
    },
    OptionSpec {
        name: "OPTIMIZE_OUTPUT_FOR_PYTHON",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Tune the output for Python sources.",
    },
    OptionSpec {
        name: "EXTENSION_MAPPING",
        kind: Kind::List,
        default: DefaultValue::List(&["py=Python"]),
        help: "Map file extensions to parsers, as ext=language.",
    },
    OptionSpec {
        name: "EXTRACT_ALL",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Document all entities, even those without documentation.",
    },
    OptionSpec {
        name: "EXTRACT_PRIVATE",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Include private members.",
    },
    OptionSpec {
        name: "EXTRACT_PACKAGE",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Include package-level members.",
    },
    OptionSpec {
        name: "EXTRACT_STATIC",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Include static members.",
    },
    OptionSpec {
        name: "INPUT",
        kind: Kind::List,
        default: DefaultValue::List(&["."]),
        help: "Files and directories to scan.",
    },
    OptionSpec {
        name: "FILE_PATTERNS",
        kind: Kind::List,
        default: DefaultValue::List(&["*.py"]),
        help: "Glob patterns selecting files inside INPUT directories.",
    },
    OptionSpec {
        name: "RECURSIVE",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Search subdirectories of INPUT.",
    },
    OptionSpec {
        name: "EXCLUDE_PATTERNS",
        kind: Kind::List,
        default: DefaultValue::List(&["*/test/*", "*/build/*", "*/dist/*"]),
        help: "Glob patterns of files and directories to skip.",
    },
    OptionSpec {
        name: "GENERATE_HTML",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Generate HTML output.",
    },
    OptionSpec {
        name: "HTML_OUTPUT",
        kind: Kind::Str,
        default: DefaultValue::Str("html"),
        help: "HTML output directory, relative to OUTPUT_DIRECTORY.",
    },
    OptionSpec {
        name: "GENERATE_TREEVIEW",
        kind: Kind::Bool,
        default: DefaultValue::Bool(true),
        help: "Show a navigation tree in a side panel.",
    },
    OptionSpec {
        name: "TREEVIEW_WIDTH",
        kind: Kind::Int { min: 0, max: 1500 },
        default: DefaultValue::Int(250),
        help: "Initial width in pixels of the navigation tree.",
    },
    OptionSpec {
        name: "GENERATE_LATEX",
        kind: Kind::Bool,
        default: DefaultValue::Bool(false),
        help: "Generate LaTeX output.",
    },
];

/// Looks up the spec of a recognized option.
pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| spec.name == name)
}

/// All recognized options, in the order `init` writes them.
pub fn all() -> &'static [OptionSpec] {
    OPTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_option() {
        let spec = lookup("TREEVIEW_WIDTH").unwrap();

        assert_eq!(spec.kind, Kind::Int { min: 0, max: 1500 });
        assert_eq!(spec.default, DefaultValue::Int(250));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("recursive").is_none());
        assert!(lookup("RECURSIVE").is_some());
    }

    #[test]
    fn test_option_names_are_unique() {
        let mut names: Vec<_> = all().iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn test_defaults_match_kinds() {
        for spec in all() {
            let ok = matches!(
                (spec.kind, spec.default),
                (Kind::Bool, DefaultValue::Bool(_))
                    | (Kind::Int { .. }, DefaultValue::Int(_))
                    | (Kind::Str, DefaultValue::Str(_))
                    | (Kind::List, DefaultValue::List(_))
            );
            assert!(ok, "default of {} does not match its kind", spec.name);
        }
    }
}
