//! Reader for Doxygen-style configuration files.
//!
//! Line grammar:
//!
//! ```text
//! # comment
//! KEY = value ...
//! KEY += value ...
//! @INCLUDE = other.cfg
//! @INCLUDE_PATH = dir ...
//! ```
//!
//! A backslash at the end of a line continues the value on the next line.
//! `$(NAME)` is replaced by the environment variable `NAME` when enabled.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::doxyfile::{Doxyfile, Item, Setting};
use crate::lexer::{self, LexError, Token};
use crate::schema::{self, Kind};
use crate::value::{self, Value};

/// Nesting limit for `@INCLUDE`, which also stops include cycles.
pub const MAX_INCLUDE_DEPTH: usize = 10;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{path}:{line}: expected `KEY = value`, got {text:?}")]
    MissingAssignment {
        path: String,
        line: usize,
        text: String,
    },

    #[error("{path}:{line}: invalid option name {key:?}")]
    InvalidKey {
        path: String,
        line: usize,
        key: String,
    },

    #[error("{path}:{line}: unknown directive @{name}")]
    UnknownDirective {
        path: String,
        line: usize,
        name: String,
    },

    #[error("{path}:{line}: malformed value")]
    Lex {
        path: String,
        line: usize,
        #[source]
        source: LexError,
    },

    #[error("include file {0:?} not found")]
    IncludeNotFound(String),

    #[error("includes nested deeper than 10 levels at {0}")]
    IncludeDepth(String),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Knobs for reading a file.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Replace `$(NAME)` with environment variables.
    pub expand_env: bool,
    /// Read `@INCLUDE` files instead of keeping the directive.
    pub follow_includes: bool,
    /// Extra directories searched for `@INCLUDE` files.
    pub include_path: Vec<PathBuf>,
    /// Directory relative includes are resolved against.
    pub base_dir: Option<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            expand_env: true,
            follow_includes: true,
            include_path: Vec::new(),
            base_dir: None,
        }
    }
}

impl ParseOptions {
    /// Options that keep the file exactly as written, for rewriting it.
    pub fn verbatim() -> Self {
        Self {
            expand_env: false,
            follow_includes: false,
            ..Self::default()
        }
    }
}

/// Parses configuration text.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Doxyfile, ParseError> {
    Parser::new(options.clone(), "<input>".to_string()).run(text, 0)
}

/// Reads and parses a configuration file. Includes are resolved next to it.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Doxyfile, ParseError> {
    let mut options = options.clone();
    if options.base_dir.is_none() {
        options.base_dir = path.parent().map(Path::to_path_buf);
    }
    let text = read(path)?;
    Parser::new(options, path.display().to_string()).run(&text, 0)
}

fn read(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Physical lines joined on trailing backslashes, tagged with the first
/// line number of each logical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        if pending.is_none() && line.trim_start().starts_with('#') {
            lines.push((i + 1, line.to_string()));
            continue;
        }
        let (start, mut buf) = pending.take().unwrap_or((i + 1, String::new()));

        if let Some(head) = line.strip_suffix('\\') {
            buf.push_str(head);
            buf.push(' ');
            pending = Some((start, buf));
        } else {
            buf.push_str(line);
            lines.push((start, buf));
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

enum Op {
    Assign,
    Append,
}

struct Parser {
    options: ParseOptions,
    path: String,
    /// Reading an included file: only its settings reach the document.
    nested: bool,
}

impl Parser {
    fn new(options: ParseOptions, path: String) -> Self {
        Self {
            options,
            path,
            nested: false,
        }
    }

    fn run(&mut self, text: &str, depth: usize) -> Result<Doxyfile, ParseError> {
        let mut doc = Doxyfile::new();
        self.run_into(&mut doc, text, depth)?;
        Ok(doc)
    }

    /// Applies every line of `text` to `doc`, so `+=` sees earlier values
    /// including those of the including file.
    fn run_into(&mut self, doc: &mut Doxyfile, text: &str, depth: usize) -> Result<(), ParseError> {
        for (line_no, line) in logical_lines(text) {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if !self.nested {
                    doc.push_blank();
                }
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                if !self.nested {
                    doc.push_comment(comment);
                }
                continue;
            }

            let (lhs, op, rhs) = self.split_assignment(trimmed, line_no)?;
            let rhs = if self.options.expand_env {
                lexer::expand_env(rhs, |name| std::env::var(name).ok())
            } else {
                rhs.to_string()
            };
            let tokens = lexer::tokenize(&rhs).map_err(|source| ParseError::Lex {
                path: self.path.clone(),
                line: line_no,
                source,
            })?;

            if let Some(name) = lhs.strip_prefix('@') {
                self.directive(doc, name, &tokens, line_no, depth)?;
                continue;
            }

            if !is_valid_key(lhs) {
                return Err(ParseError::InvalidKey {
                    path: self.path.clone(),
                    line: line_no,
                    key: lhs.to_string(),
                });
            }

            match op {
                Op::Assign => {
                    let value = typed_value(lhs, &tokens);
                    doc.push_item(Item::Setting(Setting {
                        key: lhs.to_string(),
                        value,
                    }));
                }
                Op::Append => append_value(doc, lhs, &tokens),
            }
        }

        Ok(())
    }

    fn split_assignment<'a>(
        &self,
        line: &'a str,
        line_no: usize,
    ) -> Result<(&'a str, Op, &'a str), ParseError> {
        let Some(eq) = line.find('=') else {
            return Err(ParseError::MissingAssignment {
                path: self.path.clone(),
                line: line_no,
                text: line.to_string(),
            });
        };
        let (lhs, op) = match line[..eq].strip_suffix('+') {
            Some(head) => (head, Op::Append),
            None => (&line[..eq], Op::Assign),
        };
        Ok((lhs.trim(), op, &line[eq + 1..]))
    }

    fn directive(
        &mut self,
        doc: &mut Doxyfile,
        name: &str,
        tokens: &[Token],
        line_no: usize,
        depth: usize,
    ) -> Result<(), ParseError> {
        let args: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
        match name {
            "INCLUDE_PATH" => {
                if self.options.follow_includes {
                    let base = self.options.base_dir.clone().unwrap_or_default();
                    self.options
                        .include_path
                        .extend(args.iter().map(|dir| base.join(dir)));
                } else {
                    doc.push_item(Item::IncludePath(args));
                }
                Ok(())
            }
            "INCLUDE" => {
                if !self.options.follow_includes {
                    for file in args {
                        doc.push_item(Item::Include(file));
                    }
                    return Ok(());
                }
                for file in args {
                    self.include(doc, &file, depth + 1)?;
                }
                Ok(())
            }
            other => Err(ParseError::UnknownDirective {
                path: self.path.clone(),
                line: line_no,
                name: other.to_string(),
            }),
        }
    }

    fn resolve(&self, file: &str) -> Option<PathBuf> {
        let candidate = Path::new(file);
        if candidate.is_absolute() {
            return candidate.exists().then(|| candidate.to_path_buf());
        }
        self.options
            .base_dir
            .iter()
            .chain(self.options.include_path.iter())
            .map(|dir| dir.join(file))
            .chain(std::iter::once(candidate.to_path_buf()))
            .find(|path| path.is_file())
    }

    fn include(&self, doc: &mut Doxyfile, file: &str, depth: usize) -> Result<(), ParseError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(ParseError::IncludeDepth(file.to_string()));
        }
        let path = self
            .resolve(file)
            .ok_or_else(|| ParseError::IncludeNotFound(file.to_string()))?;
        debug!("including {}", path.display());

        let mut options = self.options.clone();
        options.base_dir = path.parent().map(Path::to_path_buf);
        let text = read(&path)?;
        Parser {
            options,
            path: path.display().to_string(),
            nested: true,
        }
        .run_into(doc, &text, depth)
    }
}

/// Value for `KEY = tokens`, typed by the schema when the key is known.
pub fn typed_value(key: &str, tokens: &[Token]) -> Value {
    match schema::lookup(key) {
        Some(spec) => Value::coerce(tokens, spec.kind).unwrap_or_else(|err| {
            debug!("{}: {}, keeping raw text", key, err);
            Value::Str(value::join_tokens(tokens))
        }),
        None => Value::from_tokens(tokens),
    }
}

/// Applies `KEY += tokens` to a document.
pub fn append_value(doc: &mut Doxyfile, key: &str, tokens: &[Token]) {
    match schema::lookup(key).map(|spec| spec.kind) {
        Some(Kind::List) | None => doc.append(key, value::split_list(tokens)),
        Some(Kind::Str) => {
            let extra = value::join_tokens(tokens);
            let joined = match doc.get(key) {
                Some(Value::Str(current)) if !current.is_empty() => {
                    format!("{} {}", current, extra)
                }
                _ => extra,
            };
            doc.set(key, Value::Str(joined));
        }
        Some(kind) => {
            warn!("{} is a {} option, treating += as =", key, kind);
            doc.set(key, typed_value(key, tokens));
        }
    }
}
