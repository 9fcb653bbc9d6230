//! Serializer producing the same layout `doxygen -g` uses.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::doxyfile::{Doxyfile, Item, Setting};
use crate::schema;
use crate::value::Value;

/// Option names are padded to this width before the `=`.
const KEY_WIDTH: usize = 23;

fn needs_quotes(token: &str) -> bool {
    token.is_empty()
        || token.ends_with('\\')
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | ',' | '#'))
}

/// Quotes a token when reading it back would split or alter it.
fn quote(token: &str) -> String {
    if !needs_quotes(token) {
        return token.to_string();
    }
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// A string of an untyped key must not read back as a bool or number.
fn quote_untyped_str(text: &str) -> String {
    let ambiguous = text.eq_ignore_ascii_case("YES")
        || text.eq_ignore_ascii_case("NO")
        || text.parse::<i64>().is_ok();
    if ambiguous {
        format!("\"{}\"", text)
    } else {
        quote(text)
    }
}

fn write_list(out: &mut String, items: &[String]) {
    let indent = " ".repeat(KEY_WIDTH + 2);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            let _ = write!(out, " \\\n{}", indent);
        }
        out.push_str(&quote(item));
    }
}

fn write_setting(out: &mut String, setting: &Setting) {
    let known = schema::lookup(&setting.key).is_some();
    let _ = write!(out, "{:<width$}=", setting.key, width = KEY_WIDTH);

    match &setting.value {
        Value::Str(s) if s.is_empty() => {}
        Value::List(items) if items.is_empty() => {}
        // An untyped one-element list reads back as a string unless appended.
        Value::List(items) if items.len() == 1 && !known => {
            let _ = write!(
                out,
                "\n{:<width$}+= {}",
                setting.key,
                quote(&items[0]),
                width = KEY_WIDTH - 1
            );
        }
        Value::List(items) => {
            out.push(' ');
            write_list(out, items);
        }
        Value::Str(s) if !known => {
            out.push(' ');
            out.push_str(&quote_untyped_str(s));
        }
        Value::Str(s) => {
            out.push(' ');
            out.push_str(&quote(s));
        }
        other => {
            let _ = write!(out, " {}", other);
        }
    }
    out.push('\n');
}

/// Renders a document as configuration text.
pub fn to_string(doc: &Doxyfile) -> String {
    let mut out = String::new();

    for item in doc.items() {
        match item {
            Item::Comment(text) => {
                let _ = writeln!(out, "#{}", text);
            }
            Item::Blank => out.push('\n'),
            Item::Include(file) => {
                let _ = writeln!(out, "{:<width$}= {}", "@INCLUDE", quote(file), width = KEY_WIDTH);
            }
            Item::IncludePath(dirs) => {
                let _ = write!(out, "{:<width$}=", "@INCLUDE_PATH", width = KEY_WIDTH);
                if !dirs.is_empty() {
                    out.push(' ');
                    write_list(&mut out, dirs);
                }
                out.push('\n');
            }
            Item::Setting(setting) => write_setting(&mut out, setting),
        }
    }

    out
}

/// Writes a document to disk, replacing the file.
pub fn write_file(path: &Path, doc: &Doxyfile) -> std::io::Result<()> {
    fs::write(path, to_string(doc))
}
