use thiserror::Error;
use tracing::debug;

/// A single word of a setting's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Whether the word was written inside double quotes.
    pub quoted: bool,
}

impl Token {
    pub fn bare(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: false }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: true }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LexError {
    #[error("unterminated quote starting at column {0}")]
    UnterminatedQuote(usize),
}

/// Splits a value into whitespace separated tokens.
///
/// Double quotes group a token. Inside quotes `\"` and `\\` are escapes,
/// any other backslash is kept as written.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut buf = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.peek() {
                        Some(&(_, next @ ('"' | '\\'))) => {
                            buf.push(next);
                            chars.next();
                        }
                        _ => buf.push('\\'),
                    },
                    other => buf.push(other),
                }
            }
            if !closed {
                let column = text[..start].chars().count() + 1;
                return Err(LexError::UnterminatedQuote(column));
            }
            tokens.push(Token::quoted(buf));
            continue;
        }

        let mut buf = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == '"' {
                break;
            }
            buf.push(c);
            chars.next();
        }
        tokens.push(Token::bare(buf));
    }

    Ok(tokens)
}

/// Replaces every `$(NAME)` with the value `lookup` returns for `NAME`.
///
/// Unset variables expand to nothing. An opening `$(` without a closing
/// parenthesis is left untouched.
pub fn expand_env<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find("$(") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        match after.find(')') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => debug!("environment variable {} is not set", name),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[idx..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}
