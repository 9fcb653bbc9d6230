use serde::Serialize;
use thiserror::Error;

use crate::lexer::Token;
use crate::schema::{DefaultValue, Kind};

/// Typed value of a setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("expected YES or NO, got {0:?}")]
    NotBool(String),

    #[error("expected an integer, got {0:?}")]
    NotInt(String),

    #[error("{value} is outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("YES") {
        Some(true)
    } else if text.eq_ignore_ascii_case("NO") {
        Some(false)
    } else {
        None
    }
}

/// Token texts separated by single spaces.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Value {
    /// Guesses a type for a setting with no known kind.
    pub fn from_tokens(tokens: &[Token]) -> Value {
        match tokens {
            [] => Value::Str(String::new()),
            [single] if !single.quoted => {
                if let Some(b) = parse_bool(&single.text) {
                    Value::Bool(b)
                } else if let Ok(n) = single.text.parse::<i64>() {
                    Value::Int(n)
                } else {
                    Value::Str(single.text.clone())
                }
            }
            [single] => Value::Str(single.text.clone()),
            many => Value::List(many.iter().map(|t| t.text.clone()).collect()),
        }
    }

    /// Converts tokens to the declared kind of an option.
    pub fn coerce(tokens: &[Token], kind: Kind) -> Result<Value, ValueError> {
        match kind {
            Kind::Bool => {
                let text = join_tokens(tokens);
                parse_bool(&text)
                    .map(Value::Bool)
                    .ok_or(ValueError::NotBool(text))
            }
            Kind::Int { min, max } => {
                let text = join_tokens(tokens);
                let value: i64 = text.parse().map_err(|_| ValueError::NotInt(text.clone()))?;
                if value < min || value > max {
                    return Err(ValueError::OutOfRange { value, min, max });
                }
                Ok(Value::Int(value))
            }
            Kind::Str => Ok(Value::Str(join_tokens(tokens))),
            Kind::List => Ok(Value::List(split_list(tokens))),
        }
    }

    /// Checks an already typed value against a kind.
    pub fn validate(&self, kind: Kind) -> Result<(), ValueError> {
        match (kind, self) {
            (Kind::Bool, Value::Bool(_)) => Ok(()),
            (Kind::Bool, other) => Err(ValueError::NotBool(other.to_string())),
            (Kind::Int { min, max }, Value::Int(value)) => {
                if *value < min || *value > max {
                    Err(ValueError::OutOfRange { value: *value, min, max })
                } else {
                    Ok(())
                }
            }
            (Kind::Int { .. }, other) => Err(ValueError::NotInt(other.to_string())),
            (Kind::Str | Kind::List, _) => Ok(()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Views the value as a list. A single string counts as a one-element list.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Value::List(items) => items.iter().map(String::as_str).collect(),
            Value::Str(s) if s.is_empty() => Vec::new(),
            Value::Str(s) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Extends the value with more items, turning it into a list.
    pub fn extend(&mut self, items: Vec<String>) {
        let mut list: Vec<String> = match std::mem::replace(self, Value::List(Vec::new())) {
            Value::List(existing) => existing,
            Value::Str(s) if s.is_empty() => Vec::new(),
            other => vec![other.to_string()],
        };
        list.extend(items);
        *self = Value::List(list);
    }
}

impl From<DefaultValue> for Value {
    fn from(default: DefaultValue) -> Self {
        match default {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(n) => Value::Int(n),
            DefaultValue::Str(s) => Value::Str(s.to_string()),
            DefaultValue::List(items) => Value::List(items.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Plain rendering, without quoting. Lists are space separated.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "YES"),
            Value::Bool(false) => write!(f, "NO"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

/// List items: quoted tokens are kept whole, bare tokens also split on commas.
pub fn split_list(tokens: &[Token]) -> Vec<String> {
    let mut items = Vec::new();
    for token in tokens {
        if token.quoted {
            items.push(token.text.clone());
        } else {
            items.extend(
                token
                    .text
                    .split(',')
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        }
    }
    items
}
