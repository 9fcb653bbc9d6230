use std::collections::HashMap;

use serde_json::{Map, Value as Json};
use tracing::warn;

use crate::value::Value;

/// One assignment `KEY = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: Value,
}

/// A logical line of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Comment text without the leading `#`.
    Comment(String),
    Blank,
    /// `@INCLUDE = file` kept unresolved.
    Include(String),
    /// `@INCLUDE_PATH = dirs` kept unresolved.
    IncludePath(Vec<String>),
    Setting(Setting),
}

/// An ordered configuration document.
///
/// Each key is stored at most once. Comments and blank lines are kept so
/// that a rewritten file stays readable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doxyfile {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Doxyfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).and_then(|&i| match &self.items[i] {
            Item::Setting(setting) => Some(&setting.value),
            _ => None,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Assigns a value, replacing an earlier one in place.
    ///
    /// Returns the previous value if the key was already set.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            if let Item::Setting(setting) = &mut self.items[i] {
                return Some(std::mem::replace(&mut setting.value, value));
            }
        }
        self.index.insert(key.clone(), self.items.len());
        self.items.push(Item::Setting(Setting { key, value }));
        None
    }

    /// `KEY += items`: extends the current value or creates a list.
    pub fn append(&mut self, key: impl Into<String>, items: Vec<String>) {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            if let Item::Setting(setting) = &mut self.items[i] {
                setting.value.extend(items);
                return;
            }
        }
        self.set(key, Value::List(items));
    }

    /// Removes a setting. Comments around it are left alone.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.index.remove(key)?;
        let removed = match self.items.remove(i) {
            Item::Setting(setting) => Some(setting.value),
            _ => None,
        };
        for pos in self.index.values_mut() {
            if *pos > i {
                *pos -= 1;
            }
        }
        removed
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.items.push(Item::Comment(text.into()));
    }

    pub fn push_blank(&mut self) {
        self.items.push(Item::Blank);
    }

    pub fn push_item(&mut self, item: Item) {
        match item {
            Item::Setting(Setting { key, value }) => {
                if self.set(key.clone(), value).is_some() {
                    warn!("{} assigned more than once, keeping the last value", key);
                }
            }
            other => self.items.push(other),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.items.iter().filter_map(|item| match item {
            Item::Setting(setting) => Some(setting),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.settings().map(|s| s.key.as_str())
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Settings as an ordered list of key/value pairs, for comparisons.
    #[cfg(test)]
    pub fn mapping(&self) -> Vec<(&str, &Value)> {
        self.settings().map(|s| (s.key.as_str(), &s.value)).collect()
    }

    /// Settings as a JSON object, in file order.
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        for setting in self.settings() {
            map.insert(
                setting.key.clone(),
                serde_json::to_value(&setting.value).unwrap_or(Json::Null),
            );
        }
        Json::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_set_and_get() {
        let mut doc = Doxyfile::new();

        assert!(doc.set("RECURSIVE", Value::Bool(true)).is_none());

        assert_eq!(doc.get("RECURSIVE"), Some(&Value::Bool(true)));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_set_twice_keeps_single_entry_at_first_position() {
        let mut doc = Doxyfile::new();
        doc.set("A", Value::Int(1));
        doc.set("B", Value::Int(2));

        let previous = doc.set("A", Value::Int(3));

        assert_eq!(previous, Some(Value::Int(1)));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(doc.get("A"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_append_creates_and_extends_list() {
        let mut doc = Doxyfile::new();

        doc.append("INPUT", vec!["src".to_string()]);
        doc.append("INPUT", vec!["lib".to_string(), "tools".to_string()]);

        assert_eq!(doc.get("INPUT"), Some(&list(&["src", "lib", "tools"])));
    }

    #[test]
    fn test_remove_reindexes_later_settings() {
        let mut doc = Doxyfile::new();
        doc.push_comment(" header");
        doc.set("A", Value::Int(1));
        doc.set("B", Value::Int(2));
        doc.set("C", Value::Int(3));

        assert_eq!(doc.remove("A"), Some(Value::Int(1)));
        doc.set("C", Value::Int(30));

        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(doc.get("C"), Some(&Value::Int(30)));
        assert_eq!(doc.items().len(), 3);
        assert!(doc.remove("A").is_none());
    }

    #[test]
    fn test_to_json_preserves_order() {
        let mut doc = Doxyfile::new();
        doc.set("Z", Value::Bool(false));
        doc.set("A", list(&["x", "y"]));

        let json = doc.to_json().to_string();

        assert_eq!(json, r#"{"Z":false,"A":["x","y"]}"#);
    }
}
