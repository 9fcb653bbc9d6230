use std::path::PathBuf;

use crate::parser::ParseOptions;

pub struct Config {
    pub file: PathBuf,
    pub expand_env: bool,
    pub follow_includes: bool,
    pub include_path: Vec<PathBuf>,
}

impl Config {
    /// Options for reading the file as the documentation tool would see it.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            expand_env: self.expand_env,
            follow_includes: self.follow_includes,
            include_path: self.include_path.clone(),
            base_dir: None,
        }
    }

    /// Directory of the configuration file, used to resolve INPUT entries.
    pub fn base_dir(&self) -> PathBuf {
        match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
