mod check;
mod config;
mod doxyfile;
mod lexer;
mod parser;
mod schema;
mod template;
mod value;
mod writer;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::check::{CheckOptions, Severity};
use crate::config::Config;
use crate::doxyfile::Doxyfile;
use crate::lexer::Token;
use crate::parser::ParseOptions;
use crate::schema::Kind;
use crate::template::TemplateOptions;
use crate::value::Value;

/// Doxygen configuration tool
#[derive(Parser, Debug)]
#[command(name = "doxyconf")]
#[command(about = "Read, check and edit Doxygen configuration files for Python projects")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "Doxyfile", env = "DOXYCONF_FILE", global = true)]
    file: PathBuf,

    /// Do not expand $(VAR) references
    #[arg(long, global = true)]
    no_env: bool,

    /// Do not read @INCLUDE files
    #[arg(long, global = true)]
    no_includes: bool,

    /// Extra directory searched for @INCLUDE files
    #[arg(short = 'I', long, env = "DOXYCONF_INCLUDE_PATH", value_delimiter = ':', global = true)]
    include_path: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every setting
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Print one setting, falling back to its default
    Get {
        key: String,
        #[arg(long)]
        json: bool,
    },
    /// Assign a setting
    Set {
        key: String,
        values: Vec<String>,
        /// Append to the current value like `+=`
        #[arg(short, long)]
        append: bool,
    },
    /// Remove a setting
    Unset { key: String },
    /// Validate the recognized options
    Check {
        /// Fail on warnings as well
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the file in canonical layout
    Fmt {
        /// Only report whether the file would change
        #[arg(long)]
        check: bool,
    },
    /// Write a new configuration for a Python project
    Init {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        brief: Option<String>,
        /// Source directory to document (repeatable)
        #[arg(long)]
        input: Vec<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List the recognized options
    Keys,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("doxyconf=info".parse()?))
        .init();

    let args = Args::parse();

    let config = Config {
        file: args.file.clone(),
        expand_env: !args.no_env,
        follow_includes: !args.no_includes,
        include_path: args.include_path.clone(),
    };
    debug!("using configuration file {}", config.file.display());

    match args.command {
        Command::Show { json } => show(&config, json),
        Command::Get { key, json } => get(&config, &key, json),
        Command::Set { key, values, append } => set(&config, &key, &values, append),
        Command::Unset { key } => unset(&config, &key),
        Command::Check { strict, json } => run_check(&config, strict, json),
        Command::Fmt { check } => fmt(&config, check),
        Command::Init { name, brief, input, force } => init(
            &config,
            TemplateOptions {
                project_name: name,
                project_brief: brief,
                input,
            },
            force,
        ),
        Command::Keys => {
            keys();
            Ok(())
        }
    }
}

/// The file as the documentation tool resolves it.
fn load(config: &Config) -> Result<Doxyfile> {
    parser::parse_file(&config.file, &config.parse_options())
        .with_context(|| format!("failed to load {}", config.file.display()))
}

/// The file as written, for editing it in place.
fn load_verbatim(config: &Config) -> Result<Doxyfile> {
    parser::parse_file(&config.file, &ParseOptions::verbatim())
        .with_context(|| format!("failed to load {}", config.file.display()))
}

fn save(config: &Config, doc: &Doxyfile) -> Result<()> {
    writer::write_file(&config.file, doc)
        .with_context(|| format!("failed to write {}", config.file.display()))?;
    info!("Wrote {}", config.file.display());
    Ok(())
}

fn show(config: &Config, json: bool) -> Result<()> {
    let doc = load(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc.to_json())?);
        return Ok(());
    }
    if doc.is_empty() {
        info!("{} has no settings", config.file.display());
    }
    for setting in doc.settings() {
        println!("{} = {}", setting.key, setting.value);
    }
    Ok(())
}

/// The value of `key`, or its default when a recognized key is unset.
fn resolve_value(doc: &Doxyfile, key: &str) -> Option<Value> {
    match doc.get(key) {
        Some(value) => Some(value.clone()),
        None => {
            let spec = schema::lookup(key)?;
            debug!("{} is not set, using its default", key);
            Some(Value::from(spec.default))
        }
    }
}

fn get(config: &Config, key: &str, json: bool) -> Result<()> {
    let doc = load(config)?;
    let Some(value) = resolve_value(&doc, key) else {
        bail!("{} is not set in {}", key, config.file.display());
    };
    if json {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        match &value {
            Value::List(items) => items.iter().for_each(|item| println!("{}", item)),
            other => println!("{}", other),
        }
    }
    Ok(())
}

/// Command line words as value tokens. Words with spaces stay whole.
fn cli_tokens(values: &[String]) -> Vec<Token> {
    values
        .iter()
        .map(|v| {
            if v.chars().any(char::is_whitespace) {
                Token::quoted(v.clone())
            } else {
                Token::bare(v.clone())
            }
        })
        .collect()
}

fn ensure_key(key: &str) -> Result<()> {
    if !parser::is_valid_key(key) {
        bail!("{:?} is not a valid option name", key);
    }
    Ok(())
}

/// Values are written on a single line, so line breaks cannot be stored.
fn ensure_single_line(what: &str, text: &str) -> Result<()> {
    if text.chars().any(char::is_control) {
        bail!("{} contains a control character: {:?}", what, text);
    }
    Ok(())
}

fn set(config: &Config, key: &str, values: &[String], append: bool) -> Result<()> {
    ensure_key(key)?;
    for value in values {
        ensure_single_line(key, value)?;
    }
    let mut doc = load_verbatim(config)?;
    let tokens = cli_tokens(values);

    let spec = schema::lookup(key);
    if spec.is_none() {
        warn!("{} is not a recognized option", key);
    }

    if append {
        // `+=` on a bool or int replaces the value, so it must still fit.
        if let Some(spec) = spec.filter(|s| matches!(s.kind, Kind::Bool | Kind::Int { .. })) {
            Value::coerce(&tokens, spec.kind)
                .with_context(|| format!("invalid value for {} (expected {})", key, spec.kind))?;
        }
        parser::append_value(&mut doc, key, &tokens);
    } else {
        let value = match spec {
            Some(spec) => Value::coerce(&tokens, spec.kind)
                .with_context(|| format!("invalid value for {} (expected {})", key, spec.kind))?,
            None => parser::typed_value(key, &tokens),
        };
        if !doc.contains(key) {
            info!("adding {}", key);
        }
        if let Some(previous) = doc.set(key, value) {
            debug!("{} was {} ({})", key, previous, previous.kind_name());
        }
    }

    save(config, &doc)
}

fn unset(config: &Config, key: &str) -> Result<()> {
    ensure_key(key)?;
    let mut doc = load_verbatim(config)?;
    if doc.remove(key).is_none() {
        bail!("{} is not set in {}", key, config.file.display());
    }
    save(config, &doc)
}

fn run_check(config: &Config, strict: bool, json: bool) -> Result<()> {
    let doc = load(config)?;
    let options = CheckOptions {
        base_dir: Some(config.base_dir()),
    };
    let report = check::check(&doc, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &report.diagnostics {
            match diagnostic.severity {
                Severity::Error => eprintln!("{}", diagnostic),
                Severity::Warning => println!("{}", diagnostic),
            }
        }
        info!(
            "{}: {} settings, {} errors, {} warnings",
            config.file.display(),
            doc.len(),
            report.errors(),
            report.warnings()
        );
    }

    if !report.passed(strict) {
        bail!("{} failed validation", config.file.display());
    }
    Ok(())
}

fn fmt(config: &Config, check_only: bool) -> Result<()> {
    let original = std::fs::read_to_string(&config.file)
        .with_context(|| format!("failed to read {}", config.file.display()))?;
    let doc = parser::parse_str(&original, &ParseOptions::verbatim())
        .with_context(|| format!("failed to parse {}", config.file.display()))?;
    let formatted = writer::to_string(&doc);

    if formatted == original {
        info!("{} is already formatted", config.file.display());
        return Ok(());
    }
    if check_only {
        bail!("{} is not formatted", config.file.display());
    }
    save(config, &doc)
}

fn init(config: &Config, options: TemplateOptions, force: bool) -> Result<()> {
    if let Some(name) = &options.project_name {
        ensure_single_line("--name", name)?;
    }
    if let Some(brief) = &options.project_brief {
        ensure_single_line("--brief", brief)?;
    }
    for input in &options.input {
        ensure_single_line("--input", input)?;
    }
    if config.file.exists() && !force {
        bail!("{} already exists, use --force to overwrite", config.file.display());
    }
    if let Some(parent) = config.file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let doc = template::python_project(&options);
    save(config, &doc)
}

fn keys() {
    for spec in schema::all() {
        println!("{:<27} {:<24} {}", spec.name, spec.kind.to_string(), spec.help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, text: &str) -> Config {
        let file = dir.path().join("Doxyfile");
        fs::write(&file, text).unwrap();
        Config {
            file,
            expand_env: false,
            follow_includes: false,
            include_path: Vec::new(),
        }
    }

    fn words(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_set_rejects_value_of_wrong_kind() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "RECURSIVE = YES\n");

        let err = set(&config, "RECURSIVE", &words(&["maybe"]), false).unwrap_err();

        assert!(err.to_string().contains("expected boolean"), "{}", err);
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "RECURSIVE = YES\n");
    }

    #[test]
    fn test_set_append_rejects_value_of_wrong_kind() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "TREEVIEW_WIDTH = 250\n");

        assert!(set(&config, "RECURSIVE", &words(&["maybe"]), true).is_err());
        assert!(set(&config, "TREEVIEW_WIDTH", &words(&["9000"]), true).is_err());

        assert_eq!(fs::read_to_string(&config.file).unwrap(), "TREEVIEW_WIDTH = 250\n");
    }

    #[test]
    fn test_set_append_extends_list() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "INPUT = src\n");

        set(&config, "INPUT", &words(&["lib"]), true).unwrap();

        let doc = load_verbatim(&config).unwrap();
        assert_eq!(doc.get("INPUT"), Some(&Value::List(words(&["src", "lib"]))));
    }

    #[test]
    fn test_set_and_unset_reject_invalid_key() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "RECURSIVE = YES\n");

        for key in ["1BAD", "A B", "@INCLUDE", ""] {
            assert!(set(&config, key, &words(&["x"]), false).is_err(), "{:?}", key);
            assert!(unset(&config, key).is_err(), "{:?}", key);
        }

        assert_eq!(fs::read_to_string(&config.file).unwrap(), "RECURSIVE = YES\n");
    }

    #[test]
    fn test_set_rejects_line_breaks() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "PROJECT_NAME = demo\n");

        assert!(set(&config, "PROJECT_NAME", &words(&["a\nRECURSIVE = NO"]), false).is_err());
        assert!(set(&config, "PROJECT_BRIEF", &words(&["a\rb"]), false).is_err());

        assert_eq!(fs::read_to_string(&config.file).unwrap(), "PROJECT_NAME = demo\n");
    }

    #[test]
    fn test_set_keeps_env_references_and_includes() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "@INCLUDE = base.cfg\nINPUT = $(SRC)\n");

        set(&config, "RECURSIVE", &words(&["yes"]), false).unwrap();
        unset(&config, "INPUT").unwrap();
        set(&config, "EXCLUDE_PATTERNS", &words(&["$(SRC)/build"]), false).unwrap();

        let written = fs::read_to_string(&config.file).unwrap();
        assert!(written.contains("@INCLUDE"), "{}", written);
        assert!(written.contains("base.cfg"), "{}", written);
        assert!(written.contains("$(SRC)/build"), "{}", written);
        let doc = load_verbatim(&config).unwrap();
        assert_eq!(doc.get("RECURSIVE"), Some(&Value::Bool(true)));
        assert!(!doc.contains("INPUT"));
    }

    #[test]
    fn test_resolve_value_falls_back_to_default() {
        let doc = parser::parse_str("RECURSIVE = NO\n", &ParseOptions::verbatim()).unwrap();

        assert_eq!(resolve_value(&doc, "RECURSIVE"), Some(Value::Bool(false)));
        assert_eq!(resolve_value(&doc, "TREEVIEW_WIDTH"), Some(Value::Int(250)));
        assert_eq!(resolve_value(&doc, "NOT_AN_OPTION"), None);
    }

    #[test]
    fn test_unset_missing_key_is_error() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "RECURSIVE = YES\n");

        assert!(unset(&config, "INPUT").is_err());
    }

    #[test]
    fn test_fmt_check_then_rewrite() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "RECURSIVE=YES\n");

        assert!(fmt(&config, true).is_err());
        fmt(&config, false).unwrap();

        assert!(fmt(&config, true).is_ok());
        let doc = load_verbatim(&config).unwrap();
        assert_eq!(doc.get("RECURSIVE"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "RECURSIVE = NO\n");
        let options = || TemplateOptions {
            project_name: Some("demo".to_string()),
            project_brief: None,
            input: Vec::new(),
        };

        assert!(init(&config, options(), false).is_err());
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "RECURSIVE = NO\n");

        init(&config, options(), true).unwrap();
        let doc = load_verbatim(&config).unwrap();
        assert_eq!(doc.get("PROJECT_NAME"), Some(&Value::Str("demo".to_string())));
    }

    #[test]
    fn test_init_rejects_line_breaks() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            file: dir.path().join("Doxyfile"),
            expand_env: false,
            follow_includes: false,
            include_path: Vec::new(),
        };
        let options = TemplateOptions {
            project_name: None,
            project_brief: Some("first\nsecond".to_string()),
            input: Vec::new(),
        };

        assert!(init(&config, options, false).is_err());
        assert!(!config.file.exists());
    }
}
