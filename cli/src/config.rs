use std::path::{Path, PathBuf};

use serde::Deserialize;

use latte::{PairMacros, Syntax};

use crate::error::CliError;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "latte-check.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Initial delimiter syntax for every template.
    #[serde(default)]
    pub syntax: Option<String>,

    #[serde(default)]
    pub macros: MacroConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacroConfig {
    /// Additional macros that need a closing tag.
    #[serde(default)]
    pub pair: Vec<String>,

    /// Built-in pair macros to treat as unpaired.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Load `explicit` if given, else `latte-check.toml` from the working
    /// directory if it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Config::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| CliError::io(&path, e))?;
        let config = Config::from_toml(&text, &path)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Config, CliError> {
        toml::from_str(text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn pair_macros(&self) -> PairMacros {
        PairMacros::default()
            .with(self.macros.pair.iter().cloned())
            .without(&self.macros.ignore)
    }

    /// The syntax from `cli_override`, then the file, then the default.
    pub fn syntax(&self, cli_override: Option<&str>) -> Result<Syntax, CliError> {
        match cli_override.or(self.syntax.as_deref()) {
            Some(name) => parse_syntax(name),
            None => Ok(Syntax::default()),
        }
    }
}

pub fn parse_syntax(name: &str) -> Result<Syntax, CliError> {
    Syntax::from_name(name).ok_or_else(|| CliError::UnknownSyntax(name.to_string()))
}
