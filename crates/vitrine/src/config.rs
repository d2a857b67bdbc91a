//! View configuration.
//!
//! [`ViewConfig`] is built once at startup, validated, and never changed
//! afterwards. It can come from the environment ([`ViewConfig::from_env`]) or
//! from YAML ([`ViewConfig::from_yaml`]); both apply the same defaults.
//!
//! | env var | field | default |
//! |---|---|---|
//! | `VIEW_ENGINE` | `engine` | `minijinja` |
//! | `VIEW_DEFAULT_THEME` | `default_theme` | `default` |
//! | `VIEW_THEME_HEADER` | `theme_header` | `x-theme` |
//! | `VIEW_THEME_QUERY` | `theme_query_key` | `theme` |
//! | `VIEW_THEMES_ROOT` | `themes_root` | `themes` |
//! | `VIEW_STRICT_UNDEFINED` | `strict_undefined` | `false` |
//! | `VIEW_CACHE_TEMPLATES` | `cache_templates` | `false` |
//! | `VIEW_AUTOESCAPE` | `autoescape` | `true` |
//!
//! Empty variables count as unset.
//!
//! ```rust
//! use vitrine::{MockEnv, ViewConfig};
//!
//! let env = MockEnv::new()
//!     .with_var("VIEW_DEFAULT_THEME", "dark")
//!     .with_var("VIEW_STRICT_UNDEFINED", "true");
//! let config = ViewConfig::from_env(&env).unwrap();
//!
//! assert_eq!(config.default_theme.as_str(), "dark");
//! assert!(config.strict_undefined);
//! assert_eq!(config.theme_header, "x-theme");
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vitrine_render::EngineOptions;

use crate::env::EnvReader;
use crate::theme::{InvalidThemeName, ThemeName};

pub const ENV_ENGINE: &str = "VIEW_ENGINE";
pub const ENV_DEFAULT_THEME: &str = "VIEW_DEFAULT_THEME";
pub const ENV_THEME_HEADER: &str = "VIEW_THEME_HEADER";
pub const ENV_THEME_QUERY: &str = "VIEW_THEME_QUERY";
pub const ENV_THEMES_ROOT: &str = "VIEW_THEMES_ROOT";
pub const ENV_STRICT_UNDEFINED: &str = "VIEW_STRICT_UNDEFINED";
pub const ENV_CACHE_TEMPLATES: &str = "VIEW_CACHE_TEMPLATES";
pub const ENV_AUTOESCAPE: &str = "VIEW_AUTOESCAPE";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown view engine {0:?} (expected one of: minijinja, handlebars, tera)")]
    UnknownEngine(String),

    #[error("{key}: {source}")]
    InvalidTheme {
        key: &'static str,
        #[source]
        source: InvalidThemeName,
    },

    #[error("{key}: expected a boolean (true/false/1/0/yes/no/on/off), got {value:?}")]
    InvalidBool { key: &'static str, value: String },

    #[error("{key}: must not be blank")]
    Blank { key: &'static str },

    #[error("invalid view configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Template engine families a configuration can name.
///
/// Only [`EngineKind::MiniJinja`] is implemented; naming another one is
/// accepted by the parser and rejected when the view service is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    #[serde(alias = "jinja")]
    MiniJinja,
    Handlebars,
    Tera,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::MiniJinja => "minijinja",
            EngineKind::Handlebars => "handlebars",
            EngineKind::Tera => "tera",
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, EngineKind::MiniJinja)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minijinja" | "jinja" => Ok(EngineKind::MiniJinja),
            "handlebars" => Ok(EngineKind::Handlebars),
            "tera" => Ok(EngineKind::Tera),
            _ => Err(ConfigError::UnknownEngine(s.to_string())),
        }
    }
}

/// Startup configuration for view rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub engine: EngineKind,
    pub default_theme: ThemeName,
    pub theme_header: String,
    pub theme_query_key: String,
    pub themes_root: PathBuf,
    pub strict_undefined: bool,
    pub cache_templates: bool,
    pub autoescape: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            default_theme: ThemeName::base(),
            theme_header: "x-theme".to_string(),
            theme_query_key: "theme".to_string(),
            themes_root: PathBuf::from("themes"),
            strict_undefined: false,
            cache_templates: false,
            autoescape: true,
        }
    }
}

impl ViewConfig {
    /// Reads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails on an unknown engine name, an invalid default theme or a value
    /// that isn't a boolean where one is expected.
    pub fn from_env(env: &dyn EnvReader) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |key: &str| env.var(key).filter(|v| !v.trim().is_empty());

        if let Some(engine) = get(ENV_ENGINE) {
            config.engine = engine.parse()?;
        }
        if let Some(theme) = get(ENV_DEFAULT_THEME) {
            config.default_theme =
                ThemeName::parse(theme.trim()).map_err(|source| ConfigError::InvalidTheme {
                    key: ENV_DEFAULT_THEME,
                    source,
                })?;
        }
        if let Some(header) = get(ENV_THEME_HEADER) {
            config.theme_header = header.trim().to_string();
        }
        if let Some(key) = get(ENV_THEME_QUERY) {
            config.theme_query_key = key.trim().to_string();
        }
        if let Some(root) = get(ENV_THEMES_ROOT) {
            config.themes_root = PathBuf::from(root);
        }
        if let Some(value) = get(ENV_STRICT_UNDEFINED) {
            config.strict_undefined = parse_bool(ENV_STRICT_UNDEFINED, &value)?;
        }
        if let Some(value) = get(ENV_CACHE_TEMPLATES) {
            config.cache_templates = parse_bool(ENV_CACHE_TEMPLATES, &value)?;
        }
        if let Some(value) = get(ENV_AUTOESCAPE) {
            config.autoescape = parse_bool(ENV_AUTOESCAPE, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from YAML; missing keys take their defaults.
    ///
    /// ```rust
    /// let config = vitrine::ViewConfig::from_yaml("default_theme: light\ncache_templates: true\n").unwrap();
    /// assert_eq!(config.default_theme.as_str(), "light");
    /// assert!(config.cache_templates);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme_header.trim().is_empty() {
            return Err(ConfigError::Blank {
                key: ENV_THEME_HEADER,
            });
        }
        if self.theme_query_key.trim().is_empty() {
            return Err(ConfigError::Blank {
                key: ENV_THEME_QUERY,
            });
        }
        if self.themes_root.as_os_str().is_empty() {
            return Err(ConfigError::Blank {
                key: ENV_THEMES_ROOT,
            });
        }
        Ok(())
    }

    /// Engine options implied by this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::default()
            .cache(self.cache_templates)
            .strict_undefined(self.strict_undefined)
            .autoescape(self.autoescape)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}
