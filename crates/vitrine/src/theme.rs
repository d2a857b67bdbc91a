//! Theme names and per-request theme resolution.
//!
//! A theme is a directory under the themes root holding template overrides.
//! Which theme a request gets is decided by [`ThemeResolver`]:
//!
//! | precedence | source | example |
//! |---|---|---|
//! | 1 (highest) | query parameter (`theme` by default) | `/home?theme=light` |
//! | 2 | request header (`x-theme` by default), as configured, then lowercased | `X-Theme: dark` |
//! | 3 | configured default theme | `default` |
//!
//! Resolution never fails. A missing, empty or malformed value at one level
//! falls through to the next; a malformed value is logged, since it usually
//! means a client is probing paths.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ViewConfig;
use crate::request::RequestInfo;

/// Theme every search path falls back to.
pub const BASE_THEME: &str = "default";

/// Error returned when a string cannot name a theme directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid theme name {name:?}: {reason}")]
pub struct InvalidThemeName {
    pub name: String,
    pub reason: &'static str,
}

/// Validated theme identifier.
///
/// A theme name is a single directory name: non-empty, no path separators, no
/// leading dot (which also excludes `.` and `..`), and only ASCII letters,
/// digits, `-`, `_` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeName(String);

impl ThemeName {
    /// Validates `name` as a theme directory name.
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidThemeName> {
        let name = name.into();
        let invalid = |reason| InvalidThemeName {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.starts_with('.') {
            return Err(invalid("name starts with a dot"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("only ASCII letters, digits, '-', '_' and '.' are allowed"));
        }
        Ok(Self(name))
    }

    /// The base fallback theme.
    pub fn base() -> Self {
        Self(BASE_THEME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_THEME
    }
}

impl Default for ThemeName {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThemeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ThemeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ThemeName {
    type Error = InvalidThemeName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ThemeName {
    type Error = InvalidThemeName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ThemeName> for String {
    fn from(name: ThemeName) -> Self {
        name.0
    }
}

impl std::str::FromStr for ThemeName {
    type Err = InvalidThemeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Picks the theme for a request.
#[derive(Debug, Clone)]
pub struct ThemeResolver {
    default_theme: ThemeName,
    header: String,
    query_key: String,
}

impl ThemeResolver {
    pub fn new(
        default_theme: ThemeName,
        header: impl Into<String>,
        query_key: impl Into<String>,
    ) -> Self {
        Self {
            default_theme,
            header: header.into(),
            query_key: query_key.into(),
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(
            config.default_theme.clone(),
            config.theme_header.clone(),
            config.theme_query_key.clone(),
        )
    }

    pub fn default_theme(&self) -> &ThemeName {
        &self.default_theme
    }

    /// Resolves the theme for `request`, or the default when there is none.
    pub fn resolve(&self, request: Option<&dyn RequestInfo>) -> ThemeName {
        let Some(request) = request else {
            return self.default_theme.clone();
        };

        if let Some(theme) = accept("query", request.query(&self.query_key)) {
            tracing::debug!(theme = %theme, source = "query", "resolved theme");
            return theme;
        }

        let header = request
            .header(&self.header)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| request.header(&self.header.to_ascii_lowercase()));
        if let Some(theme) = accept("header", header) {
            tracing::debug!(theme = %theme, source = "header", "resolved theme");
            return theme;
        }

        self.default_theme.clone()
    }
}

/// Turns a raw request value into a theme, dropping empty or invalid ones.
fn accept(source: &'static str, raw: Option<&str>) -> Option<ThemeName> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match ThemeName::parse(raw) {
        Ok(theme) => Some(theme),
        Err(err) => {
            tracing::warn!(source, error = %err, "ignoring theme override");
            None
        }
    }
}
