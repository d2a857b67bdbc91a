//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the primary error type for all rendering
//! operations. It abstracts over the underlying template engine's errors, providing
//! a stable public API.

use std::fmt;

/// Error type for template rendering operations.
///
/// This error type provides a stable API that doesn't expose implementation details
/// of the underlying template engine. All public rendering functions return this type.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No file matching the requested name exists in any search directory.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A template name tried to escape the configured search directories.
    ///
    /// Callers should treat this like [`RenderError::TemplateNotFound`]; see
    /// [`RenderError::is_not_found`].
    #[error("template path rejected, it escapes the search path: {0:?}")]
    PathTraversal(String),

    /// Malformed template source, reported at parse time.
    #[error("syntax error in {}: {message}", Location::new(name, *line))]
    TemplateSyntax {
        /// Template in which the error was found.
        name: Option<String>,
        /// 1-based line, when known.
        line: Option<usize>,
        /// Parser message.
        message: String,
    },

    /// An undefined variable was used while strict mode is enabled.
    #[error("undefined value in {}: {message}", Location::new(name, *line))]
    UndefinedVariable {
        /// Template in which the error was found.
        name: Option<String>,
        /// 1-based line, when known.
        line: Option<usize>,
        /// Engine message.
        message: String,
    },

    /// `render` was called on an engine that was never configured.
    #[error("template engine is not configured, call configure() before render()")]
    EngineNotConfigured,

    /// Render context could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A template file was found but could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure raised while executing a template.
    #[error("template error: {0}")]
    Template(String),
}

impl RenderError {
    /// Returns `true` when the caller should answer as if the template did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RenderError::TemplateNotFound(_) | RenderError::PathTraversal(_)
        )
    }
}

/// Formats `name:line` for error messages.
struct Location<'a> {
    name: &'a Option<String>,
    line: Option<usize>,
}

impl<'a> Location<'a> {
    fn new(name: &'a Option<String>, line: Option<usize>) -> Self {
        Self { name, line }
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("<template>");
        match self.line {
            Some(line) => write!(f, "{}:{}", name, line),
            None => write!(f, "{}", name),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

// Conversion from minijinja::Error - keeps engine types out of the public API
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        let name = err.name().map(str::to_string);
        let line = err.line();
        let message = err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| err.kind().to_string());

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(message),
            ErrorKind::SyntaxError | ErrorKind::BadEscape => RenderError::TemplateSyntax {
                name,
                line,
                message,
            },
            ErrorKind::UndefinedError => RenderError::UndefinedVariable {
                name,
                line,
                message,
            },
            ErrorKind::BadSerialization => RenderError::Serialization(err.to_string()),
            // Template files that could not be read carry the io error as source.
            ErrorKind::InvalidOperation => {
                match std::error::Error::source(&err)
                    .and_then(|source| source.downcast_ref::<std::io::Error>())
                {
                    Some(io) => RenderError::Io(std::io::Error::new(io.kind(), err.to_string())),
                    None => RenderError::Template(err.to_string()),
                }
            }
            _ => RenderError::Template(err.to_string()),
        }
    }
}
