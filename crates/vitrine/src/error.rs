//! Error type for the view layer.

use vitrine_render::RenderError;

use crate::config::{ConfigError, EngineKind};

/// Errors from building or using a [`ViewService`](crate::ViewService).
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration names an engine this build cannot run.
    #[error("view engine {0} is not implemented")]
    EngineNotImplemented(EngineKind),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ViewError {
    /// True when the template could not be found or its name was rejected.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::Render(err) if err.is_not_found())
    }

    /// The underlying render error, if any.
    pub fn as_render(&self) -> Option<&RenderError> {
        match self {
            ViewError::Render(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_passes_through() {
        let err = ViewError::from(RenderError::TemplateNotFound("home".into()));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("home"));
        assert!(err.as_render().is_some());
    }

    #[test]
    fn test_engine_not_implemented_message() {
        let err = ViewError::EngineNotImplemented(EngineKind::Tera);
        assert_eq!(err.to_string(), "view engine tera is not implemented");
        assert!(!err.is_not_found());
        assert!(err.as_render().is_none());
    }
}
