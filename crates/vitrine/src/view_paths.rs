//! Theme name to template search path.
//!
//! Every theme lives in `<themes_root>/<theme>/views`. A theme only needs to
//! contain the templates it overrides; anything else is found further down the
//! chain:
//!
//! ```text
//! <root>/<theme>/views              requested theme
//! <root>/<configured default>/views site-wide default, if not "default"
//! <root>/default/views              complete base theme
//! ```
//!
//! Duplicates are dropped, so resolving the base theme yields a single entry.
//! [`ViewPathResolver::resolve`] does not touch the disk; a missing directory
//! is simply skipped by the loader.

use std::path::{Path, PathBuf};

use vitrine_render::SearchPath;

use crate::config::ViewConfig;
use crate::theme::ThemeName;

/// Name of the per-theme template directory.
pub const VIEWS_DIR: &str = "views";

#[derive(Debug, Clone)]
pub struct ViewPathResolver {
    themes_root: PathBuf,
    default_theme: ThemeName,
}

impl ViewPathResolver {
    pub fn new(themes_root: impl Into<PathBuf>, default_theme: ThemeName) -> Self {
        Self {
            themes_root: themes_root.into(),
            default_theme,
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(config.themes_root.clone(), config.default_theme.clone())
    }

    pub fn themes_root(&self) -> &Path {
        &self.themes_root
    }

    /// Template directory of a single theme.
    pub fn views_dir(&self, theme: &ThemeName) -> PathBuf {
        self.themes_root.join(theme.as_str()).join(VIEWS_DIR)
    }

    /// Whether `theme` has a views directory under the themes root.
    pub fn is_installed(&self, theme: &ThemeName) -> bool {
        self.views_dir(theme).is_dir()
    }

    /// Ordered search path for `theme`, always ending with the base theme.
    pub fn resolve(&self, theme: &ThemeName) -> SearchPath {
        let base = ThemeName::base();
        let search_path = SearchPath::new([
            self.views_dir(theme),
            self.views_dir(&self.default_theme),
            self.views_dir(&base),
        ]);
        tracing::trace!(theme = %theme, dirs = ?search_path.dirs(), "resolved search path");
        search_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str) -> ThemeName {
        ThemeName::parse(name).unwrap()
    }

    #[test]
    fn test_theme_then_base() {
        let resolver = ViewPathResolver::new("/srv/themes", ThemeName::base());
        let path = resolver.resolve(&theme("dark"));
        assert_eq!(
            path.dirs(),
            &[
                PathBuf::from("/srv/themes/dark/views"),
                PathBuf::from("/srv/themes/default/views"),
            ]
        );
    }

    #[test]
    fn test_base_theme_collapses_to_one_entry() {
        let resolver = ViewPathResolver::new("themes", ThemeName::base());
        let path = resolver.resolve(&ThemeName::base());
        assert_eq!(path.dirs(), &[PathBuf::from("themes/default/views")]);
    }

    #[test]
    fn test_configured_default_sits_between() {
        let resolver = ViewPathResolver::new("themes", theme("corporate"));
        let path = resolver.resolve(&theme("dark"));
        assert_eq!(
            path.dirs(),
            &[
                PathBuf::from("themes/dark/views"),
                PathBuf::from("themes/corporate/views"),
                PathBuf::from("themes/default/views"),
            ]
        );

        let path = resolver.resolve(&theme("corporate"));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_always_ends_with_base() {
        let resolver = ViewPathResolver::new("r", theme("x"));
        for name in ["default", "x", "y"] {
            let path = resolver.resolve(&theme(name));
            assert_eq!(path.last(), Some(Path::new("r/default/views")));
        }
    }

    #[test]
    fn test_is_installed() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("dark/views")).unwrap();
        std::fs::create_dir_all(root.path().join("half")).unwrap();
        let resolver = ViewPathResolver::new(root.path(), ThemeName::base());

        assert!(resolver.is_installed(&theme("dark")));
        assert!(!resolver.is_installed(&theme("half")));
        assert!(!resolver.is_installed(&theme("missing")));
    }

    #[test]
    fn test_from_config() {
        let config = ViewConfig {
            themes_root: PathBuf::from("site"),
            ..ViewConfig::default()
        };
        let resolver = ViewPathResolver::from_config(&config);
        assert_eq!(resolver.themes_root(), Path::new("site"));
        assert_eq!(
            resolver.views_dir(&theme("dark")),
            PathBuf::from("site/dark/views")
        );
    }
}
