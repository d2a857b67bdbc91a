//! # Vitrine - Themed Views
//!
//! Vitrine renders HTML views from a tree of themes. Each request can pick a
//! theme (query parameter or header); the theme's templates override the base
//! theme's, file by file, and everything it doesn't override falls back to
//! the complete `default` theme.
//!
//! ```text
//! themes/
//! ├── default/views/    complete set of templates
//! │   ├── layout.html
//! │   └── pages/home.html
//! └── dark/views/       only what differs
//!     └── layout.html
//! ```
//!
//! Templates are rendered by [`vitrine_render`], which adds the `region` /
//! `renderregion` tags for declaring content in one place and emitting it in
//! another within the same render.
//!
//! ## Core Concepts
//!
//! - [`ViewConfig`]: Startup configuration, from env ([`ViewConfig::from_env`]) or YAML
//! - [`ThemeResolver`]: Query, then header, then configured default
//! - [`ViewPathResolver`]: Theme to search path, always ending with `default`
//! - [`ViewService`]: Resolve theme, resolve paths, render
//! - [`RequestInfo`]: What a request must expose; [`Request`] is an owned implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use std::fs;
//! use vitrine::{RenderContext, Request, ViewConfig, ViewService};
//!
//! let root = tempfile::tempdir().unwrap();
//! fs::create_dir_all(root.path().join("default/views")).unwrap();
//! fs::write(
//!     root.path().join("default/views/layout.html"),
//!     "<title>{% renderregion \"title\", \"Site\" %}</title>{% block body %}{% endblock %}",
//! ).unwrap();
//! fs::write(
//!     root.path().join("default/views/home.html"),
//!     "{% extends \"layout.html\" %}{% region \"title\" %}Home{% endregion %}{% block body %}hi{% endblock %}",
//! ).unwrap();
//!
//! let views = ViewService::new(ViewConfig {
//!     themes_root: root.path().to_path_buf(),
//!     ..ViewConfig::default()
//! }).unwrap();
//!
//! let html = views.render(Some(&Request::new()), "home", RenderContext::new()).unwrap();
//! assert_eq!(html, "<title>Home</title>hi");
//! ```

pub mod config;
mod env;
mod error;
mod request;
pub mod theme;
mod view;
pub mod view_paths;

pub use config::{ConfigError, EngineKind, ViewConfig};
pub use env::{EnvReader, MockEnv, RealEnv};
pub use error::ViewError;
pub use request::{Request, RequestInfo};
pub use theme::{InvalidThemeName, ThemeName, ThemeResolver, BASE_THEME};
pub use view::{ViewService, THEME_VAR};
pub use view_paths::ViewPathResolver;

// Re-export the rendering layer
pub use vitrine_render::{
    EngineConfig, EngineOptions, MiniJinjaEngine, RenderContext, RenderError, SearchPath,
    TemplateEngine,
};
