//! # Vitrine Render - Themed HTML Template Rendering
//!
//! `vitrine-render` renders HTML from template files looked up along an ordered
//! search path, and adds a region-capture mechanism that lets one part of a
//! page declare content that another part replays in the same render pass.
//!
//! This crate is the rendering foundation for `vitrine`, which adds per-request
//! theme selection on top; it can be used on its own wherever templates live in
//! a stack of override directories.
//!
//! ## Core Concepts
//!
//! - [`SearchPath`]: Ordered template directories, first match wins
//! - [`TemplateEngine`]: Engine contract; [`MiniJinjaEngine`] implements it
//! - [`EngineConfig`]: Search path + [`EngineOptions`], passed per render
//! - [`RenderContext`]: Page data (and optional seeded regions) for one render
//! - [`region`]: The `region` / `renderregion` tags
//!
//! ## Quick Start
//!
//! ```rust
//! use vitrine_render::{EngineConfig, EngineOptions, MiniJinjaEngine, RenderContext, SearchPath, TemplateEngine};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("page.html"),
//!     "{% region \"title\" %}{{ name }}{% endregion %}<h1>{% renderregion \"title\" %}</h1>",
//! ).unwrap();
//!
//! let engine = MiniJinjaEngine::new();
//! let config = EngineConfig::new(SearchPath::new([dir.path()]), EngineOptions::default());
//! let html = engine
//!     .render_with(&config, "page.html", &RenderContext::new().with_var("name", "Docs"))
//!     .unwrap();
//!
//! assert_eq!(html, "<h1>Docs</h1>");
//! ```

mod context;
mod error;
pub mod region;
pub mod search_path;
pub mod template;

// Error type
pub use error::RenderError;

pub use context::RenderContext;
pub use region::{expand_region_tags, RegionMap, RegionSyntaxError};
pub use search_path::{check_template_name, SearchPath};
pub use template::{
    locate, EngineConfig, EngineOptions, MiniJinjaEngine, SearchPathLoader, TemplateEngine,
    MAX_CACHED_ENVIRONMENTS, MINIJINJA_EXTENSIONS,
};
