//! Template engines and search-path loading.
//!
//! ## Key Types
//!
//! - [`TemplateEngine`]: The engine contract (configure, render, render_with)
//! - [`MiniJinjaEngine`]: MiniJinja implementation with region capture
//! - [`EngineConfig`] / [`EngineOptions`]: Render-scoped configuration
//! - [`SearchPathLoader`]: Resolves names against a [`SearchPath`](crate::SearchPath)
//!
//! ## See Also
//!
//! - [`crate::region`]: The `region` / `renderregion` tags
//! - [`crate::search_path`]: Name confinement and lookup order

mod engine;
pub mod loader;

pub use engine::{
    EngineConfig, EngineOptions, MiniJinjaEngine, TemplateEngine, MAX_CACHED_ENVIRONMENTS,
    MINIJINJA_EXTENSIONS,
};
pub use loader::{locate, SearchPathLoader};
