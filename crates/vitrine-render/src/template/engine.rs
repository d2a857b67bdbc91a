//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait which allows vitrine-render
//! to work with different template backends. The implementation shipped here
//! is [`MiniJinjaEngine`].
//!
//! # Configuration Is Render-Scoped
//!
//! An engine is typically shared by every request of a process, while the
//! search path differs per request (it depends on the theme). Engines therefore
//! take their configuration as a value, [`EngineConfig`], in
//! [`render_with`](TemplateEngine::render_with). The stateful
//! [`configure`](TemplateEngine::configure) + [`render`](TemplateEngine::render)
//! pair is kept for single-tenant callers: `render` works on a snapshot of the
//! latest configuration, so it never observes half of one call and half of
//! another, but two threads configuring one engine still race on *which*
//! configuration the next render sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};

use super::loader::SearchPathLoader;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::search_path::{check_template_name, SearchPath};

/// Execution options for an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Reuse compiled templates across renders with the same configuration.
    ///
    /// Off by default so edits and theme switches show up on the next render.
    pub cache: bool,
    /// Fail on undefined variables instead of rendering them as empty.
    pub strict_undefined: bool,
    /// HTML-escape expression output.
    pub autoescape: bool,
    /// Remove the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip whitespace before a block tag at the start of a line.
    pub lstrip_blocks: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache: false,
            strict_undefined: false,
            autoescape: true,
            trim_blocks: true,
            lstrip_blocks: true,
        }
    }
}

impl EngineOptions {
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn strict_undefined(mut self, strict: bool) -> Self {
        self.strict_undefined = strict;
        self
    }

    pub fn autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }

    pub fn trim_blocks(mut self, trim: bool) -> Self {
        self.trim_blocks = trim;
        self
    }

    pub fn lstrip_blocks(mut self, lstrip: bool) -> Self {
        self.lstrip_blocks = lstrip;
        self
    }
}

/// Everything an engine needs to render: where to look and how to execute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineConfig {
    pub search_path: SearchPath,
    pub options: EngineOptions,
}

impl EngineConfig {
    pub fn new(search_path: SearchPath, options: EngineOptions) -> Self {
        Self {
            search_path,
            options,
        }
    }
}

/// A template engine that renders files found on a search path.
///
/// Implementations must keep per-render state (such as captured regions) out
/// of `self`; the same engine value is used by concurrent renders.
pub trait TemplateEngine: Send + Sync {
    /// Short engine identifier, e.g. `"minijinja"`.
    fn name(&self) -> &'static str;

    /// File extensions tried, in order, when a template name has none.
    fn extensions(&self) -> &'static [&'static str];

    /// Sets the configuration used by subsequent [`render`](Self::render) calls.
    ///
    /// May be called any number of times; the latest call wins.
    fn configure(&self, search_path: SearchPath, options: EngineOptions);

    /// The configuration installed by the latest [`configure`](Self::configure).
    fn current_config(&self) -> Option<Arc<EngineConfig>>;

    /// Renders `template` with an explicit configuration.
    ///
    /// Nothing set through [`configure`](Self::configure) is consulted.
    fn render_with(
        &self,
        config: &EngineConfig,
        template: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError>;

    /// Renders `template` with the latest configuration.
    ///
    /// # Errors
    ///
    /// [`RenderError::EngineNotConfigured`] if [`configure`](Self::configure)
    /// was never called.
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        let config = self
            .current_config()
            .ok_or(RenderError::EngineNotConfigured)?;
        self.render_with(&config, template, context)
    }
}

/// Extensions tried by [`MiniJinjaEngine`] for extensionless names.
pub const MINIJINJA_EXTENSIONS: &[&str] = &[".html", ".jinja", ".j2"];

/// Upper bound on cached environments; the cache is emptied when it is reached.
pub const MAX_CACHED_ENVIRONMENTS: usize = 64;

/// MiniJinja-based template engine with region capture.
///
/// Each render gets an [`Environment`] bound to the render's search path.
/// Without caching the environment is built for that render alone and thrown
/// away afterwards; with [`EngineOptions::cache`] environments are kept per
/// [`EngineConfig`], which is safe to share because the region map travels in
/// the render context, not in the environment. At most
/// [`MAX_CACHED_ENVIRONMENTS`] are kept.
///
/// # Example
///
/// ```rust,no_run
/// use vitrine_render::{EngineConfig, EngineOptions, MiniJinjaEngine, RenderContext, SearchPath};
/// use vitrine_render::TemplateEngine;
///
/// let engine = MiniJinjaEngine::new();
/// let config = EngineConfig::new(
///     SearchPath::new(["themes/dark/views", "themes/default/views"]),
///     EngineOptions::default(),
/// );
/// let html = engine
///     .render_with(&config, "pages/home.html", &RenderContext::new().with_var("title", "Home"))
///     .unwrap();
/// ```
#[derive(Default)]
pub struct MiniJinjaEngine {
    current: RwLock<Option<Arc<EngineConfig>>>,
    environments: Mutex<HashMap<EngineConfig, Arc<Environment<'static>>>>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an environment for `config`, or returns the cached one.
    fn environment(&self, config: &EngineConfig) -> Arc<Environment<'static>> {
        if !config.options.cache {
            return Arc::new(build_environment(config, MINIJINJA_EXTENSIONS));
        }

        let mut cache = self
            .environments
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if cache.len() >= MAX_CACHED_ENVIRONMENTS && !cache.contains_key(config) {
            tracing::debug!(
                evicted = cache.len(),
                "template environment cache full, starting over"
            );
            cache.clear();
        }
        cache
            .entry(config.clone())
            .or_insert_with(|| {
                tracing::debug!(search_path = ?config.search_path.dirs(), "caching template environment");
                Arc::new(build_environment(config, MINIJINJA_EXTENSIONS))
            })
            .clone()
    }

    /// Number of environments currently cached.
    pub fn cached_environments(&self) -> usize {
        self.environments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Drops all cached environments.
    pub fn clear_cache(&self) {
        self.environments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine")
            .field("current", &self.current_config())
            .finish_non_exhaustive()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn name(&self) -> &'static str {
        "minijinja"
    }

    fn extensions(&self) -> &'static [&'static str] {
        MINIJINJA_EXTENSIONS
    }

    fn configure(&self, search_path: SearchPath, options: EngineOptions) {
        let config = Arc::new(EngineConfig::new(search_path, options));
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(config);
    }

    fn current_config(&self) -> Option<Arc<EngineConfig>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn render_with(
        &self,
        config: &EngineConfig,
        template: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        check_template_name(template)?;

        let env = self.environment(config);
        let tmpl = env.get_template(template)?;
        let (value, _regions) = context.to_template_value();
        Ok(tmpl.render(value)?)
    }
}

/// Creates a MiniJinja environment wired to the config's search path.
fn build_environment(
    config: &EngineConfig,
    extensions: &'static [&'static str],
) -> Environment<'static> {
    let mut env = Environment::new();
    let loader = SearchPathLoader::new(config.search_path.clone(), extensions);
    env.set_loader(move |name| loader.load(name));

    let options = config.options;
    env.set_undefined_behavior(if options.strict_undefined {
        UndefinedBehavior::Strict
    } else {
        UndefinedBehavior::Lenient
    });
    env.set_trim_blocks(options.trim_blocks);
    env.set_lstrip_blocks(options.lstrip_blocks);
    if options.autoescape {
        env.set_auto_escape_callback(|_| AutoEscape::Html);
    } else {
        env.set_auto_escape_callback(|_| AutoEscape::None);
    }
    env
}
