//! Render orchestration.
//!
//! [`ViewService`] ties the pieces together for one render:
//!
//! 1. [`ThemeResolver`] picks the theme from the request
//! 2. [`ViewPathResolver`] turns it into a search path
//! 3. the engine renders the template against that search path
//!
//! The search path travels with the render call as an [`EngineConfig`], so a
//! single service (and a single engine) can be shared by concurrent requests
//! for different themes.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use vitrine_render::{
    locate, EngineConfig, EngineOptions, MiniJinjaEngine, RenderContext, SearchPath,
    TemplateEngine,
};

use crate::config::ViewConfig;
use crate::env::EnvReader;
use crate::error::ViewError;
use crate::request::RequestInfo;
use crate::theme::{ThemeName, ThemeResolver};
use crate::view_paths::ViewPathResolver;

/// Context variable holding the resolved theme name.
pub const THEME_VAR: &str = "theme";

/// Renders views for requests.
///
/// # Example
///
/// ```rust
/// use std::fs;
/// use vitrine::{RenderContext, Request, ViewConfig, ViewService};
///
/// let root = tempfile::tempdir().unwrap();
/// fs::create_dir_all(root.path().join("default/views")).unwrap();
/// fs::create_dir_all(root.path().join("dark/views")).unwrap();
/// fs::write(root.path().join("default/views/home.html"), "<p>{{ theme }}: {{ title }}</p>").unwrap();
/// fs::write(root.path().join("dark/views/home.html"), "<p class=dark>{{ title }}</p>").unwrap();
///
/// let config = ViewConfig { themes_root: root.path().to_path_buf(), ..ViewConfig::default() };
/// let views = ViewService::new(config).unwrap();
///
/// let ctx = RenderContext::new().with_var("title", "Home");
/// assert_eq!(views.render(None, "home", ctx.clone()).unwrap(), "<p>default: Home</p>");
///
/// let req = Request::new().with_query("theme", "dark");
/// assert_eq!(views.render(Some(&req), "home", ctx).unwrap(), "<p class=dark>Home</p>");
/// ```
#[derive(Clone)]
pub struct ViewService {
    config: ViewConfig,
    themes: ThemeResolver,
    paths: ViewPathResolver,
    engine: Arc<dyn TemplateEngine>,
    options: EngineOptions,
}

impl ViewService {
    /// Builds a service for `config`.
    ///
    /// # Errors
    ///
    /// [`ViewError::EngineNotImplemented`] if the configured engine is not
    /// available in this build.
    pub fn new(config: ViewConfig) -> Result<Self, ViewError> {
        if !config.engine.is_implemented() {
            return Err(ViewError::EngineNotImplemented(config.engine));
        }
        Ok(Self::with_engine(config, Arc::new(MiniJinjaEngine::new())))
    }

    /// Builds a service from environment variables.
    pub fn from_env(env: &dyn EnvReader) -> Result<Self, ViewError> {
        Self::new(ViewConfig::from_env(env)?)
    }

    /// Builds a service around an existing engine; `config.engine` is ignored.
    pub fn with_engine(config: ViewConfig, engine: Arc<dyn TemplateEngine>) -> Self {
        tracing::debug!(
            engine = engine.name(),
            themes_root = %config.themes_root.display(),
            default_theme = %config.default_theme,
            "view service ready"
        );
        Self {
            themes: ThemeResolver::from_config(&config),
            paths: ViewPathResolver::from_config(&config),
            options: config.engine_options(),
            engine,
            config,
        }
    }

    /// Overrides the engine options derived from the configuration.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    pub fn theme_resolver(&self) -> &ThemeResolver {
        &self.themes
    }

    pub fn path_resolver(&self) -> &ViewPathResolver {
        &self.paths
    }

    /// Theme a request would be rendered with.
    ///
    /// A requested theme without a views directory under the themes root is
    /// replaced by the configured default.
    pub fn theme_for(&self, request: Option<&dyn RequestInfo>) -> ThemeName {
        self.installed_theme(self.themes.resolve(request))
    }

    /// `theme` if it is installed, otherwise the configured default.
    ///
    /// Keeps the set of search paths, and with it the engine's environment
    /// cache, limited to themes that exist on disk.
    pub fn installed_theme(&self, theme: ThemeName) -> ThemeName {
        let default = self.themes.default_theme();
        if theme == *default || theme.is_base() || self.paths.is_installed(&theme) {
            return theme;
        }
        tracing::debug!(theme = %theme, fallback = %default, "theme is not installed");
        default.clone()
    }

    /// Search path for `theme`.
    pub fn search_path(&self, theme: &ThemeName) -> SearchPath {
        self.paths.resolve(theme)
    }

    /// Renders `template` for `request`.
    ///
    /// Without a request the configured default theme is used. The resolved
    /// theme name is available to templates as `theme` unless `context`
    /// already defines it.
    pub fn render(
        &self,
        request: Option<&dyn RequestInfo>,
        template: &str,
        context: RenderContext,
    ) -> Result<String, ViewError> {
        let theme = self.theme_for(request);
        self.render_installed(&theme, template, context)
    }

    /// Renders `template` for `request` with serializable page data.
    pub fn render_data<T: Serialize + ?Sized>(
        &self,
        request: Option<&dyn RequestInfo>,
        template: &str,
        data: &T,
    ) -> Result<String, ViewError> {
        let context = RenderContext::from_serialize(data)?;
        self.render(request, template, context)
    }

    /// Renders `template` with an explicit theme.
    ///
    /// An uninstalled theme falls back like in [`theme_for`](Self::theme_for).
    pub fn render_theme(
        &self,
        theme: &ThemeName,
        template: &str,
        context: RenderContext,
    ) -> Result<String, ViewError> {
        let theme = self.installed_theme(theme.clone());
        self.render_installed(&theme, template, context)
    }

    fn render_installed(
        &self,
        theme: &ThemeName,
        template: &str,
        mut context: RenderContext,
    ) -> Result<String, ViewError> {
        context.insert_default(THEME_VAR, theme.as_str());
        let config = EngineConfig::new(self.paths.resolve(theme), self.options);

        tracing::debug!(theme = %theme, template, "rendering view");
        let html = self
            .engine
            .render_with(&config, template, &context)
            .map_err(|err| {
                if err.is_not_found() {
                    tracing::debug!(theme = %theme, template, error = %err, "view not found");
                } else {
                    tracing::warn!(theme = %theme, template, error = %err, "view failed to render");
                }
                err
            })?;
        Ok(html)
    }

    /// Points the shared engine at `theme` for later
    /// [`TemplateEngine::render`] calls.
    ///
    /// Meant for single-theme contexts such as background jobs; concurrent
    /// request handling should go through [`render`](Self::render).
    pub fn configure(&self, theme: &ThemeName) {
        let theme = self.installed_theme(theme.clone());
        self.engine.configure(self.paths.resolve(&theme), self.options);
    }

    /// File that would be rendered for `template` under `theme`.
    pub fn locate_template(&self, theme: &ThemeName, template: &str) -> Result<PathBuf, ViewError> {
        let search_path = self.paths.resolve(&self.installed_theme(theme.clone()));
        Ok(locate(&search_path, template, self.engine.extensions())?)
    }
}

impl std::fmt::Debug for ViewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewService")
            .field("config", &self.config)
            .field("engine", &self.engine.name())
            .field("options", &self.options)
            .finish()
    }
}
