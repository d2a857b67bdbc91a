//! # vitrine-preview
//!
//! Renders one view from a themes tree and prints the HTML to stdout. Handy
//! for checking a theme override or a region layout without running the site.
//!
//! ```bash
//! # Base theme
//! vitrine-preview pages/home --themes-root ./themes
//!
//! # As a request with a theme override header and some page data
//! vitrine-preview pages/home --header x-theme=dark --var title=Welcome --data page.json
//! ```
//!
//! Settings not given on the command line come from the `VIEW_*` environment
//! variables. Set `RUST_LOG=vitrine=debug` to see theme and path resolution.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vitrine::{RealEnv, RenderContext, Request, ThemeName, ViewConfig, ViewService};

/// Render a themed view to stdout
#[derive(Parser, Debug)]
#[command(name = "vitrine-preview")]
#[command(version)]
#[command(about = "Render a themed view to stdout")]
struct Cli {
    /// Template to render, relative to the theme's views directory
    template: String,

    /// Themes root directory [env: VIEW_THEMES_ROOT]
    #[arg(long, value_name = "DIR")]
    themes_root: Option<PathBuf>,

    /// Render with this theme, skipping request resolution
    #[arg(long, conflicts_with_all = ["header", "query"])]
    theme: Option<String>,

    /// Request header, as NAME=VALUE (repeatable)
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_pair)]
    header: Vec<(String, String)>,

    /// Query parameter, as KEY=VALUE (repeatable)
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_pair)]
    query: Vec<(String, String)>,

    /// Template variable, as KEY=VALUE; VALUE is parsed as JSON when it can be
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_pair)]
    vars: Vec<(String, String)>,

    /// Seed a region, as NAME=HTML
    #[arg(long = "region", value_name = "NAME=HTML", value_parser = parse_pair)]
    regions: Vec<(String, String)>,

    /// JSON file with page data; --var entries are applied on top
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Fail on undefined variables
    #[arg(long)]
    strict: bool,

    /// Disable HTML autoescaping
    #[arg(long)]
    no_autoescape: bool,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vitrine=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ViewConfig::from_env(&RealEnv).context("invalid VIEW_* environment")?;
    if let Some(root) = cli.themes_root.clone() {
        config.themes_root = root;
    }
    if cli.strict {
        config.strict_undefined = true;
    }
    if cli.no_autoescape {
        config.autoescape = false;
    }
    if !config.themes_root.is_dir() {
        bail!(
            "themes root {} is not a directory",
            config.themes_root.display()
        );
    }

    let views = ViewService::new(config)?;
    let context = build_context(&cli)?;

    let html = match &cli.theme {
        Some(name) => {
            let theme = ThemeName::parse(name.as_str())?;
            views.render_theme(&theme, &cli.template, context)
        }
        None => {
            let request = cli
                .header
                .iter()
                .fold(Request::new(), |req, (k, v)| req.with_header(k, v));
            let request = cli
                .query
                .iter()
                .fold(request, |req, (k, v)| req.with_query(k, v));
            tracing::debug!(theme = %views.theme_for(Some(&request)), "previewing");
            views.render(Some(&request), &cli.template, context)
        }
    }
    .with_context(|| format!("failed to render {}", cli.template))?;

    print!("{html}");
    Ok(())
}

fn build_context(cli: &Cli) -> anyhow::Result<RenderContext> {
    let mut context = match &cli.data {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let data: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            RenderContext::from_serialize(&data)?
        }
        None => RenderContext::new(),
    };

    for (key, value) in &cli.vars {
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
        context.insert(key.as_str(), value);
    }
    for (name, html) in &cli.regions {
        context = context.with_region(name.as_str(), html.as_str());
    }
    Ok(context)
}
