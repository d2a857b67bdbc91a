//! Page data passed to a render call.
//!
//! A [`RenderContext`] holds the caller's template variables and, optionally,
//! regions the caller wants filled before the template runs. It is plain data:
//! the region map a template actually writes to is built from it inside each
//! render call (see [`RenderContext::to_template_value`]) and dropped when the
//! call returns, so reusing a context for several renders never carries
//! captured regions from one pass into the next.
//!
//! # Example
//!
//! ```rust
//! use vitrine_render::RenderContext;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Home { title: String }
//!
//! let ctx = RenderContext::from_serialize(&Home { title: "Home Page".into() })
//!     .unwrap()
//!     .with_var("current_year", 2026)
//!     .with_region("header-banner", "Welcome Banner");
//!
//! assert!(ctx.contains_var("title"));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::Value;
use serde::Serialize;

use crate::error::RenderError;
use crate::region::{RegionMap, REGIONS_VAR};

/// Caller-supplied variables and seeded regions for one render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    vars: serde_json::Map<String, serde_json::Value>,
    regions: Vec<(String, String)>,
}

impl RenderContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from any serializable value.
    ///
    /// The value must serialize to a map (struct or map); `()`/`null` gives an
    /// empty context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Serialization`] for anything that is not a map.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, RenderError> {
        match serde_json::to_value(data)? {
            serde_json::Value::Object(vars) => Ok(Self {
                vars,
                regions: Vec::new(),
            }),
            serde_json::Value::Null => Ok(Self::new()),
            other => Err(RenderError::Serialization(format!(
                "render context must be a map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Adds or replaces a template variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a template variable in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Adds a variable only if the caller hasn't set it already.
    pub fn insert_default(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.vars.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Pre-fills a region before the template runs.
    ///
    /// Seeded regions take part in first-write-wins like any other capture:
    /// a `region` block for the same name in the template is skipped.
    pub fn with_region(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.regions.push((name.into(), content.into()));
        self
    }

    pub fn contains_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn get_var(&self, key: &str) -> Option<&serde_json::Value> {
        self.vars.get(key)
    }

    pub fn vars(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.vars
    }

    /// Builds the value a template is rendered with.
    ///
    /// Every call creates a new [`RegionMap`], seeded from this context, and
    /// binds it under the reserved region variable. A caller variable with the
    /// same name is shadowed.
    pub fn to_template_value(&self) -> (Value, Arc<RegionMap>) {
        let regions = Arc::new(RegionMap::seeded(self.regions.iter().cloned()));

        let mut map: BTreeMap<String, Value> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_serialize(v)))
            .collect();
        map.insert(
            REGIONS_VAR.to_string(),
            Value::from_dyn_object(regions.clone()),
        );

        (Value::from(map), regions)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Page {
        title: String,
        count: usize,
    }

    #[test]
    fn from_struct() {
        let ctx = RenderContext::from_serialize(&Page {
            title: "Home".into(),
            count: 3,
        })
        .unwrap();

        assert_eq!(ctx.get_var("title"), Some(&json!("Home")));
        assert_eq!(ctx.get_var("count"), Some(&json!(3)));
    }

    #[test]
    fn from_unit_is_empty() {
        let ctx = RenderContext::from_serialize(&()).unwrap();
        assert!(ctx.vars().is_empty());
    }

    #[test]
    fn from_non_map_fails() {
        let err = RenderContext::from_serialize(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, RenderError::Serialization(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn insert_default_keeps_caller_value() {
        let mut ctx = RenderContext::new().with_var("theme", "custom");
        ctx.insert_default("theme", "dark");
        ctx.insert_default("year", 2026);

        assert_eq!(ctx.get_var("theme"), Some(&json!("custom")));
        assert_eq!(ctx.get_var("year"), Some(&json!(2026)));
    }

    #[test]
    fn template_value_gets_fresh_region_map_each_time() {
        let ctx = RenderContext::new().with_region("banner", "hi");

        let (_, first) = ctx.to_template_value();
        first.capture("extra", "captured during pass one");

        let (_, second) = ctx.to_template_value();
        assert!(second.contains("banner"));
        assert!(!second.contains("extra"));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn caller_cannot_replace_region_map() {
        let ctx = RenderContext::new().with_var(REGIONS_VAR, json!({"x": "forged"}));
        let (value, regions) = ctx.to_template_value();

        let env = minijinja::Environment::new();
        let out = env
            .render_str("{{ __regions.render('x', 'fb') }}", value)
            .unwrap();
        assert_eq!(out, "fb");
        assert!(regions.is_empty());
    }
}
