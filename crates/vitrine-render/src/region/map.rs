//! Render-scoped storage for captured regions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use minijinja::value::{from_args, Object, ObjectRepr};
use minijinja::{Error, ErrorKind, State, Value};

/// Name under which the region map is exposed to rewritten templates.
pub const REGIONS_VAR: &str = "__regions";

/// Captured regions of a single render pass.
///
/// One map is created per render call and handed to the template as an object
/// value; it is never stored on an engine. Writes are first-write-wins: once a
/// name holds content it is never replaced during the pass.
///
/// A `region` block reserves its name when execution enters it, so a block
/// for the same name nested inside its body is skipped and the outer block
/// keeps the name.
///
/// Templates don't call the methods directly, the `region` tags are rewritten
/// into calls (see [`super::expand_region_tags`]):
///
/// | method | effect |
/// |---|---|
/// | `reserve(name)` | claims `name` for the block being entered; false if taken |
/// | `contains(name)` | whether `name` was already captured |
/// | `capture(name, body)` | stores `body` unless `name` is captured, emits nothing |
/// | `render(name, fallback?)` | captured content, else `fallback`, else `""` |
#[derive(Debug, Default)]
pub struct RegionMap {
    regions: Mutex<HashMap<String, Slot>>,
}

#[derive(Debug)]
enum Slot {
    /// Claimed by a block whose body is still running.
    Reserved,
    Captured(String),
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map pre-filled with caller supplied regions.
    pub fn seeded<I, K, V>(regions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = Self::new();
        for (name, content) in regions {
            map.capture(name, content);
        }
        map
    }

    /// Claims `name` for a block about to run.
    ///
    /// Returns `false` when the name is already captured or claimed by an
    /// enclosing block.
    pub fn reserve(&self, name: impl Into<String>) -> bool {
        match self.lock().entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Slot::Reserved);
                true
            }
        }
    }

    /// Stores `content` under `name` unless content is stored already.
    ///
    /// A reservation is filled. Returns `true` when the content was stored.
    pub fn capture(&self, name: impl Into<String>, content: impl Into<String>) -> bool {
        match self.lock().entry(name.into()) {
            Entry::Occupied(mut slot) => {
                if matches!(slot.get(), Slot::Captured(_)) {
                    return false;
                }
                slot.insert(Slot::Captured(content.into()));
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(Slot::Captured(content.into()));
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        match self.lock().get(name) {
            Some(Slot::Captured(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        matches!(self.lock().get(name), Some(Slot::Captured(_)))
    }

    /// Number of captured regions.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Captured(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // A poisoned map only means another call panicked mid-render.
        self.regions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Object for RegionMap {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "reserve" => {
                let (name,): (String,) = from_args(args)?;
                Ok(Value::from(self.reserve(name)))
            }
            "contains" => {
                let (name,): (String,) = from_args(args)?;
                Ok(Value::from(self.contains(&name)))
            }
            "capture" => {
                let (name, body): (String, Value) = from_args(args)?;
                if self.capture(name.as_str(), body.to_string()) {
                    tracing::trace!(region = %name, "captured region");
                }
                Ok(Value::from(""))
            }
            "render" => {
                let (name, fallback): (String, Option<Value>) = from_args(args)?;
                match self.get(&name) {
                    // Captured content was produced by the template, already escaped.
                    Some(content) => Ok(Value::from_safe_string(content)),
                    None => Ok(fallback
                        .filter(|v| !v.is_undefined() && !v.is_none())
                        .unwrap_or_else(|| Value::from(""))),
                }
            }
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("region map has no method named {}", method),
            )),
        }
    }
}
