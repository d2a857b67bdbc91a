//! Region capture: named fragments captured once and replayed later in the
//! same render pass.
//!
//! Two tags are available in every template loaded through the engine:
//!
//! ```jinja
//! {% region "sidebar" %}
//!   <nav>{{ links }}</nav>
//! {% endregion %}
//!
//! {% renderregion "sidebar" %}
//! {% renderregion "banner", "Welcome!" %}
//! ```
//!
//! - `region NAME ... endregion` evaluates its body the first time it runs in a
//!   pass and stores the result under `NAME`. It prints nothing where it is
//!   declared. If `NAME` already holds content the block is skipped entirely,
//!   so the first block to execute wins.
//! - `renderregion NAME[, FALLBACK]` prints the stored content, else `FALLBACK`,
//!   else nothing.
//!
//! ## Execution Order
//!
//! Capture and replay follow the order in which MiniJinja executes the
//! templates of a pass, which is not always source order:
//!
//! 1. An `include` runs at the point of inclusion.
//! 2. A child template that `extends` a layout runs its top-level statements
//!    first (their output is discarded), then the layout runs.
//! 3. A `block` overridden by the child runs where the layout places that block.
//!
//! So a layout that calls `renderregion` in its `<head>`, *before* its content
//! block, sees regions captured at the child's top level but not those captured
//! inside the child's blocks; a `renderregion` placed after the content block
//! sees both. A replay that runs before its capture gets the fallback.
//!
//! ## Implementation
//!
//! The tags are rewritten into ordinary template syntax when a template is
//! loaded ([`expand_region_tags`]) and operate on a [`RegionMap`] object that
//! [`RenderContext`](crate::RenderContext) creates afresh for every render.

mod expand;
mod map;

pub use expand::{expand_region_tags, RegionSyntaxError};
pub use map::{RegionMap, REGIONS_VAR};
