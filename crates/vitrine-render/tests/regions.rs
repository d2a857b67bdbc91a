//! Region capture through the engine: replay, fallback, first-write-wins and
//! the execution order across includes and inheritance.

use std::fs;
use std::path::Path;

use vitrine_render::{
    EngineConfig, EngineOptions, MiniJinjaEngine, RenderContext, RenderError, SearchPath,
    TemplateEngine,
};

struct Fixture {
    dir: tempfile::TempDir,
    engine: MiniJinjaEngine,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            engine: MiniJinjaEngine::new(),
        }
    }

    fn file(self, name: &str, content: &str) -> Self {
        let path = self.dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn render(&self, name: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        self.render_opts(name, ctx, EngineOptions::default())
    }

    fn render_opts(
        &self,
        name: &str,
        ctx: &RenderContext,
        options: EngineOptions,
    ) -> Result<String, RenderError> {
        let config = EngineConfig::new(SearchPath::new([self.root()]), options);
        self.engine.render_with(&config, name, ctx)
    }
}

// =============================================================================
// Capture and replay
// =============================================================================

#[test]
fn captured_region_is_replayed() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "x" %}A{% endregion %}<p>{% renderregion "x" %}</p>"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "<p>A</p>");
}

#[test]
fn region_declaration_prints_nothing() {
    let fx = Fixture::new().file("page.html", r#"[{% region "x" %}hidden{% endregion %}]"#);
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "[]");
}

#[test]
fn region_body_sees_template_variables() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "greeting" %}Hello {{ user.name }}{% endregion %}{% renderregion "greeting" %}"#,
    );
    let ctx = RenderContext::new().with_var("user", serde_json::json!({"name": "Ada"}));
    assert_eq!(fx.render("page.html", &ctx).unwrap(), "Hello Ada");
}

#[test]
fn missing_region_uses_fallback_or_nothing() {
    let fx = Fixture::new().file(
        "page.html",
        r#"[{% renderregion "y", "B" %}][{% renderregion "z" %}]"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "[B][]");
}

#[test]
fn fallback_may_follow_the_name_without_a_comma() {
    let fx = Fixture::new().file(
        "page.html",
        r#"[{% renderregion "y" "B" %}][{% renderregion "y" title %}]"#,
    );
    let ctx = RenderContext::new().with_var("title", "T");
    assert_eq!(fx.render("page.html", &ctx).unwrap(), "[B][T]");
}

#[test]
fn fallback_can_be_an_expression() {
    let fx = Fixture::new().file("page.html", r#"{% renderregion "y", default_title %}"#);
    let ctx = RenderContext::new().with_var("default_title", "Untitled");
    assert_eq!(fx.render("page.html", &ctx).unwrap(), "Untitled");
}

#[test]
fn first_region_block_wins() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "x" %}first{% endregion %}{% region "x" %}second{% endregion %}{% renderregion "x" %}"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "first");
}

#[test]
fn later_region_block_body_is_not_evaluated() {
    // Under strict mode the undefined variable would fail the render if the
    // second body ran.
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "x" %}A{% endregion %}{% region "x" %}{{ not_defined }}{% endregion %}{% renderregion "x" %}"#,
    );
    let out = fx
        .render_opts(
            "page.html",
            &RenderContext::new(),
            EngineOptions::default().strict_undefined(true),
        )
        .unwrap();
    assert_eq!(out, "A");
}

#[test]
fn region_in_loop_keeps_first_iteration() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% for i in [1, 2, 3] %}{% region "first" %}{{ i }}{% endregion %}{% endfor %}{% renderregion "first" %}"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "1");
}

#[test]
fn nested_regions_capture_inner_while_evaluating_outer() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "outer" %}[{% region "inner" %}I{% endregion %}]{% endregion %}{% renderregion "inner" %}{% renderregion "outer" %}"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "I[]");
}

#[test]
fn outer_block_wins_over_nested_block_with_same_name() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "x" %}outer{% region "x" %}inner{% endregion %}{% endregion %}[{% renderregion "x" %}]"#,
    );
    assert_eq!(fx.render("page.html", &RenderContext::new()).unwrap(), "[outer]");
}

#[test]
fn syntax_error_lines_survive_multiline_region_tags() {
    let fx = Fixture::new().file(
        "page.html",
        "{% renderregion\n  \"a\",\n  \"b\"\n%}\n{% if %}",
    );
    let err = fx.render("page.html", &RenderContext::new()).unwrap_err();
    match err {
        RenderError::TemplateSyntax { line, .. } => assert_eq!(line, Some(5)),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn seeded_region_beats_template_block() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "banner" %}from template{% endregion %}{% renderregion "banner" %}"#,
    );
    let ctx = RenderContext::new().with_region("banner", "from caller");
    assert_eq!(fx.render("page.html", &ctx).unwrap(), "from caller");
}

#[test]
fn captured_content_is_not_escaped_twice() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% region "x" %}<em>{{ html }}</em>{% endregion %}{% renderregion "x" %}|{% renderregion "y", raw %}"#,
    );
    let ctx = RenderContext::new()
        .with_var("html", "<b>")
        .with_var("raw", "<i>");
    assert_eq!(
        fx.render("page.html", &ctx).unwrap(),
        "<em>&lt;b&gt;</em>|&lt;i&gt;"
    );
}

#[test]
fn regions_do_not_leak_between_renders() {
    let fx = Fixture::new().file(
        "page.html",
        r#"{% renderregion "x", "empty" %}{% region "x" %}{{ n }}{% endregion %}"#,
    );
    let first = RenderContext::new().with_var("n", 1);
    let second = RenderContext::new().with_var("n", 2);
    assert_eq!(fx.render("page.html", &first).unwrap(), "empty");
    assert_eq!(fx.render("page.html", &second).unwrap(), "empty");
}

#[test]
fn block_whitespace_rules_apply_to_region_tags() {
    let fx = Fixture::new().file(
        "page.html",
        "<ul>\n  {% region \"x\" %}\n  <li>a</li>\n  {% endregion %}\n</ul>\n{% renderregion \"x\" %}\n",
    );
    assert_eq!(
        fx.render("page.html", &RenderContext::new()).unwrap(),
        "<ul>\n</ul>\n  <li>a</li>\n"
    );
}

// =============================================================================
// Execution order across includes and inheritance
// =============================================================================

#[test]
fn include_runs_at_the_include_site() {
    let fx = Fixture::new()
        .file("partials/nav.html", r#"{% region "nav" %}NAV{% endregion %}nav-body"#)
        .file(
            "page.html",
            r#"{% renderregion "nav", "none" %}|{% include "partials/nav.html" %}|{% renderregion "nav", "none" %}"#,
        );
    assert_eq!(
        fx.render("page.html", &RenderContext::new()).unwrap(),
        "none|nav-body|NAV"
    );
}

#[test]
fn inheritance_order_child_top_level_then_layout_then_blocks_in_place() {
    let fx = Fixture::new()
        .file(
            "layout.html",
            concat!(
                r#"<head>[{% renderregion "top", "no-top" %}][{% renderregion "inner", "no-inner" %}]</head>"#,
                r#"<main>{% block content %}{% endblock %}</main>"#,
                r#"<footer>[{% renderregion "inner", "no-inner" %}]</footer>"#,
            ),
        )
        .file(
            "child.html",
            concat!(
                r#"{% extends "layout.html" %}"#,
                r#"{% region "top" %}TOP{% endregion %}"#,
                r#"{% block content %}{% region "inner" %}INNER{% endregion %}body{% endblock %}"#,
            ),
        );

    let out = fx.render("child.html", &RenderContext::new()).unwrap();
    assert!(out.contains("<head>[TOP][no-inner]</head>"), "{}", out);
    assert!(out.contains("<main>body</main>"), "{}", out);
    assert!(out.contains("<footer>[INNER]</footer>"), "{}", out);
}

#[test]
fn region_tags_work_inside_included_layout_partials() {
    let fx = Fixture::new()
        .file(
            "layout.html",
            r#"{% block content %}{% endblock %}{% include "partials/footer.html" %}"#,
        )
        .file(
            "partials/footer.html",
            r#"<footer>{% renderregion "footer-note", "(c)" %}</footer>"#,
        )
        .file(
            "page.html",
            r#"{% extends "layout.html" %}{% block content %}{% region "footer-note" %}note{% endregion %}main{% endblock %}"#,
        );

    assert_eq!(
        fx.render("page.html", &RenderContext::new()).unwrap(),
        "main<footer>note</footer>"
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn unbalanced_region_tags_are_syntax_errors() {
    let fx = Fixture::new().file("page.html", "ok\n{% region \"x\" %}never closed");
    let err = fx.render("page.html", &RenderContext::new()).unwrap_err();
    assert!(matches!(err, RenderError::TemplateSyntax { .. }), "{:?}", err);
    assert!(err.to_string().contains("line 2"), "{}", err);
}

#[test]
fn included_template_cannot_escape_search_path() {
    let fx = Fixture::new()
        .file("views/page.html", r#"{% include "../secret.html" %}"#)
        .file("secret.html", "secret");

    let config = EngineConfig::new(
        SearchPath::new([fx.root().join("views")]),
        EngineOptions::default(),
    );
    let err = fx
        .engine
        .render_with(&config, "page.html", &RenderContext::new())
        .unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}
