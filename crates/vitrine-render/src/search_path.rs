//! Ordered template search directories.
//!
//! A [`SearchPath`] is the list of directories searched, in order, for the first
//! existing file matching a template name. It is deliberately dumb: it does not
//! check that its directories exist (missing ones are skipped at lookup time),
//! and it knows nothing about themes. Building the theme-aware list is the job of
//! the caller (see `vitrine::ViewPathResolver`).
//!
//! # Name Confinement
//!
//! Template names are always relative to the search directories. Before any
//! lookup, [`check_template_name`] rejects names that could resolve outside of
//! them: absolute paths, `..` segments, backslashes and NUL bytes. The check is
//! purely lexical, so a name is rejected even if a file happens to exist at the
//! escaped location.
//!
//! # Extension Probing
//!
//! Lookups try the exact name first and then the name with each engine extension
//! appended, in priority order, per directory:
//!
//! ```text
//! find("pages/home", &[".html", ".jinja"])
//!   themes/dark/views/pages/home
//!   themes/dark/views/pages/home.html
//!   themes/dark/views/pages/home.jinja
//!   themes/default/views/pages/home
//!   ...
//! ```

use std::path::{Component, Path, PathBuf};

use crate::error::RenderError;

/// Ordered, duplicate-free list of template directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Creates a search path, dropping repeated directories (first occurrence wins).
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut path = Self::default();
        for dir in dirs {
            path.push(dir);
        }
        path
    }

    /// Appends a directory unless it is already present.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    /// Directories in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// The last directory, i.e. the final fallback.
    pub fn last(&self) -> Option<&Path> {
        self.dirs.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Finds the first existing file for `name`.
    ///
    /// Returns `Ok(None)` when nothing matches and an error when the name is
    /// rejected by [`check_template_name`].
    pub fn find(&self, name: &str, extensions: &[&str]) -> Result<Option<PathBuf>, RenderError> {
        check_template_name(name)?;

        for dir in &self.dirs {
            for candidate in candidates(name, extensions) {
                let path = dir.join(&candidate);
                if path.is_file() {
                    tracing::trace!(
                        template = name,
                        path = %path.display(),
                        "resolved template"
                    );
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Exact name first, then the name with each extension not already present.
fn candidates(name: &str, extensions: &[&str]) -> Vec<String> {
    let mut out = vec![name.to_string()];
    for ext in extensions {
        if !name.ends_with(ext) {
            out.push(format!("{}{}", name, ext));
        }
    }
    out
}

/// Rejects template names that could escape the search directories.
///
/// Accepted names are non-empty, relative, and made only of normal path
/// segments (a `.` segment is tolerated). Backslashes and NUL bytes are never
/// accepted, whatever the platform.
pub fn check_template_name(name: &str) -> Result<(), RenderError> {
    let rejected = || RenderError::PathTraversal(name.to_string());

    if name.trim().is_empty() || name.contains('\\') || name.contains('\0') {
        return Err(rejected());
    }
    if name.starts_with('/') {
        return Err(rejected());
    }

    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(rejected())
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new_removes_duplicates_keeping_first() {
        let path = SearchPath::new(["a", "b", "a", "c", "b"]);
        let dirs: Vec<_> = path.dirs().iter().map(|d| d.to_str().unwrap()).collect();
        assert_eq!(dirs, vec!["a", "b", "c"]);
        assert_eq!(path.last(), Some(Path::new("c")));
    }

    #[test]
    fn test_collect_into_search_path() {
        let path: SearchPath = vec!["x", "x"].into_iter().collect();
        assert_eq!(path.len(), 1);
        assert!(!path.is_empty());
    }

    // =========================================================================
    // Name checks
    // =========================================================================

    #[test]
    fn test_accepts_relative_names() {
        assert!(check_template_name("pages/home.html").is_ok());
        assert!(check_template_name("layout").is_ok());
        assert!(check_template_name("./partials/nav.html").is_ok());
    }

    #[test]
    fn test_rejects_escaping_names() {
        for name in [
            "",
            "  ",
            "../secret.html",
            "pages/../../secret.html",
            "pages/..",
            "/etc/passwd",
            "..\\secret.html",
            "pages\\home.html",
            "bad\0name",
        ] {
            let err = check_template_name(name).unwrap_err();
            assert!(
                matches!(err, RenderError::PathTraversal(_)),
                "{:?} should be rejected",
                name
            );
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[test]
    fn test_find_first_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("page.html"), "first").unwrap();
        fs::write(second.path().join("page.html"), "second").unwrap();

        let path = SearchPath::new([first.path(), second.path()]);
        let found = path.find("page.html", &[]).unwrap().unwrap();
        assert_eq!(found, first.path().join("page.html"));
    }

    #[test]
    fn test_find_skips_missing_directories() {
        let real = tempfile::tempdir().unwrap();
        fs::write(real.path().join("page.html"), "ok").unwrap();

        let path = SearchPath::new([real.path().join("does-not-exist"), real.path().to_path_buf()]);
        let found = path.find("page.html", &[]).unwrap();
        assert_eq!(found, Some(real.path().join("page.html")));
    }

    #[test]
    fn test_find_tries_extensions_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.jinja"), "jinja").unwrap();
        fs::write(dir.path().join("page.html"), "html").unwrap();

        let path = SearchPath::new([dir.path()]);
        let found = path.find("page", &[".html", ".jinja"]).unwrap().unwrap();
        assert_eq!(found, dir.path().join("page.html"));
    }

    #[test]
    fn test_find_returns_none_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = SearchPath::new([dir.path()]);
        assert_eq!(path.find("nope.html", &[".html"]).unwrap(), None);
    }

    #[test]
    fn test_find_rejects_traversal_even_if_file_exists() {
        let root = tempfile::tempdir().unwrap();
        let views = root.path().join("views");
        fs::create_dir_all(&views).unwrap();
        fs::write(root.path().join("secret.html"), "secret").unwrap();

        let path = SearchPath::new([views]);
        let err = path.find("../secret.html", &[]).unwrap_err();
        assert!(matches!(err, RenderError::PathTraversal(_)));
    }
}
