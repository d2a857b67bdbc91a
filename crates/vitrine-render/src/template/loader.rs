//! Search-path template loader for MiniJinja.
//!
//! Every template MiniJinja asks for (the entry template as well as anything
//! pulled in through `include`, `extends` or `import`) goes through
//! [`SearchPathLoader::load`]:
//!
//! 1. the name is checked for traversal ([`check_template_name`]);
//! 2. the search path is searched in order, first existing file wins;
//! 3. the source is read and the region tags are rewritten
//!    ([`expand_region_tags`]).
//!
//! A rejected name surfaces as "template not found" for nested loads, which is
//! how the caller is expected to treat traversal anyway.

use std::path::Path;

use minijinja::{Error, ErrorKind};

use crate::error::RenderError;
use crate::region::expand_region_tags;
use crate::search_path::{check_template_name, SearchPath};

/// Loads template sources from a [`SearchPath`].
#[derive(Debug, Clone)]
pub struct SearchPathLoader {
    search_path: SearchPath,
    extensions: &'static [&'static str],
}

impl SearchPathLoader {
    pub fn new(search_path: SearchPath, extensions: &'static [&'static str]) -> Self {
        Self {
            search_path,
            extensions,
        }
    }

    /// Loader callback: `Ok(None)` tells MiniJinja the template doesn't exist.
    pub fn load(&self, name: &str) -> Result<Option<String>, Error> {
        if let Err(err) = check_template_name(name) {
            tracing::warn!(template = name, "rejected template name outside the search path");
            return Err(Error::new(ErrorKind::TemplateNotFound, err.to_string()));
        }

        let path = match self.search_path.find(name, self.extensions) {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::debug!(
                    template = name,
                    searched = ?self.search_path.dirs(),
                    "template not found in search path"
                );
                return Ok(None);
            }
            Err(err) => return Err(Error::new(ErrorKind::TemplateNotFound, err.to_string())),
        };

        let source = read_source(&path)?;
        expand_region_tags(&source)
            .map(Some)
            .map_err(|err| Error::new(ErrorKind::SyntaxError, format!("in {}: {}", name, err)))
    }
}

fn read_source(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("failed to read template {}", path.display()),
        )
        .with_source(err)
    })
}

/// Resolves `name` to a path without loading it, as the loader would.
pub fn locate(
    search_path: &SearchPath,
    name: &str,
    extensions: &[&str],
) -> Result<std::path::PathBuf, RenderError> {
    search_path
        .find(name, extensions)?
        .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
}
