//! The request-like view of an inbound call.
//!
//! Rendering only needs to read a few request values (the theme override
//! header and query parameter), so HTTP frameworks plug in by implementing
//! [`RequestInfo`] on their own request type. [`Request`] is a plain owned
//! implementation for tests, background jobs and thin adapters.

use std::collections::HashMap;

/// Read access to the parts of a request that rendering cares about.
pub trait RequestInfo {
    /// Header value by exact name.
    ///
    /// Implementations over case-insensitive header maps may ignore case;
    /// callers try the lowercase name as well.
    fn header(&self, name: &str) -> Option<&str>;

    /// Query-string parameter value.
    fn query(&self, key: &str) -> Option<&str>;

    /// Cookie value. Not used for theming, exposed for callers that share the
    /// same request adapter with other concerns (e.g. auth).
    fn cookie(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// Owned request snapshot.
///
/// # Example
///
/// ```rust
/// use vitrine::{Request, RequestInfo};
///
/// let req = Request::new()
///     .with_header("X-Theme", "dark")
///     .with_query("page", "2");
///
/// assert_eq!(req.header("X-Theme"), Some("dark"));
/// assert_eq!(req.query("page"), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl RequestInfo for Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accessors() {
        let req = Request::new()
            .with_header("X-Theme", "dark")
            .with_query("theme", "light")
            .with_cookie("session", "abc");

        assert_eq!(req.header("X-Theme"), Some("dark"));
        assert_eq!(req.header("x-theme"), None);
        assert_eq!(req.query("theme"), Some("light"));
        assert_eq!(req.cookie("session"), Some("abc"));
    }

    #[test]
    fn default_cookie_impl_is_none() {
        struct HeadersOnly;
        impl RequestInfo for HeadersOnly {
            fn header(&self, _name: &str) -> Option<&str> {
                None
            }
            fn query(&self, _key: &str) -> Option<&str> {
                None
            }
        }
        assert_eq!(HeadersOnly.cookie("session"), None);
    }
}
