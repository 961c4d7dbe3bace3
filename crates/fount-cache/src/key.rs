//! Cache key composition.

use fount_http::{Method, Request};

/// A cache key uniquely identifying a fetched result.
///
/// Method and target are combined so that, for example, a GET and a DELETE
/// against the same URL never collide. Rendered as `"GET::<url>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    method: Method,
    url: String,
}

impl CacheKey {
    /// Create a cache key for an arbitrary method.
    ///
    /// Panics if the target is empty.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        assert!(!url.is_empty(), "cache key requires a non-empty target");
        Self { method, url }
    }

    /// Create a cache key for a GET request, the common case.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// The HTTP method component.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request target component.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the request that fetches this key.
    pub fn to_request(&self) -> Request {
        Request::new(self.method, self.url.clone()).accept("application/json")
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.method, self.url)
    }
}
