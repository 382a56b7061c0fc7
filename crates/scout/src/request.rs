// ABOUTME: ResolveRequest describing one resolution call: target URL, recursion depth and incognito flag.
// ABOUTME: Nested requests for embedded pages are derived from their parent with a strictly greater depth.

use url::Url;

/// One resolution call.
///
/// A top-level request has `depth == 0`. Requests for embedded pages are
/// created with [`ResolveRequest::nested`] and never share state with their
/// parent other than the incognito flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub url: Url,
    pub depth: u32,
    pub incognito: bool,
}

impl ResolveRequest {
    /// Create a top-level request.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            incognito: false,
        }
    }

    /// Set the incognito flag.
    pub fn incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    /// Set the depth explicitly.
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Derive the request for a page embedded in this one.
    pub fn nested(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth.saturating_add(1),
            incognito: self.incognito,
        }
    }

    /// Returns true for the caller's own request.
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}
