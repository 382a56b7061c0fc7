// ABOUTME: Lazy, memoized fetch-and-parse of the target page for a single resolution call.
// ABOUTME: Non-HTML responses and transport failures degrade to "no document" instead of erroring.

//! Per-request document cache.
//!
//! Every extractor consulted during one resolution call receives the same
//! [`ContentCache`]. The page is fetched the first time an extractor asks for
//! it and never again: later and concurrent callers await the same outcome.
//! Nested resolutions build their own cache.

use scraper::Html;
use tokio::sync::OnceCell;
use url::Url;

use crate::resource::{fetch, FetchOptions};

/// A fetched and parsed HTML page.
#[derive(Debug)]
pub struct Page {
    url: Url,
    html: Html,
}

impl Page {
    /// Parse `source` as a document located at `url`.
    pub fn parse(url: Url, source: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(source),
        }
    }

    /// The page URL after redirects. Relative references resolve against it.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The parsed document.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Resolve a possibly relative reference found in the page.
    pub fn absolutize(&self, reference: &str) -> Option<Url> {
        self.url.join(reference.trim()).ok()
    }
}

/// Memoized document for one resolution call.
#[derive(Debug)]
pub struct ContentCache {
    url: Url,
    http: Option<reqwest::Client>,
    opts: FetchOptions,
    cell: OnceCell<Option<Page>>,
}

impl ContentCache {
    /// Create a cache that fetches `url` on first use.
    pub fn new(url: Url, http: reqwest::Client, opts: FetchOptions) -> Self {
        Self {
            url,
            http: Some(http),
            opts,
            cell: OnceCell::new(),
        }
    }

    /// Create a cache already holding `source` parsed as the page at `url`.
    pub fn with_html(url: Url, source: &str) -> Self {
        let page = Page::parse(url.clone(), source);
        Self {
            url,
            http: None,
            opts: FetchOptions::default(),
            cell: OnceCell::new_with(Some(Some(page))),
        }
    }

    /// Create a cache whose document is known to be unavailable.
    pub fn without_document(url: Url) -> Self {
        Self {
            url,
            http: None,
            opts: FetchOptions::default(),
            cell: OnceCell::new_with(Some(None)),
        }
    }

    /// Returns true once the document outcome is known.
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the parsed page, fetching it on first call.
    pub async fn document(&self) -> Option<&Page> {
        self.cell.get_or_init(|| self.load()).await.as_ref()
    }

    async fn load(&self) -> Option<Page> {
        let http = self.http.as_ref()?;
        let opts = FetchOptions {
            parse_non_200: true,
            ..self.opts.clone()
        };

        match fetch(http, self.url.as_str(), &opts).await {
            Ok(result) if result.is_html() => {
                let final_url = Url::parse(&result.final_url).unwrap_or_else(|_| self.url.clone());
                Some(Page::parse(final_url, &result.text()))
            }
            Ok(result) => {
                tracing::debug!(
                    "Skipping non-HTML content at {}: {:?}",
                    self.url,
                    result.content_type
                );
                None
            }
            Err(e) => {
                tracing::debug!("Document unavailable for {}: {}", self.url, e);
                None
            }
        }
    }
}
