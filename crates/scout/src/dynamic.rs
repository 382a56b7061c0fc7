// ABOUTME: Live-page fallback that runs a generic extraction script in every frame of matching page contexts.
// ABOUTME: Host capabilities are injected traits; known host scripting restrictions map to a structured table.

//! Dynamic evaluation.
//!
//! When static parsing finds nothing, a page that is currently open in the
//! host (a browser tab, a webview) can still be inspected by running a script
//! in each of its frames. This crate cannot render pages, so the host provides
//! two capabilities:
//!
//! - [`ContextLookup`]: which live page contexts show a URL.
//! - [`ScriptRunner`]: run a script in all frames of a context, one result per frame.
//!
//! Some hosts forbid scripting certain pages (extension galleries, pages the
//! extension has no permission for). Those rejections are benign only when the
//! `(host, category)` pair appears in the [`RestrictionTable`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::{ResolveError, Result};

/// Script file injected by default.
pub const DEFAULT_SCRIPT_FILE: &str = "/script/extractor.js";

/// Identifier of a live page context in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageContextId(pub u64);

impl fmt::Display for PageContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to run in a page context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub all_frames: bool,
    pub file: String,
}

impl Default for ScriptDescriptor {
    fn default() -> Self {
        Self {
            all_frames: true,
            file: DEFAULT_SCRIPT_FILE.to_string(),
        }
    }
}

/// Kinds of host policy that forbid scripting a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictionCategory {
    /// The browser's extension gallery cannot be scripted.
    ExtensionGallery,
    /// The extension lacks host permission for the page or its frames.
    MissingHostPermission,
}

/// Host wordings for each restriction, matched as prefixes.
const RESTRICTION_WORDINGS: &[(&str, RestrictionCategory)] = &[
    (
        "The extensions gallery cannot be scripted",
        RestrictionCategory::ExtensionGallery,
    ),
    (
        "Missing host permission for the tab",
        RestrictionCategory::MissingHostPermission,
    ),
];

impl RestrictionCategory {
    /// Recognize a host's error message.
    pub fn recognize(message: &str) -> Option<Self> {
        let message = message.trim();
        RESTRICTION_WORDINGS
            .iter()
            .find(|(wording, _)| message.starts_with(wording))
            .map(|(_, category)| *category)
    }
}

/// A rejection from the host's script runner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("{message}")]
    Restricted {
        category: RestrictionCategory,
        message: String,
    },
    #[error("{0}")]
    Failed(String),
}

impl ScriptError {
    /// Classify a raw host message.
    ///
    /// Host adapters call this once at the boundary so the rest of the
    /// pipeline only sees structured categories.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        match RestrictionCategory::recognize(&message) {
            Some(category) => ScriptError::Restricted { category, message },
            None => ScriptError::Failed(message),
        }
    }
}

/// Hosts on which a given restriction is expected and harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionTable {
    entries: Vec<(String, RestrictionCategory)>,
}

impl Default for RestrictionTable {
    fn default() -> Self {
        Self::empty()
            .with("chrome.google.com", RestrictionCategory::ExtensionGallery)
            .with(
                "chromewebstore.google.com",
                RestrictionCategory::ExtensionGallery,
            )
            .with(
                "addons.mozilla.org",
                RestrictionCategory::MissingHostPermission,
            )
    }
}

impl RestrictionTable {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, host: impl Into<String>, category: RestrictionCategory) -> Self {
        self.insert(host, category);
        self
    }

    pub fn insert(&mut self, host: impl Into<String>, category: RestrictionCategory) {
        let host = host.into().to_ascii_lowercase();
        if !self.entries.iter().any(|(h, c)| *h == host && *c == category) {
            self.entries.push((host, category));
        }
    }

    /// Returns true if `category` is a known, harmless restriction for the URL's host.
    pub fn is_benign(&self, url: &Url, category: RestrictionCategory) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.entries
            .iter()
            .any(|(h, c)| *c == category && host.eq_ignore_ascii_case(h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds live page contexts showing a URL.
#[async_trait(?Send)]
pub trait ContextLookup: Send + Sync {
    async fn find(&self, url: &Url) -> Vec<PageContextId>;
}

/// Runs a script in a page context, returning one slot per frame.
#[async_trait(?Send)]
pub trait ScriptRunner: Send + Sync {
    async fn run(
        &self,
        context: PageContextId,
        script: &ScriptDescriptor,
    ) -> std::result::Result<Vec<Option<String>>, ScriptError>;
}

/// The pair of host capabilities used by dynamic evaluation.
#[derive(Clone)]
pub struct PageHost {
    lookup: Arc<dyn ContextLookup>,
    runner: Arc<dyn ScriptRunner>,
}

impl PageHost {
    pub fn new(lookup: impl ContextLookup + 'static, runner: impl ScriptRunner + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
            runner: Arc::new(runner),
        }
    }

    /// Use one host object for both capabilities.
    pub fn shared<H>(host: Arc<H>) -> Self
    where
        H: ContextLookup + ScriptRunner + 'static,
    {
        Self {
            lookup: host.clone(),
            runner: host,
        }
    }
}

impl fmt::Debug for PageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHost").finish_non_exhaustive()
    }
}

/// Runs the extraction script across live contexts and frames.
#[derive(Debug, Clone)]
pub struct DynamicEvaluator {
    host: PageHost,
    script: ScriptDescriptor,
    restrictions: RestrictionTable,
}

impl DynamicEvaluator {
    pub fn new(host: PageHost, script: ScriptDescriptor, restrictions: RestrictionTable) -> Self {
        Self {
            host,
            script,
            restrictions,
        }
    }

    /// Returns the first present, non-empty frame result across contexts.
    ///
    /// A benign restriction yields an `ErrorCode::Restricted` error, which the
    /// resolver turns into pass-through. Any other rejection is an
    /// `ErrorCode::Script` error carrying the host's message.
    pub async fn evaluate(&self, url: &Url) -> Result<Option<String>> {
        let contexts = self.host.lookup.find(url).await;
        if contexts.is_empty() {
            return Ok(None);
        }

        for context in contexts {
            tracing::debug!("Running {} in context {} for {}", self.script.file, context, url);
            match self.host.runner.run(context, &self.script).await {
                Ok(frames) => {
                    let found = frames
                        .into_iter()
                        .flatten()
                        .find(|candidate| !candidate.is_empty());
                    if found.is_some() {
                        return Ok(found);
                    }
                }
                Err(ScriptError::Restricted { category, message })
                    if self.restrictions.is_benign(url, category) =>
                {
                    return Err(ResolveError::restricted(
                        url.as_str(),
                        "Evaluate",
                        Some(anyhow::Error::new(ScriptError::Restricted {
                            category,
                            message,
                        })),
                    ));
                }
                Err(e) => {
                    return Err(ResolveError::script(
                        url.as_str(),
                        "Evaluate",
                        Some(anyhow::Error::new(e)),
                    ));
                }
            }
        }
        Ok(None)
    }
}
