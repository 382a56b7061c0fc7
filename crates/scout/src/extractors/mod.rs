// ABOUTME: The Extractor capability trait, its per-call Context, and the ordered ExtractorRegistry.
// ABOUTME: Registry entries pair a URL match criterion with a strategy and are ordered Site, Generic, Frame.

//! Media extraction strategies.
//!
//! Every strategy implements [`Extractor`]: given a URL and a [`Context`], it
//! either yields a media reference (`Ok(Some(..))`) or declines (`Ok(None)`).
//! Declining is never signalled with an error; an error aborts the whole
//! resolution.
//!
//! Submodules:
//! - `sites`: site-specific strategies (URL patterns, secondary API calls).
//! - `generic`: catch-all strategies over the page document, and frame unwrapping.
//! - `loader`: the builtin registry table.
//! - `fields`: DOM helpers shared by the strategies.
//! - `plugin`: player launch URI builders.

pub mod fields;
pub mod generic;
pub mod loader;
pub mod plugin;
pub mod sites;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use url::Url;

use crate::content::{ContentCache, Page};
use crate::error::Result;
use crate::request::ResolveRequest;
use crate::resolver::Resolver;

/// A strategy that turns a page URL into a playable media reference.
///
/// Futures are not `Send`: the parsed document is tied to the calling task.
#[async_trait(?Send)]
pub trait Extractor: Send + Sync {
    /// Returns the media reference, or `None` when the strategy does not apply.
    async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>>;
}

/// Everything an extractor may use during one resolution call.
pub struct Context<'a> {
    resolver: &'a Resolver,
    request: &'a ResolveRequest,
    content: &'a ContentCache,
}

impl<'a> Context<'a> {
    pub fn new(
        resolver: &'a Resolver,
        request: &'a ResolveRequest,
        content: &'a ContentCache,
    ) -> Self {
        Self {
            resolver,
            request,
            content,
        }
    }

    pub fn depth(&self) -> u32 {
        self.request.depth
    }

    pub fn incognito(&self) -> bool {
        self.request.incognito
    }

    /// The page document, fetched at most once per call.
    pub async fn document(&self) -> Option<&'a Page> {
        self.content.document().await
    }

    /// Fetch and decode a secondary JSON resource with the resolver's HTTP client.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.resolver.fetch_json(url).await
    }

    /// Resolve an embedded page one level deeper.
    ///
    /// The nested call has its own document cache. Its result is returned
    /// unchanged, including `None` when the nested chain is exhausted or the
    /// depth ceiling is reached.
    pub async fn resolve_nested(&self, url: Url) -> Result<Option<String>> {
        self.resolver.resolve_nested(self.request, url).await
    }
}

/// Position class of a registry entry. Entries run in ascending tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Site-specific heuristics.
    Site,
    /// Catch-alls over the page document.
    Generic,
    /// Frame unwrapping, tried only after direct heuristics fail.
    Frame,
}

/// The URL criterion gating an entry.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Every URL.
    Any,
    /// URLs with one of these schemes.
    Schemes(&'static [&'static str]),
    /// URLs whose host is one of these names.
    Hosts(&'static [&'static str]),
    /// URLs whose serialization matches the pattern.
    Pattern(Regex),
}

impl Matcher {
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Schemes(schemes) => schemes
                .iter()
                .any(|s| url.scheme().eq_ignore_ascii_case(s)),
            Matcher::Hosts(hosts) => url
                .host_str()
                .map(|host| hosts.iter().any(|h| host.eq_ignore_ascii_case(h)))
                .unwrap_or(false),
            Matcher::Pattern(re) => re.is_match(url.as_str()),
        }
    }
}

/// One row of the registry table.
pub struct Entry {
    name: &'static str,
    tier: Tier,
    matcher: Matcher,
    extractor: Box<dyn Extractor>,
}

impl Entry {
    pub fn new(
        name: &'static str,
        tier: Tier,
        matcher: Matcher,
        extractor: impl Extractor + 'static,
    ) -> Self {
        Self {
            name,
            tier,
            matcher,
            extractor: Box::new(extractor),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.matcher.matches(url)
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// Immutable ordered chain of extractors.
#[derive(Debug, Default)]
pub struct ExtractorRegistry {
    entries: Vec<Entry>,
}

static BUILTIN_REGISTRY: Lazy<Arc<ExtractorRegistry>> =
    Lazy::new(|| Arc::new(loader::load_builtin_registry()));

impl ExtractorRegistry {
    /// Build a registry from a declared table.
    ///
    /// Entries are stably ordered by tier; declaration order is kept within a tier.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(|e| e.tier);
        Self { entries }
    }

    /// The process-wide builtin registry.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    #[async_trait(?Send)]
    impl Extractor for Never {
        async fn extract(&self, _url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn registry_orders_by_tier_stably() {
        let registry = ExtractorRegistry::new(vec![
            Entry::new("frame", Tier::Frame, Matcher::Any, Never),
            Entry::new("generic-a", Tier::Generic, Matcher::Any, Never),
            Entry::new("site-a", Tier::Site, Matcher::Any, Never),
            Entry::new("generic-b", Tier::Generic, Matcher::Any, Never),
            Entry::new("site-b", Tier::Site, Matcher::Any, Never),
        ]);
        assert_eq!(
            registry.names(),
            vec!["site-a", "site-b", "generic-a", "generic-b", "frame"]
        );
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn matcher_schemes_and_hosts() {
        let ace = Url::parse("acestream://foo").unwrap();
        let web = Url::parse("HTTPS://WWW.Veoh.com/watch/foo").unwrap();

        assert!(Matcher::Schemes(&["acestream"]).matches(&ace));
        assert!(!Matcher::Schemes(&["acestream"]).matches(&web));
        assert!(Matcher::Hosts(&["www.veoh.com"]).matches(&web));
        assert!(!Matcher::Hosts(&["veoh.com"]).matches(&web));
        assert!(Matcher::Any.matches(&ace));
    }

    #[test]
    fn matcher_pattern() {
        let m = Matcher::Pattern(Regex::new(r"(?i)\.torrent(?:[?#]|$)").unwrap());
        assert!(m.matches(&Url::parse("https://foo.com/bar.TORRENT").unwrap()));
        assert!(m.matches(&Url::parse("https://foo.com/bar.torrent?x=1").unwrap()));
        assert!(!m.matches(&Url::parse("https://foo.com/bar.torrents").unwrap()));
    }
}
