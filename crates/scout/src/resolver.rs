// ABOUTME: The Resolver that runs the ordered extractor chain over a lazily fetched page.
// ABOUTME: Applies pass-through at the top level, declines when nested, and bounds recursion depth.

use std::net::ToSocketAddrs;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::content::ContentCache;
use crate::dynamic::{DynamicEvaluator, PageHost};
use crate::error::{ResolveError, Result};
use crate::extractors::{Context, ExtractorRegistry};
use crate::options::{Options, ResolverBuilder};
use crate::request::ResolveRequest;
use crate::resource::{self, FetchOptions};
use crate::result::Resolution;

/// Resolves page URLs into playable media references.
pub struct Resolver {
    opts: Options,
    http_client: reqwest::Client,
    registry: Arc<ExtractorRegistry>,
    dynamic: Option<DynamicEvaluator>,
}

impl Resolver {
    /// Create a new ResolverBuilder for configuring the resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Create a new Resolver without dynamic evaluation.
    pub fn new(opts: Options) -> Self {
        Self::with_host(opts, None)
    }

    /// Create a new Resolver, enabling dynamic evaluation when a host is given.
    pub fn with_host(opts: Options, host: Option<PageHost>) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            let allow_private = opts.allow_private_networks;
            let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() >= 10 {
                    return attempt.error("too many redirects");
                }
                if !allow_private {
                    let next = attempt.url();
                    if let Some(host) = next.host_str() {
                        let port = next.port_or_known_default().unwrap_or(80);
                        let bare = host.trim_start_matches('[').trim_end_matches(']');
                        if let Ok(ip) = bare.parse::<std::net::IpAddr>() {
                            if resource::is_private_ip(&ip) {
                                return attempt.error("redirect to private IP blocked");
                            }
                        } else {
                            // synchronous DNS resolution to avoid async in redirect policy
                            match (host, port).to_socket_addrs() {
                                Ok(addrs) => {
                                    if addrs
                                        .into_iter()
                                        .any(|sa| resource::is_private_ip(&sa.ip()))
                                    {
                                        return attempt.error("redirect to private IP blocked");
                                    }
                                }
                                Err(_) => {
                                    return attempt.error("DNS lookup failed during redirect");
                                }
                            }
                        }
                    }
                }
                attempt.follow()
            });

            reqwest::Client::builder()
                .redirect(redirect_policy)
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let registry = opts.registry.clone().unwrap_or_else(ExtractorRegistry::builtin);
        let dynamic = host.map(|host| {
            DynamicEvaluator::new(host, opts.script.clone(), opts.restrictions.clone())
        });

        Self {
            opts,
            http_client,
            registry,
            dynamic,
        }
    }

    /// Resolve a URL string at the top level.
    ///
    /// Always yields a media reference: either an extracted one or the input
    /// URL itself (pass-through).
    pub async fn resolve(&self, url: &str, incognito: bool) -> Result<Resolution> {
        if url.is_empty() {
            return Err(ResolveError::invalid_url(url, "Resolve", None));
        }
        let parsed = Url::parse(url).map_err(|e| {
            ResolveError::invalid_url(
                url,
                "Resolve",
                Some(anyhow::anyhow!("malformed URL: {}", e)),
            )
        })?;

        let request = ResolveRequest::new(parsed).incognito(incognito);
        let file = self
            .extract(&request)
            .await?
            .unwrap_or_else(|| request.url.to_string());
        Ok(Resolution::new(request.url.as_str(), file))
    }

    /// Run the extractor chain for one request.
    ///
    /// Returns the first extractor's result. When every extractor declines,
    /// returns the request URL at depth 0 and `None` at any deeper level.
    ///
    /// A rejected page script surfaces as an `ErrorCode::Script` error. Its
    /// `Display` is prefixed with the operation and URL; the host's message
    /// is kept verbatim in the source, see [`ResolveError::source_message`].
    pub async fn extract(&self, request: &ResolveRequest) -> Result<Option<String>> {
        let content = ContentCache::new(
            request.url.clone(),
            self.http_client.clone(),
            self.fetch_options(),
        );
        self.extract_with(request, &content).await
    }

    /// Run the extractor chain against a prepared document cache.
    pub async fn extract_with(
        &self,
        request: &ResolveRequest,
        content: &ContentCache,
    ) -> Result<Option<String>> {
        match self.run_chain(request, content).await {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) => Ok(self.exhausted(request)),
            Err(e) if e.is_restricted() => {
                tracing::warn!(
                    "Scripting restricted on {}, passing through: {}",
                    request.url,
                    e
                );
                Ok(self.exhausted(request))
            }
            Err(e) => Err(e),
        }
    }

    async fn run_chain(
        &self,
        request: &ResolveRequest,
        content: &ContentCache,
    ) -> Result<Option<String>> {
        let cx = Context::new(self, request, content);
        for entry in self.registry.entries() {
            if !entry.matches(&request.url) {
                continue;
            }
            if let Some(file) = entry.extractor().extract(&request.url, &cx).await? {
                tracing::debug!(
                    "Extractor {} matched {} at depth {}",
                    entry.name(),
                    request.url,
                    request.depth
                );
                return Ok(Some(file));
            }
        }

        if let Some(dynamic) = &self.dynamic {
            if let Some(file) = dynamic.evaluate(&request.url).await? {
                tracing::debug!("Dynamic evaluation matched {}", request.url);
                return Ok(Some(file));
            }
        }
        Ok(None)
    }

    fn exhausted(&self, request: &ResolveRequest) -> Option<String> {
        request.is_top_level().then(|| request.url.to_string())
    }

    pub(crate) async fn resolve_nested(
        &self,
        parent: &ResolveRequest,
        url: Url,
    ) -> Result<Option<String>> {
        let request = parent.nested(url);
        if request.depth > self.opts.max_depth {
            tracing::debug!(
                "Depth ceiling {} reached, not following {}",
                self.opts.max_depth,
                request.url
            );
            return Ok(None);
        }
        tracing::debug!("Following {} at depth {}", request.url, request.depth);
        self.extract(&request).await
    }

    pub(crate) async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        resource::fetch_json(&self.http_client, url, &self.fetch_options()).await
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
            parse_non_200: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Entry, Extractor, Matcher, Tier};
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records calls and answers with a fixed outcome.
    struct Probe {
        calls: Arc<AtomicUsize>,
        answer: Option<&'static str>,
        reads_document: bool,
    }

    impl Probe {
        fn new(answer: Option<&'static str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let probe = Self {
                calls: calls.clone(),
                answer,
                reads_document: true,
            };
            (probe, calls)
        }
    }

    #[async_trait(?Send)]
    impl Extractor for Probe {
        async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reads_document {
                let _ = cx.document().await;
            }
            Ok(self.answer.map(str::to_string))
        }
    }

    struct Failing;

    #[async_trait(?Send)]
    impl Extractor for Failing {
        async fn extract(&self, url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
            Err(ResolveError::extract(
                url.as_str(),
                "Failing",
                Some(anyhow::anyhow!("boom")),
            ))
        }
    }

    /// Follows `?next=` query values one level deeper, recording seen depths.
    struct Hop {
        depths: Arc<Mutex<Vec<u32>>>,
    }

    #[async_trait(?Send)]
    impl Extractor for Hop {
        async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
            self.depths.lock().unwrap().push(cx.depth());
            match url.query_pairs().find(|(k, _)| k == "next") {
                Some((_, next)) => {
                    let next = Url::parse(&next).map_err(|e| {
                        ResolveError::extract(url.as_str(), "Hop", Some(e.into()))
                    })?;
                    cx.resolve_nested(next).await
                }
                None => Ok(None),
            }
        }
    }

    fn resolver_with(entries: Vec<Entry>) -> Resolver {
        Resolver::builder()
            .allow_private_networks(true)
            .registry(ExtractorRegistry::new(entries))
            .build()
    }

    fn svg_server() -> (MockServer, String) {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bar.svg");
            then.status(200)
                .header("content-type", "application/svg+xml")
                .body("");
        });
        let url = server.url("/bar.svg");
        (server, url)
    }

    #[tokio::test]
    async fn first_match_short_circuits() {
        let (first, first_calls) = Probe::new(None);
        let (second, second_calls) = Probe::new(Some("https://foo.com/match.mp4"));
        let (third, third_calls) = Probe::new(Some("https://foo.com/later.mp4"));
        let resolver = resolver_with(vec![
            Entry::new("first", Tier::Site, Matcher::Any, first),
            Entry::new("second", Tier::Site, Matcher::Any, second),
            Entry::new("third", Tier::Generic, Matcher::Any, third),
        ]);
        let (_server, url) = svg_server();

        let request = ResolveRequest::new(Url::parse(&url).unwrap());
        let file = resolver.extract(&request).await.unwrap();

        assert_eq!(file.as_deref(), Some("https://foo.com/match.mp4"));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_string_is_a_match() {
        let (empty, _) = Probe::new(Some(""));
        let (later, later_calls) = Probe::new(Some("https://foo.com/x.mp4"));
        let resolver = resolver_with(vec![
            Entry::new("empty", Tier::Site, Matcher::Any, empty),
            Entry::new("later", Tier::Site, Matcher::Any, later),
        ]);
        let (_server, url) = svg_server();

        let request = ResolveRequest::new(Url::parse(&url).unwrap());
        assert_eq!(resolver.extract(&request).await.unwrap().as_deref(), Some(""));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_entries_are_skipped() {
        let (probe, calls) = Probe::new(Some("plugin://nope"));
        let resolver = resolver_with(vec![Entry::new(
            "hosts",
            Tier::Site,
            Matcher::Hosts(&["www.veoh.com"]),
            probe,
        )]);
        let (_server, url) = svg_server();

        let request = ResolveRequest::new(Url::parse(&url).unwrap());
        assert_eq!(resolver.extract(&request).await.unwrap().as_deref(), Some(url.as_str()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn document_fetched_once_for_whole_chain() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page.html");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body></body></html>");
        });
        let entries = (0..5)
            .map(|_| Entry::new("probe", Tier::Generic, Matcher::Any, Probe::new(None).0))
            .collect();
        let resolver = resolver_with(entries);

        let request = ResolveRequest::new(Url::parse(&server.url("/page.html")).unwrap());
        resolver.extract(&request).await.unwrap();

        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn exhausted_chain_passes_through_at_top_level_only() {
        let resolver = resolver_with(vec![Entry::new(
            "probe",
            Tier::Generic,
            Matcher::Any,
            Probe::new(None).0,
        )]);
        let (_server, url) = svg_server();
        let parsed = Url::parse(&url).unwrap();

        let top = ResolveRequest::new(parsed.clone());
        assert_eq!(resolver.extract(&top).await.unwrap().as_deref(), Some(url.as_str()));

        let nested = ResolveRequest::new(parsed).depth(1);
        assert_eq!(resolver.extract(&nested).await.unwrap(), None);
    }

    #[tokio::test]
    async fn extractor_error_aborts_chain() {
        let (after, after_calls) = Probe::new(Some("https://foo.com/x.mp4"));
        let resolver = resolver_with(vec![
            Entry::new("failing", Tier::Site, Matcher::Any, Failing),
            Entry::new("after", Tier::Generic, Matcher::Any, after),
        ]);
        let (_server, url) = svg_server();

        let request = ResolveRequest::new(Url::parse(&url).unwrap());
        let err = resolver.extract(&request).await.expect_err("error propagates");
        assert!(err.is_extract());
        assert_eq!(err.source_message().as_deref(), Some("boom"));
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn nested_resolution_increments_depth() {
        let depths = Arc::new(Mutex::new(Vec::new()));
        let (leaf, leaf_calls) = Probe::new(Some("https://cdn.foo.com/file.mp4"));
        let resolver = resolver_with(vec![
            Entry::new(
                "hop",
                Tier::Frame,
                Matcher::Pattern(regex::Regex::new(r"next=").unwrap()),
                Hop {
                    depths: depths.clone(),
                },
            ),
            Entry::new(
                "leaf",
                Tier::Site,
                Matcher::Hosts(&["embed.foo.com"]),
                Probe {
                    reads_document: false,
                    ..leaf
                },
            ),
        ]);

        let outer =
            Url::parse("https://www.foo.com/page?next=https%3A%2F%2Fembed.foo.com%2Fv").unwrap();
        let request = ResolveRequest::new(outer.clone());
        let content = ContentCache::without_document(outer);
        let file = resolver.extract_with(&request, &content).await.unwrap();

        assert_eq!(file.as_deref(), Some("https://cdn.foo.com/file.mp4"));
        assert_eq!(*depths.lock().unwrap(), vec![0]);
        assert_eq!(leaf_calls.load(Ordering::SeqCst), 1);
    }

    /// Embeds its own URL, like a page whose iframe points back at itself.
    struct SelfEmbed {
        depths: Arc<Mutex<Vec<u32>>>,
    }

    #[async_trait(?Send)]
    impl Extractor for SelfEmbed {
        async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
            self.depths.lock().unwrap().push(cx.depth());
            cx.resolve_nested(url.clone()).await
        }
    }

    #[tokio::test]
    async fn depth_ceiling_stops_self_reference() {
        let depths = Arc::new(Mutex::new(Vec::new()));
        let resolver = Resolver::builder()
            .max_depth(3)
            .registry(ExtractorRegistry::new(vec![Entry::new(
                "self",
                Tier::Frame,
                Matcher::Any,
                SelfEmbed {
                    depths: depths.clone(),
                },
            )]))
            .build();

        let looping = Url::parse("acestream://loop").unwrap();
        let request = ResolveRequest::new(looping.clone());
        let file = resolver.extract(&request).await.unwrap();

        assert_eq!(file.as_deref(), Some(looping.as_str()));
        assert_eq!(*depths.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn resolve_rejects_malformed_url() {
        let resolver = resolver_with(Vec::new());
        let err = resolver.resolve("not a url", false).await.unwrap_err();
        assert!(err.is_invalid_url());
        let err = resolver.resolve("", false).await.unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[tokio::test]
    async fn resolve_reports_pass_through() {
        let resolver = resolver_with(Vec::new());
        let (_server, url) = svg_server();
        let resolution = resolver.resolve(&url, false).await.unwrap();
        assert_eq!(resolution.file, url);
        assert!(resolution.pass_through);
    }

    struct StaticHost {
        outcome: std::result::Result<Vec<Option<String>>, crate::dynamic::ScriptError>,
    }

    #[async_trait(?Send)]
    impl crate::dynamic::ContextLookup for StaticHost {
        async fn find(&self, _url: &Url) -> Vec<crate::dynamic::PageContextId> {
            vec![crate::dynamic::PageContextId(7)]
        }
    }

    #[async_trait(?Send)]
    impl crate::dynamic::ScriptRunner for StaticHost {
        async fn run(
            &self,
            _context: crate::dynamic::PageContextId,
            _script: &crate::dynamic::ScriptDescriptor,
        ) -> std::result::Result<Vec<Option<String>>, crate::dynamic::ScriptError> {
            self.outcome.clone()
        }
    }

    fn dynamic_resolver(
        outcome: std::result::Result<Vec<Option<String>>, crate::dynamic::ScriptError>,
    ) -> Resolver {
        Resolver::builder()
            .registry(ExtractorRegistry::new(Vec::new()))
            .host(PageHost::shared(Arc::new(StaticHost { outcome })))
            .build()
    }

    #[tokio::test]
    async fn dynamic_evaluation_runs_after_chain() {
        let resolver =
            dynamic_resolver(Ok(vec![None, Some("https://cdn.foo.com/live.m3u8".into())]));
        let url = Url::parse("acestream://foo").unwrap();
        let file = resolver.extract(&ResolveRequest::new(url)).await.unwrap();
        assert_eq!(file.as_deref(), Some("https://cdn.foo.com/live.m3u8"));
    }

    #[tokio::test]
    async fn benign_restriction_passes_through() {
        let resolver = dynamic_resolver(Err(crate::dynamic::ScriptError::from_message(
            "The extensions gallery cannot be scripted.",
        )));
        let url = Url::parse("https://chrome.google.com/webstore/detail/foo").unwrap();

        let top = ResolveRequest::new(url.clone());
        assert_eq!(
            resolver
                .extract_with(&top, &ContentCache::without_document(url.clone()))
                .await
                .unwrap()
                .as_deref(),
            Some(url.as_str())
        );

        let nested = ResolveRequest::new(url.clone()).depth(2);
        assert_eq!(
            resolver
                .extract_with(&nested, &ContentCache::without_document(url))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn other_script_errors_propagate() {
        let resolver = dynamic_resolver(Err(crate::dynamic::ScriptError::from_message(
            "Frame with ID 0 was removed.",
        )));
        let url = Url::parse("https://www.foo.com/").unwrap();
        let request = ResolveRequest::new(url.clone());
        let err = resolver
            .extract_with(&request, &ContentCache::without_document(url))
            .await
            .unwrap_err();
        assert!(err.is_script());
        assert_eq!(
            err.source_message().as_deref(),
            Some("Frame with ID 0 was removed.")
        );
        assert!(err
            .to_string()
            .starts_with("scout: Evaluate https://www.foo.com/: "));
    }
}
