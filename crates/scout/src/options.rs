// ABOUTME: Configuration options for the resolver and the ResolverBuilder fluent API.
// ABOUTME: Covers HTTP client settings, recursion ceiling, extractor registry and dynamic evaluation host.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::dynamic::{
    ContextLookup, PageHost, RestrictionCategory, RestrictionTable, ScriptDescriptor, ScriptRunner,
};
use crate::extractors::ExtractorRegistry;
use crate::resolver::Resolver;

/// Default ceiling for nested resolutions through embedded pages.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Configuration options for the resolver.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
    pub max_depth: u32,
    pub registry: Option<Arc<ExtractorRegistry>>,
    pub restrictions: RestrictionTable,
    pub script: ScriptDescriptor,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("castkit-scout/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_private_networks: false,
            http_client: None,
            headers: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            registry: None,
            restrictions: RestrictionTable::default(),
            script: ScriptDescriptor::default(),
        }
    }
}

/// Builder for constructing Resolver instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    opts: Options,
    host: Option<PageHost>,
}

impl ResolverBuilder {
    /// Create a new ResolverBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
            host: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the maximum depth of nested resolutions.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.opts.max_depth = max_depth;
        self
    }

    /// Set a custom extractor registry.
    pub fn registry(mut self, registry: impl Into<Arc<ExtractorRegistry>>) -> Self {
        self.opts.registry = Some(registry.into());
        self
    }

    /// Replace the table of benign scripting restrictions.
    pub fn restrictions(mut self, table: RestrictionTable) -> Self {
        self.opts.restrictions = table;
        self
    }

    /// Mark a restriction as benign on a host.
    pub fn restriction(mut self, host: impl Into<String>, category: RestrictionCategory) -> Self {
        self.opts.restrictions.insert(host, category);
        self
    }

    /// Set the script run in live page contexts.
    pub fn script(mut self, script: ScriptDescriptor) -> Self {
        self.opts.script = script;
        self
    }

    /// Enable dynamic evaluation through the host's capabilities.
    pub fn page_host(
        mut self,
        lookup: impl ContextLookup + 'static,
        runner: impl ScriptRunner + 'static,
    ) -> Self {
        self.host = Some(PageHost::new(lookup, runner));
        self
    }

    /// Enable dynamic evaluation with a prepared host.
    pub fn host(mut self, host: PageHost) -> Self {
        self.host = Some(host);
        self
    }

    /// Build the Resolver with the configured options.
    pub fn build(self) -> Resolver {
        Resolver::with_host(self.opts, self.host)
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
