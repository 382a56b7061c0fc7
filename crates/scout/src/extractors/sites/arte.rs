// ABOUTME: Extractor for arte.tv video pages using the player configuration API.
// ABOUTME: Returns the first stream URL for the page's language and program id.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::extractors::{Context, Extractor};

pub const DEFAULT_API_BASE: &str = "https://api.arte.tv";

static VIDEO_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/([a-z]{2})/videos/([^/]+)/").expect("valid arte regex"));

#[derive(Debug, Deserialize)]
struct PlayerConfig {
    data: ConfigData,
}

#[derive(Debug, Deserialize)]
struct ConfigData {
    attributes: ConfigAttributes,
}

#[derive(Debug, Deserialize)]
struct ConfigAttributes {
    #[serde(default)]
    streams: Vec<Stream>,
}

#[derive(Debug, Deserialize)]
struct Stream {
    url: String,
}

#[derive(Debug, Clone)]
pub struct ArteExtractor {
    api_base: String,
}

impl ArteExtractor {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl Default for ArteExtractor {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

#[async_trait(?Send)]
impl Extractor for ArteExtractor {
    async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(caps) = VIDEO_PATH.captures(url.path()) else {
            return Ok(None);
        };
        let api = format!(
            "{}/api/player/v2/config/{}/{}",
            self.api_base.trim_end_matches('/'),
            &caps[1],
            &caps[2]
        );
        let config: PlayerConfig = cx.fetch_json(&api).await?;
        Ok(config
            .data
            .attributes
            .streams
            .into_iter()
            .map(|s| s.url)
            .find(|u| !u.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::testing::Harness;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unsupported_url() {
        let file = Harness::new()
            .run_url(&ArteExtractor::default(), "https://www.arte.tv/fr/guide/", false)
            .await
            .unwrap();
        assert_eq!(file, None);
    }

    #[tokio::test]
    async fn no_stream() {
        let server = MockServer::start();
        let api = server.mock(|when, then| {
            when.method(GET).path("/api/player/v2/config/de/foo");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"attributes":{"streams":[]}}}"#);
        });
        let file = Harness::new()
            .run_url(
                &ArteExtractor::with_api_base(server.base_url()),
                "https://www.arte.tv/de/videos/foo/bar",
                false,
            )
            .await
            .unwrap();
        assert_eq!(file, None);
        api.assert_hits(1);
    }

    #[tokio::test]
    async fn first_stream() {
        let server = MockServer::start();
        let api = server.mock(|when, then| {
            when.method(GET).path("/api/player/v2/config/fr/baz");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"attributes":{"streams":[{"url":"https://foo.tv/bar.mp4"}]}}}"#);
        });
        let file = Harness::new()
            .run_url(
                &ArteExtractor::with_api_base(server.base_url()),
                "https://www.arte.tv/fr/videos/baz/qux",
                false,
            )
            .await
            .unwrap();
        assert_eq!(file.as_deref(), Some("https://foo.tv/bar.mp4"));
        api.assert_hits(1);
    }

    #[tokio::test]
    async fn api_failure_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/player/v2/config/fr/baz");
            then.status(503);
        });
        let err = Harness::new()
            .run_url(
                &ArteExtractor::with_api_base(server.base_url()),
                "https://www.arte.tv/fr/videos/baz/qux",
                false,
            )
            .await
            .unwrap_err();
        assert!(err.is_fetch());
    }
}
