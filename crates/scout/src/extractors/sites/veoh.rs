// ABOUTME: Extractor for veoh.com watch pages using the site's getVideo API.
// ABOUTME: Returns the high-quality source when the API reports success.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::extractors::{Context, Extractor};

pub const DEFAULT_API_BASE: &str = "https://www.veoh.com";

static WATCH_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/watch/([^/?#]+)").expect("valid veoh regex"));

#[derive(Debug, Deserialize)]
struct VideoResponse {
    #[serde(default)]
    success: bool,
    video: Option<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    src: VideoSources,
}

#[derive(Debug, Deserialize)]
struct VideoSources {
    #[serde(rename = "HQ", default)]
    hq: String,
}

#[derive(Debug, Clone)]
pub struct VeohExtractor {
    api_base: String,
}

impl VeohExtractor {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl Default for VeohExtractor {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

#[async_trait(?Send)]
impl Extractor for VeohExtractor {
    async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(caps) = WATCH_PATH.captures(url.path()) else {
            return Ok(None);
        };
        let api = format!(
            "{}/watch/getVideo/{}",
            self.api_base.trim_end_matches('/'),
            &caps[1]
        );
        let response: VideoResponse = cx.fetch_json(&api).await?;
        if !response.success {
            return Ok(None);
        }
        Ok(response
            .video
            .map(|v| v.src.hq)
            .filter(|hq| !hq.is_empty()))
    }
}
