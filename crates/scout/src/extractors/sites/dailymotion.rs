// ABOUTME: Extractor for Dailymotion watch, embed and dai.ly short links.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::extractors::{plugin, Context, Extractor};

static VIDEO_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?:embed/)?video/([^/?#]+)").expect("valid dailymotion regex")
});
static SHORT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/([^/?#]+)$").expect("valid dai.ly regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct DailymotionExtractor;

#[async_trait(?Send)]
impl Extractor for DailymotionExtractor {
    async fn extract(&self, url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
        let pattern = match url.host_str() {
            Some("dai.ly") => &SHORT_PATH,
            _ => &VIDEO_PATH,
        };
        Ok(pattern
            .captures(url.path())
            .map(|caps| plugin::dailymotion(&caps[1])))
    }
}
