// ABOUTME: Extractor for vimeo.com pages and player.vimeo.com embeds.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::extractors::{plugin, Context, Extractor};

static PAGE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(\d+)(?:[/?#]|$)").expect("valid vimeo regex"));
static PLAYER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/video/([^/?#]+)").expect("valid vimeo player regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct VimeoExtractor;

#[async_trait(?Send)]
impl Extractor for VimeoExtractor {
    async fn extract(&self, url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
        let pattern = match url.host_str() {
            Some("player.vimeo.com") => &PLAYER_PATH,
            _ => &PAGE_PATH,
        };
        Ok(pattern
            .captures(url.path())
            .map(|caps| plugin::vimeo(&caps[1])))
    }
}
