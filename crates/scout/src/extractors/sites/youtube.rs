// ABOUTME: Extractor for YouTube watch, shorts, embed and playlist links, including youtu.be.
// ABOUTME: Incognito requests ask the add-on not to record history.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::extractors::plugin::{self, YoutubeTarget};
use crate::extractors::{Context, Extractor};

static ID_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?:embed|shorts|live|v)/([\w-]+)").expect("valid youtube regex")
});
static SHORT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/([\w-]+)").expect("valid youtu.be regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubeExtractor;

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Work out what a YouTube URL points at.
pub fn target(url: &Url) -> Option<YoutubeTarget> {
    if url.host_str() == Some("youtu.be") {
        return SHORT_PATH
            .captures(url.path())
            .map(|caps| YoutubeTarget::Video(caps[1].to_string()));
    }

    match url.path() {
        "/watch" => query_value(url, "v")
            .map(YoutubeTarget::Video)
            .or_else(|| query_value(url, "list").map(YoutubeTarget::Playlist)),
        "/playlist" => query_value(url, "list").map(YoutubeTarget::Playlist),
        path => ID_PATH
            .captures(path)
            .map(|caps| YoutubeTarget::Video(caps[1].to_string())),
    }
}

#[async_trait(?Send)]
impl Extractor for YoutubeExtractor {
    async fn extract(&self, url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        Ok(target(url).map(|t| plugin::youtube(&t, cx.incognito())))
    }
}
