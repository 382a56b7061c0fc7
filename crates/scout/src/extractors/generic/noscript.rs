// ABOUTME: Extractor that looks for <video>/<audio> markup inside <noscript> fallbacks.
// ABOUTME: Noscript bodies parse as raw text when scripting is enabled, so each is re-parsed as a fragment.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::extractors::fields::{find_media_source, MediaKind};
use crate::extractors::{Context, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoscriptExtractor;

#[async_trait(?Send)]
impl Extractor for NoscriptExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };
        let Ok(selector) = Selector::parse("noscript") else {
            return Ok(None);
        };

        for noscript in page.html().select(&selector) {
            let body: String = noscript.text().collect();
            if body.trim().is_empty() {
                continue;
            }
            let fragment = Html::parse_fragment(&body);
            let found = find_media_source(&fragment, MediaKind::Video, page.url())
                .or_else(|| find_media_source(&fragment, MediaKind::Audio, page.url()));
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}
