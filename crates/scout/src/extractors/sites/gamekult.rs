// ABOUTME: Extractor for gamekult.com articles embedding a Dailymotion player.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::extractors::fields::extract_first_attr;
use crate::extractors::{plugin, Context, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct GamekultExtractor;

#[async_trait(?Send)]
impl Extractor for GamekultExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };
        Ok(extract_first_attr(page.html(), &[".js-dailymotion-video[data-id]"], "data-id")
            .map(|id| plugin::dailymotion(&id)))
    }
}
