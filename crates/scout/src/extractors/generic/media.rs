// ABOUTME: Extractor returning the source of the first <video> or <audio> element in the page.
// ABOUTME: One instance per media kind so video and audio occupy separate registry rows.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::extractors::fields::{find_media_source, MediaKind};
use crate::extractors::{Context, Extractor};

#[derive(Debug, Clone, Copy)]
pub struct MediaExtractor {
    kind: MediaKind,
}

impl MediaExtractor {
    pub fn video() -> Self {
        Self {
            kind: MediaKind::Video,
        }
    }

    pub fn audio() -> Self {
        Self {
            kind: MediaKind::Audio,
        }
    }
}

#[async_trait(?Send)]
impl Extractor for MediaExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };
        Ok(find_media_source(page.html(), self.kind, page.url()))
    }
}
