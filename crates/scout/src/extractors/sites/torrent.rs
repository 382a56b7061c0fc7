// ABOUTME: Extractor handing magnet links and .torrent files to the Elementum add-on.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::extractors::{plugin, Context, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct TorrentExtractor;

#[async_trait(?Send)]
impl Extractor for TorrentExtractor {
    async fn extract(&self, url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
        let is_magnet = url.scheme().eq_ignore_ascii_case("magnet");
        let is_file = url.path().to_ascii_lowercase().ends_with(".torrent");
        if !is_magnet && !is_file {
            return Ok(None);
        }
        Ok(Some(plugin::elementum(url.as_str())))
    }
}
