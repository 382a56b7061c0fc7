// ABOUTME: Extractor handing acestream:// links to the Plexus add-on.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::extractors::{plugin, Context, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct AcestreamExtractor;

#[async_trait(?Send)]
impl Extractor for AcestreamExtractor {
    async fn extract(&self, url: &Url, _cx: &Context<'_>) -> Result<Option<String>> {
        if !url.scheme().eq_ignore_ascii_case("acestream") {
            return Ok(None);
        }
        Ok(Some(plugin::acestream(url.as_str())))
    }
}
