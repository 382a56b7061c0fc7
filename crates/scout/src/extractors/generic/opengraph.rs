// ABOUTME: Extractor reading og:video and og:audio Open Graph properties.
// ABOUTME: HTML players are followed through a nested resolution; direct media types are returned.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::extractors::fields::{absolutize_media, extract_meta_content, is_media_type};
use crate::extractors::{Context, Extractor};

const PREFIXES: [&str; 2] = ["og:video", "og:audio"];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGraphExtractor;

#[async_trait(?Send)]
impl Extractor for OpenGraphExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };

        for prefix in PREFIXES {
            // Without a declared type there is no telling a player page from a file.
            let Some(kind) = extract_meta_content(page.html(), &format!("{}:type", prefix)) else {
                continue;
            };
            let candidates: Vec<String> = [
                format!("{}:secure_url", prefix),
                format!("{}:url", prefix),
                prefix.to_string(),
            ]
            .iter()
            .filter_map(|key| extract_meta_content(page.html(), key))
            .collect();

            if kind.trim().eq_ignore_ascii_case("text/html") {
                for candidate in candidates {
                    let Some(embed) = page.absolutize(&candidate) else {
                        continue;
                    };
                    if let Some(file) = cx.resolve_nested(embed).await? {
                        return Ok(Some(file));
                    }
                }
            } else if is_media_type(&kind) {
                if let Some(file) = candidates
                    .iter()
                    .find_map(|c| absolutize_media(page.url(), c))
                {
                    return Ok(Some(file));
                }
            }
        }
        Ok(None)
    }
}
