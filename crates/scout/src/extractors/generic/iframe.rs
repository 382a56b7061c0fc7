// ABOUTME: Frame-unwrapping extractor resolving each embedded <iframe> as its own page.
// ABOUTME: Frames are tried in document order one level deeper; the first reference found wins.

use async_trait::async_trait;
use scraper::Selector;
use url::Url;

use crate::error::Result;
use crate::extractors::{Context, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct IframeExtractor;

#[async_trait(?Send)]
impl Extractor for IframeExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };
        let Ok(selector) = Selector::parse("iframe[src]") else {
            return Ok(None);
        };

        let frames: Vec<Url> = page
            .html()
            .select(&selector)
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| page.absolutize(src))
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .collect();

        for frame in frames {
            if let Some(file) = cx.resolve_nested(frame).await? {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::testing::Harness;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn no_iframe_declines() {
        let file = Harness::new()
            .run_html(
                &IframeExtractor,
                "https://foo.com/bar.html",
                "<html><body><iframe></iframe></body></html>",
            )
            .await
            .unwrap();
        assert_eq!(file, None);
    }

    #[tokio::test]
    async fn site_embed_resolved() {
        let file = Harness::new()
            .run_html(
                &IframeExtractor,
                "https://foo.com/bar.html",
                r#"<html><body>
                    <iframe src="about:blank"></iframe>
                    <iframe src="https://player.vimeo.com/video/76979871"></iframe>
                </body></html>"#,
            )
            .await
            .unwrap();
        assert_eq!(
            file.as_deref(),
            Some("plugin://plugin.video.vimeo/play/?video_id=76979871")
        );
    }

    #[tokio::test]
    async fn skips_frames_without_media() {
        let server = MockServer::start();
        let empty = server.mock(|when, then| {
            when.method(GET).path("/empty.html");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><p>nothing</p></body></html>");
        });
        let player = server.mock(|when, then| {
            when.method(GET).path("/player.html");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(r#"<html><body><video src="stream/low.mp4"></video></body></html>"#);
        });

        let html = format!(
            r#"<html><body><iframe src="{}"></iframe><iframe src="{}"></iframe></body></html>"#,
            server.url("/empty.html"),
            server.url("/player.html"),
        );
        let file = Harness::new()
            .run_html(&IframeExtractor, "https://foo.com/bar.html", &html)
            .await
            .unwrap();

        assert_eq!(file, Some(server.url("/stream/low.mp4")));
        empty.assert_hits(1);
        player.assert_hits(1);
    }
}
