// ABOUTME: Extractor reading schema.org VideoObject/AudioObject entries from JSON-LD scripts.
// ABOUTME: Returns contentUrl directly and follows embedUrl through a nested resolution.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use crate::content::Page;
use crate::error::Result;
use crate::extractors::fields::absolutize_media;
use crate::extractors::{Context, Extractor};

const MEDIA_TYPES: [&str; 2] = ["VideoObject", "AudioObject"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LdJsonExtractor;

/// A media reference found in structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    Content(String),
    Embed(Url),
}

#[async_trait(?Send)]
impl Extractor for LdJsonExtractor {
    async fn extract(&self, _url: &Url, cx: &Context<'_>) -> Result<Option<String>> {
        let Some(page) = cx.document().await else {
            return Ok(None);
        };

        for candidate in collect_candidates(page) {
            match candidate {
                Candidate::Content(file) => return Ok(Some(file)),
                Candidate::Embed(embed) => {
                    if let Some(file) = cx.resolve_nested(embed).await? {
                        return Ok(Some(file));
                    }
                }
            }
        }
        Ok(None)
    }
}

fn collect_candidates(page: &Page) -> Vec<Candidate> {
    let mut out = Vec::new();
    for value in ld_json_values(page.html()) {
        walk(&value, page, &mut out);
    }
    out
}

fn ld_json_values(doc: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|script| {
            let text = script.text().collect::<String>();
            serde_json::from_str::<Value>(&text).ok()
        })
        .collect()
}

fn walk(value: &Value, page: &Page, out: &mut Vec<Candidate>) {
    match value {
        Value::Object(map) => {
            let is_media = map
                .get("@type")
                .map(|t| MEDIA_TYPES.iter().any(|m| matches_type(t, m)))
                .unwrap_or(false);
            if is_media {
                if let Some(file) = map
                    .get("contentUrl")
                    .and_then(Value::as_str)
                    .and_then(|s| absolutize_media(page.url(), s))
                {
                    out.push(Candidate::Content(file));
                }
                if let Some(embed) = map
                    .get("embedUrl")
                    .and_then(Value::as_str)
                    .and_then(|s| page.absolutize(s))
                {
                    out.push(Candidate::Embed(embed));
                }
            }
            for v in map.values() {
                walk(v, page, out);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                walk(v, page, out);
            }
        }
        _ => {}
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case(expected),
        Value::Array(arr) => arr.iter().any(|v| matches_type(v, expected)),
        _ => false,
    }
}
