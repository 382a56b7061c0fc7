// ABOUTME: DOM helpers shared by the media extractors: attribute lookups and media source discovery.
// ABOUTME: Provides meta content lookup, first non-empty attribute, and video/audio source resolution.

//! Field extraction utilities.
//!
//! Key behaviors:
//! - Selectors are tried in order; first non-empty match wins.
//! - Values are trimmed; empty strings are treated as no match.
//! - Media sources resolve against the page URL and skip `blob:` references.

use scraper::{Html, Selector};
use url::Url;

/// Extracts an attribute value from the first matching selector that yields a non-empty result.
///
/// # Arguments
/// * `doc` - The parsed HTML document
/// * `selectors` - Slice of CSS selector strings to try in order
/// * `attr` - The attribute name to extract
///
/// # Returns
/// `Some(String)` with the trimmed attribute value, or `None` if no match found.
pub fn extract_first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for &sel_str in selectors {
        let sel = match Selector::parse(sel_str) {
            Ok(s) => s,
            Err(_) => continue,
        };

        for el in doc.select(&sel) {
            if let Some(value) = el.value().attr(attr) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Extracts the `content` attribute of the first `<meta>` whose `property`
/// or `name` equals `key`.
pub fn extract_meta_content(doc: &Html, key: &str) -> Option<String> {
    let selectors = [
        format!("meta[property=\"{}\"]", key),
        format!("meta[name=\"{}\"]", key),
    ];
    let refs: Vec<&str> = selectors.iter().map(String::as_str).collect();
    extract_first_attr(doc, &refs, "content")
}

/// Which element family a media lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn tag(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

/// Finds the first playable source of a `<video>` or `<audio>` element.
///
/// Checks each element's own `src` first, then its `<source src>` children.
/// Relative references resolve against `base`. `blob:` sources only exist
/// inside the page that created them and are skipped.
pub fn find_media_source(doc: &Html, kind: MediaKind, base: &Url) -> Option<String> {
    let tag = kind.tag();
    let own = Selector::parse(&format!("{}[src]", tag)).ok()?;
    let nested = Selector::parse(&format!("{} source[src]", tag)).ok()?;

    doc.select(&own)
        .chain(doc.select(&nested))
        .filter_map(|el| el.value().attr("src"))
        .find_map(|src| absolutize_media(base, src))
}

/// Resolve a media reference against `base`, rejecting empty and `blob:` values.
pub fn absolutize_media(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.to_ascii_lowercase().starts_with("blob:") {
        return None;
    }
    base.join(reference).ok().map(|u| u.to_string())
}

/// Returns true for MIME types a player can open directly.
pub fn is_media_type(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    mime.starts_with("video/")
        || mime.starts_with("audio/")
        || mime == "application/x-mpegurl"
        || mime == "application/vnd.apple.mpegurl"
        || mime == "application/dash+xml"
}
