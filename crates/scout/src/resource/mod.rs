// ABOUTME: Resource handling for fetching pages and secondary API payloads.
// ABOUTME: Handles HTTP fetching with SSRF protection, content-length limits, charset decoding and JSON decoding.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ResolveError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Content types that are parsed into a document.
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "127.0.0.0/8",
        "169.254.0.0/16",
    ]
    .iter()
    .filter_map(|net| net.parse().ok())
    .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub parse_non_200: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using the charset from the content-type header or detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// Returns true when the response declares an HTML or XHTML body.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(is_html_content_type)
            .unwrap_or(false)
    }
}

/// Returns true if the content type is HTML or XHTML, ignoring case and parameters.
pub fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.trim().to_ascii_lowercase();
    HTML_CONTENT_TYPES.iter().any(|ct| lower.starts_with(ct))
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => ip.is_loopback() || PRIVATE_V6.iter().any(|net| net.contains(ip)),
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}

/// Reject hosts that are, or resolve to, private addresses.
async fn guard_host(target: &Url, url: &str, reason: &str) -> Result<(), ResolveError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let blocked = || {
        ResolveError::ssrf(url, "Fetch", Some(anyhow::anyhow!("{} is not allowed", reason)))
    };

    // Url wraps IPv6 literals in brackets.
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return if is_private_ip(&ip) { Err(blocked()) } else { Ok(()) };
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        ResolveError::fetch(url, "Fetch", Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(blocked());
        }
    }
    Ok(())
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ResolveError> {
    if url.is_empty() {
        return Err(ResolveError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = Url::parse(url).map_err(|e| {
        ResolveError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ResolveError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        guard_host(&parsed_url, url, "private IP address").await?;
    }

    let mut request = client.get(parsed_url.clone());
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| {
        ResolveError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    })?;

    if !opts.allow_private_networks {
        guard_host(response.url(), url, "redirect to private IP address").await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ResolveError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        ResolveError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ResolveError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    if !(200..300).contains(&status) && !opts.parse_non_200 {
        return Err(ResolveError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

/// Fetch a JSON payload and decode it into `T`.
///
/// Non-2xx statuses and undecodable bodies are errors.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<T, ResolveError> {
    let opts = FetchOptions {
        parse_non_200: false,
        ..opts.clone()
    };
    let result = fetch(client, url, &opts).await?;
    serde_json::from_slice(&result.body).map_err(|e| {
        ResolveError::extract(url, "FetchJson", Some(anyhow::anyhow!("invalid JSON: {}", e)))
    })
}
