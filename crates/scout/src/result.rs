// ABOUTME: Resolution struct summarizing a top-level resolution for callers and the CLI.
// ABOUTME: Records the input URL, the media reference handed to the player, and whether it was passed through.

use serde::{Deserialize, Serialize};

/// Outcome of a top-level resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The URL as requested, normalized.
    pub url: String,
    /// The media reference to play.
    pub file: String,
    /// True when no extractor improved on the input URL.
    pub pass_through: bool,
}

impl Resolution {
    pub fn new(url: impl Into<String>, file: impl Into<String>) -> Self {
        let url = url.into();
        let file = file.into();
        let pass_through = url == file;
        Self {
            url,
            file,
            pass_through,
        }
    }

    /// Returns true for player launch URIs such as `plugin://…`.
    pub fn is_plugin(&self) -> bool {
        self.file.starts_with("plugin://")
    }
}
