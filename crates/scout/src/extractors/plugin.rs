// ABOUTME: Builders for player add-on launch URIs (plugin://...) produced by site extractors.
// ABOUTME: Percent-encodes embedded URLs with form_urlencoded so they survive as a single query value.

use url::form_urlencoded::byte_serialize;

/// Percent-encode a value for use inside a query string.
pub fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

pub fn dailymotion(id: &str) -> String {
    format!("plugin://plugin.video.dailymotion_com/?mode=playVideo&url={}", id)
}

pub fn vimeo(id: &str) -> String {
    format!("plugin://plugin.video.vimeo/play/?video_id={}", id)
}

/// Launch URI for an AceStream content link.
pub fn acestream(url: &str) -> String {
    format!("plugin://program.plexus/?mode=1&name=&url={}", encode(url))
}

/// Launch URI for a magnet link or `.torrent` file.
pub fn elementum(uri: &str) -> String {
    format!("plugin://plugin.video.elementum/play?uri={}", encode(uri))
}

/// What a YouTube launch URI should play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeTarget {
    Video(String),
    Playlist(String),
}

pub fn youtube(target: &YoutubeTarget, incognito: bool) -> String {
    let mut uri = match target {
        YoutubeTarget::Video(id) => {
            format!("plugin://plugin.video.youtube/play/?video_id={}", encode(id))
        }
        YoutubeTarget::Playlist(id) => {
            format!("plugin://plugin.video.youtube/play/?playlist_id={}", encode(id))
        }
    };
    if incognito {
        uri.push_str("&incognito=true");
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_nested_urls() {
        assert_eq!(
            acestream("acestream://foo"),
            "plugin://program.plexus/?mode=1&name=&url=acestream%3A%2F%2Ffoo"
        );
        assert_eq!(
            elementum("magnet:?xt=urn:btih:abc&dn=x y"),
            "plugin://plugin.video.elementum/play?uri=magnet%3A%3Fxt%3Durn%3Abtih%3Aabc%26dn%3Dx+y"
        );
    }

    #[test]
    fn youtube_variants() {
        let video = YoutubeTarget::Video("abc".into());
        assert_eq!(
            youtube(&video, false),
            "plugin://plugin.video.youtube/play/?video_id=abc"
        );
        assert_eq!(
            youtube(&YoutubeTarget::Playlist("PL1".into()), true),
            "plugin://plugin.video.youtube/play/?playlist_id=PL1&incognito=true"
        );
    }
}
