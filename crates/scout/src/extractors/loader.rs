// ABOUTME: Declares the builtin extractor table: site heuristics, generic document scans, frame unwrapping.
// ABOUTME: Provides load_builtin_registry() to initialize the default ExtractorRegistry.

//! Builtin registry table.
//!
//! Site entries are listed alphabetically and gated on host or scheme so the
//! page is never fetched for them unless they need it. Generic entries accept
//! every URL and run in the order listed, with frame unwrapping last.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::generic::{
    IframeExtractor, LdJsonExtractor, MediaExtractor, NoscriptExtractor, OpenGraphExtractor,
};
use crate::extractors::sites::{
    AcestreamExtractor, ArteExtractor, DailymotionExtractor, GamekultExtractor,
    PokemonTvExtractor, TorrentExtractor, VeohExtractor, VimeoExtractor, YoutubeExtractor,
};
use crate::extractors::{Entry, ExtractorRegistry, Matcher, Tier};

static TORRENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^magnet:|\.torrent(?:[?#]|$)").expect("valid torrent regex")
});

/// Loads the builtin extractor registry.
pub fn load_builtin_registry() -> ExtractorRegistry {
    ExtractorRegistry::new(vec![
        Entry::new(
            "acestream",
            Tier::Site,
            Matcher::Schemes(&["acestream"]),
            AcestreamExtractor,
        ),
        Entry::new(
            "arte",
            Tier::Site,
            Matcher::Hosts(&["www.arte.tv"]),
            ArteExtractor::default(),
        ),
        Entry::new(
            "dailymotion",
            Tier::Site,
            Matcher::Hosts(&["www.dailymotion.com", "dailymotion.com", "dai.ly"]),
            DailymotionExtractor,
        ),
        Entry::new(
            "gamekult",
            Tier::Site,
            Matcher::Hosts(&["www.gamekult.com"]),
            GamekultExtractor,
        ),
        Entry::new(
            "pokemontv",
            Tier::Site,
            Matcher::Hosts(&["watch.pokemon.com"]),
            PokemonTvExtractor::default(),
        ),
        Entry::new(
            "torrent",
            Tier::Site,
            Matcher::Pattern(TORRENT.clone()),
            TorrentExtractor,
        ),
        Entry::new(
            "veoh",
            Tier::Site,
            Matcher::Hosts(&["www.veoh.com"]),
            VeohExtractor::default(),
        ),
        Entry::new(
            "vimeo",
            Tier::Site,
            Matcher::Hosts(&["vimeo.com", "www.vimeo.com", "player.vimeo.com"]),
            VimeoExtractor,
        ),
        Entry::new(
            "youtube",
            Tier::Site,
            Matcher::Hosts(&[
                "www.youtube.com",
                "youtube.com",
                "m.youtube.com",
                "music.youtube.com",
                "www.youtube-nocookie.com",
                "youtu.be",
            ]),
            YoutubeExtractor,
        ),
        Entry::new("video", Tier::Generic, Matcher::Any, MediaExtractor::video()),
        Entry::new("audio", Tier::Generic, Matcher::Any, MediaExtractor::audio()),
        Entry::new("noscript", Tier::Generic, Matcher::Any, NoscriptExtractor),
        Entry::new("ldjson", Tier::Generic, Matcher::Any, LdJsonExtractor),
        Entry::new("opengraph", Tier::Generic, Matcher::Any, OpenGraphExtractor),
        Entry::new("iframe", Tier::Frame, Matcher::Any, IframeExtractor),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use url::Url;

    #[test]
    fn builtin_order() {
        let registry = load_builtin_registry();
        assert_eq!(
            registry.names(),
            vec![
                "acestream",
                "arte",
                "dailymotion",
                "gamekult",
                "pokemontv",
                "torrent",
                "veoh",
                "vimeo",
                "youtube",
                "video",
                "audio",
                "noscript",
                "ldjson",
                "opengraph",
                "iframe",
            ]
        );
    }

    #[test]
    fn tiers_are_grouped() {
        let registry = load_builtin_registry();
        let tiers: Vec<Tier> = registry.entries().iter().map(|e| e.tier()).collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tiers.last(), Some(&Tier::Frame));
    }

    #[test]
    fn site_gates() {
        let registry = load_builtin_registry();
        let matching = |url: &str| -> Vec<&'static str> {
            let url = Url::parse(url).unwrap();
            registry
                .entries()
                .iter()
                .filter(|e| e.tier() == Tier::Site && e.matches(&url))
                .map(|e| e.name())
                .collect()
        };
        assert_eq!(matching("https://youtu.be/abc"), vec!["youtube"]);
        assert_eq!(matching("magnet:?xt=urn:btih:abc"), vec!["torrent"]);
        assert_eq!(matching("https://foo.com/a.torrent"), vec!["torrent"]);
        assert_eq!(matching("https://foo.com/bar.html"), Vec::<&str>::new());
    }
}
