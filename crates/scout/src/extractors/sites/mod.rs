// ABOUTME: Site-specific extractors keyed on URL patterns, some backed by a secondary JSON API.
// ABOUTME: Each extractor declines on unsupported paths of its host instead of guessing.

pub mod acestream;
pub mod arte;
pub mod dailymotion;
pub mod gamekult;
pub mod pokemontv;
pub mod torrent;
pub mod veoh;
pub mod vimeo;
pub mod youtube;

pub use acestream::AcestreamExtractor;
pub use arte::ArteExtractor;
pub use dailymotion::DailymotionExtractor;
pub use gamekult::GamekultExtractor;
pub use pokemontv::PokemonTvExtractor;
pub use torrent::TorrentExtractor;
pub use veoh::VeohExtractor;
pub use vimeo::VimeoExtractor;
pub use youtube::YoutubeExtractor;
