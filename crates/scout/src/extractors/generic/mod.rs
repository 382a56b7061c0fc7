// ABOUTME: Catch-all extractors that scan the page document for media, plus frame unwrapping.
// ABOUTME: Tried after every site-specific extractor has declined.

pub mod iframe;
pub mod ldjson;
pub mod media;
pub mod noscript;
pub mod opengraph;

pub use iframe::IframeExtractor;
pub use ldjson::LdJsonExtractor;
pub use media::MediaExtractor;
pub use noscript::NoscriptExtractor;
pub use opengraph::OpenGraphExtractor;
