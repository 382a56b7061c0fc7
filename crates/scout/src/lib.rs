// ABOUTME: Main library entry point for the Scout media source resolver.
// ABOUTME: Re-exports the public API: Resolver, ResolverBuilder, Resolution, ResolveError, ErrorCode, Options.

//! Scout - resolves web page URLs into media references a player can open.
//!
//! A page URL runs through an ordered chain of extractors: site-specific
//! heuristics first, then generic document scans, then embedded-frame
//! unwrapping. The first extractor that produces a reference wins. When none
//! does, the input URL is handed to the player unchanged.
//!
//! # Example
//!
//! ```no_run
//! use castkit_scout::{ResolveError, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResolveError> {
//!     let resolver = Resolver::builder().build();
//!     let resolution = resolver
//!         .resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ", false)
//!         .await?;
//!     println!("{}", resolution.file);
//!     Ok(())
//! }
//! ```

pub mod content;
pub mod dynamic;
pub mod error;
pub mod extractors;
pub mod options;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod result;

pub use crate::content::{ContentCache, Page};
pub use crate::dynamic::{
    ContextLookup, DynamicEvaluator, PageContextId, PageHost, RestrictionCategory,
    RestrictionTable, ScriptDescriptor, ScriptError, ScriptRunner,
};
pub use crate::error::{ErrorCode, ResolveError, Result};
pub use crate::extractors::loader::load_builtin_registry;
pub use crate::extractors::{Context, Entry, Extractor, ExtractorRegistry, Matcher, Tier};
pub use crate::options::{Options, ResolverBuilder, DEFAULT_MAX_DEPTH};
pub use crate::request::ResolveRequest;
pub use crate::resolver::Resolver;
pub use crate::result::Resolution;
