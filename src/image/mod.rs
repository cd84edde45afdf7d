//! Image fetch, decode, clamp, re-encode, and caching (C7, spec.md §4.6).

pub mod cache;
pub mod pipeline;

pub use cache::{cache_key, CachedImage, ImageCache};
pub use pipeline::{transcode_image, transcode_image_region, FetchContext, OutputFormat};
