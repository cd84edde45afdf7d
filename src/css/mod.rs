//! CSS cascade engine: stylesheet collection, selector matching, and
//! declaration normalization (spec.md §4.5).

pub mod cascade;
pub mod selector;
pub mod value;

pub use cascade::{build_stylesheet, compute_style, effective_property, ScreenContext, Stylesheet, StyleSource};
pub use value::{extract_url, parse_position_px, px_value};
