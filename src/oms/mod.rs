//! The OMS binary page format: framing, tag stream, pagination, and
//! normalization (spec.md §3, §4.1-§4.4, §6.1).

pub mod color;
pub mod normalize;
pub mod paginate;
pub mod scanner;
pub mod tags;
pub mod writer;

pub use writer::{ClientVersion, Compression, Page, Stats};
