//! high-level h1 proto types and functionality

pub mod headers;
pub use headers::{Http1HeaderMap, Http1HeaderName, IntoHttp1HeaderName, TryIntoHttp1HeaderName};

pub mod ext;
